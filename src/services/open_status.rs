// src/services/open_status.rs
// DOCUMENTATION: Open/closed precedence policy
// PURPOSE: Single source of truth for a place's "open now" value, shared by
// bulk enrichment and single-place selection

use crate::models::{BusinessStatus, OpeningHours, PlaceCategory};
use chrono::{DateTime, Utc};

/// Compute whether a place is open at `now`
/// DOCUMENTATION: First matching rule wins:
/// 1. closed temporarily / permanently -> false
/// 2. hospital -> true
/// 3. evaluable opening periods -> their result, falling back to the static
///    `open_now` flag (or unknown) when evaluation fails
/// 4. static `open_now` flag
/// 5. unknown
pub fn compute_open_status(
    business_status: Option<BusinessStatus>,
    category: PlaceCategory,
    opening_hours: Option<&OpeningHours>,
    now: DateTime<Utc>,
) -> Option<bool> {
    if business_status.map_or(false, |status| status.is_closed()) {
        return Some(false);
    }

    // TODO: confirm the always-open hospital policy with product owners; it
    // papers over unreliable provider hours for emergency departments
    if category == PlaceCategory::Hospital {
        return Some(true);
    }

    let hours = opening_hours?;

    if hours.has_periods() {
        return match hours.is_open_at(now) {
            Ok(open) => Some(open),
            Err(e) => {
                log::debug!("Opening periods not evaluable ({}), using open_now flag", e);
                hours.open_now
            }
        };
    }

    hours.open_now
}
