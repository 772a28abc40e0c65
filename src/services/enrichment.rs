// src/services/enrichment.rs
// DOCUMENTATION: Place enrichment pipeline
// PURPOSE: Turn raw search hits into places with a trustworthy open status

use crate::models::{Place, PlaceCategory, RawPlace, RawPlaceDetails};
use crate::services::google_places_client::{PlacesProvider, BULK_DETAIL_FIELDS};
use crate::services::open_status::compute_open_status;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Enrichment pipeline
/// DOCUMENTATION: Fans out one details lookup per hit, waits for all of them
/// and degrades failed lookups individually instead of failing the batch
#[derive(Clone)]
pub struct EnrichmentPipeline {
    provider: Arc<dyn PlacesProvider>,
    details_timeout: Duration,
}

impl EnrichmentPipeline {
    pub fn new(provider: Arc<dyn PlacesProvider>, details_timeout: Duration) -> Self {
        Self {
            provider,
            details_timeout,
        }
    }

    /// Enrich all hits, evaluating opening hours at the current time
    pub async fn enrich(&self, hits: Vec<RawPlace>, category: PlaceCategory) -> Vec<Place> {
        self.enrich_at(hits, category, Utc::now()).await
    }

    /// Enrich all hits at a fixed instant
    /// DOCUMENTATION: Output has exactly one place per hit, in input order
    pub async fn enrich_at(
        &self,
        hits: Vec<RawPlace>,
        category: PlaceCategory,
        now: DateTime<Utc>,
    ) -> Vec<Place> {
        if hits.is_empty() {
            return Vec::new();
        }

        let lookups = hits.iter().map(|hit| self.fetch_details(&hit.place_id));
        let details = join_all(lookups).await;

        let mut degraded = 0;
        let places: Vec<Place> = hits
            .into_iter()
            .zip(details)
            .map(|(hit, details)| match details {
                Some(details) => merge(hit, details, category, now),
                None => {
                    degraded += 1;
                    degrade(hit, category, now)
                }
            })
            .collect();

        if degraded > 0 {
            log::warn!(
                "Enriched {} places, {} with degraded defaults",
                places.len(),
                degraded
            );
        } else {
            log::debug!("Enriched {} places", places.len());
        }

        places
    }

    async fn fetch_details(&self, place_id: &str) -> Option<RawPlaceDetails> {
        let lookup = self.provider.get_details(place_id, BULK_DETAIL_FIELDS);

        match tokio::time::timeout(self.details_timeout, lookup).await {
            Ok(Ok(details)) => Some(details),
            Ok(Err(e)) => {
                log::warn!("Details lookup failed for {}: {}", place_id, e);
                None
            }
            Err(_) => {
                log::warn!(
                    "Details lookup for {} timed out after {:?}",
                    place_id,
                    self.details_timeout
                );
                None
            }
        }
    }
}

/// Details take precedence over the search hit for every field they carry
fn merge(
    hit: RawPlace,
    details: RawPlaceDetails,
    category: PlaceCategory,
    now: DateTime<Utc>,
) -> Place {
    let business_status = details.business_status.or(hit.business_status);
    let opening_hours = details.opening_hours.or(hit.opening_hours);
    let is_open_now = compute_open_status(business_status, category, opening_hours.as_ref(), now);

    Place {
        id: hit.place_id,
        name: hit.name,
        location: hit.location,
        category,
        vicinity: hit.vicinity,
        rating: details.rating.or(hit.rating),
        user_ratings_total: details.user_ratings_total.or(hit.user_ratings_total),
        business_status,
        opening_hours,
        is_open_now,
    }
}

/// Best-effort place when its details could not be fetched
/// Hours are not trusted, so only closure and the hospital rule apply
fn degrade(hit: RawPlace, category: PlaceCategory, now: DateTime<Utc>) -> Place {
    let is_open_now = compute_open_status(hit.business_status, category, None, now);

    Place {
        id: hit.place_id,
        name: hit.name,
        location: hit.location,
        category,
        vicinity: hit.vicinity,
        rating: hit.rating,
        user_ratings_total: hit.user_ratings_total,
        business_status: hit.business_status,
        opening_hours: hit.opening_hours,
        is_open_now,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::BusinessStatus;

    fn pipeline(provider: FakeProvider) -> EnrichmentPipeline {
        EnrichmentPipeline::new(Arc::new(provider), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_pharmacy_scenario_preserves_order() {
        let hits = vec![
            hit("closed", Some(BusinessStatus::ClosedPermanently), None),
            hit("open", Some(BusinessStatus::Operational), Some(true)),
        ];
        let provider = FakeProvider::new(Vec::new())
            .with_details(
                "closed",
                DetailsReply::Found(details(Some(BusinessStatus::ClosedPermanently), None)),
            )
            .with_details(
                "open",
                DetailsReply::Found(details(Some(BusinessStatus::Operational), Some(true))),
            );

        let places = pipeline(provider)
            .enrich(hits, PlaceCategory::Pharmacy)
            .await;

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "closed");
        assert_eq!(places[0].is_open_now, Some(false));
        assert_eq!(places[1].id, "open");
        assert_eq!(places[1].is_open_now, Some(true));
    }

    #[tokio::test]
    async fn test_failed_lookup_degrades_single_place() {
        let hits = vec![
            hit("a", None, Some(true)),
            hit("b", None, Some(true)),
            hit("c", Some(BusinessStatus::ClosedTemporarily), None),
        ];
        let provider = FakeProvider::new(Vec::new())
            .with_details("a", DetailsReply::Found(details(None, Some(false))))
            .with_details("b", DetailsReply::Fails)
            .with_details("c", DetailsReply::Fails);

        let places = pipeline(provider).enrich(hits, PlaceCategory::Pharmacy).await;

        assert_eq!(places.len(), 3);
        assert_eq!(places[0].is_open_now, Some(false));
        // hours of a degraded place are not trusted
        assert_eq!(places[1].is_open_now, None);
        // closure from the search hit still dominates
        assert_eq!(places[2].is_open_now, Some(false));
    }

    #[tokio::test]
    async fn test_degraded_hospital_uses_hospital_rule() {
        let provider = FakeProvider::new(Vec::new()).with_details("h", DetailsReply::Fails);
        let places = pipeline(provider)
            .enrich(vec![hit("h", None, Some(false))], PlaceCategory::Hospital)
            .await;
        assert_eq!(places[0].is_open_now, Some(true));
    }

    #[tokio::test]
    async fn test_batch_is_evaluated_at_one_instant() {
        use crate::models::{OpeningHours, OpeningPeriod, OpeningTime};
        use chrono::TimeZone;

        let morning_hours = OpeningHours {
            periods: Some(vec![OpeningPeriod {
                open: OpeningTime::new(1, "0800"),
                close: Some(OpeningTime::new(1, "1100")),
            }]),
            utc_offset_minutes: Some(0),
            ..Default::default()
        };
        let provider = Arc::new(
            FakeProvider::new(Vec::new())
                .with_details(
                    "clinic",
                    DetailsReply::Found(RawPlaceDetails {
                        opening_hours: Some(morning_hours),
                        ..Default::default()
                    }),
                )
                .with_details("down", DetailsReply::Fails),
        );
        let pipeline = EnrichmentPipeline::new(provider, Duration::from_millis(200));
        let hits = || {
            vec![
                hit("clinic", None, None),
                hit("down", Some(BusinessStatus::ClosedTemporarily), Some(true)),
            ]
        };

        // 2026-10-12 is a Monday
        let nine = Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2026, 10, 12, 12, 0, 0).unwrap();

        let at_nine = pipeline.enrich_at(hits(), PlaceCategory::Diagnostic, nine).await;
        let at_noon = pipeline.enrich_at(hits(), PlaceCategory::Diagnostic, noon).await;

        assert_eq!(at_nine[0].is_open_now, Some(true));
        assert_eq!(at_noon[0].is_open_now, Some(false));
        assert_eq!(at_nine[1].is_open_now, Some(false));
        assert_eq!(at_nine[1], at_noon[1]);
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out_without_blocking_batch() {
        let hits = vec![hit("slow", None, Some(true)), hit("fast", None, None)];
        let provider = FakeProvider::new(Vec::new())
            .with_details("slow", DetailsReply::Hangs)
            .with_details("fast", DetailsReply::Found(details(None, Some(true))));

        let started = std::time::Instant::now();
        let places = pipeline(provider).enrich(hits, PlaceCategory::Diagnostic).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].is_open_now, None);
        assert_eq!(places[1].is_open_now, Some(true));
    }

    #[tokio::test]
    async fn test_requests_bulk_field_set() {
        let provider = Arc::new(
            FakeProvider::new(Vec::new())
                .with_details("x", DetailsReply::Found(details(None, None))),
        );
        let pipeline = EnrichmentPipeline::new(provider.clone(), Duration::from_millis(200));
        pipeline
            .enrich(vec![hit("x", None, None)], PlaceCategory::Pharmacy)
            .await;

        let fields = provider.requested_fields.lock().unwrap();
        assert_eq!(fields.as_slice(), &[BULK_DETAIL_FIELDS.join(",")]);
    }

    #[tokio::test]
    async fn test_empty_hits() {
        let places = pipeline(FakeProvider::new(Vec::new()))
            .enrich(Vec::new(), PlaceCategory::Hospital)
            .await;
        assert!(places.is_empty());
    }
}
