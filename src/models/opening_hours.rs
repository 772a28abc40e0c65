// src/models/opening_hours.rs
// DOCUMENTATION: Weekly opening hours and the computed "is open" check
// PURPOSE: Evaluate provider opening periods in the place's local time

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINUTES_PER_DAY: i32 = 24 * 60;
const MINUTES_PER_WEEK: i32 = 7 * MINUTES_PER_DAY;

/// Why opening periods could not be evaluated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoursError {
    #[error("no opening periods available")]
    NoPeriods,

    #[error("utc offset unknown")]
    MissingUtcOffset,

    #[error("malformed opening time: day={day}, time={time}")]
    MalformedTime { day: u8, time: String },
}

/// A day/time point of the week
/// `day` 0 = Sunday, `time` is "HHMM" in local time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningTime {
    pub day: u8,
    pub time: String,
}

impl OpeningTime {
    pub fn new(day: u8, time: &str) -> Self {
        Self {
            day,
            time: time.to_string(),
        }
    }

    fn minute_of_week(&self) -> Result<i32, HoursError> {
        let malformed = || HoursError::MalformedTime {
            day: self.day,
            time: self.time.clone(),
        };

        if self.day > 6 || self.time.len() != 4 || !self.time.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let hours: i32 = self.time[..2].parse().map_err(|_| malformed())?;
        let minutes: i32 = self.time[2..].parse().map_err(|_| malformed())?;
        // 2400 is how providers spell "end of day"
        if hours > 24 || minutes > 59 || (hours == 24 && minutes != 0) {
            return Err(malformed());
        }

        Ok(self.day as i32 * MINUTES_PER_DAY + hours * 60 + minutes)
    }
}

/// One opening interval; no `close` means open around the clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningPeriod {
    pub open: OpeningTime,
    #[serde(default)]
    pub close: Option<OpeningTime>,
}

/// Opening hours as reported by the places provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    /// Static "open now" flag computed by the provider at response time
    #[serde(default)]
    pub open_now: Option<bool>,

    /// Weekly opening periods
    #[serde(default)]
    pub periods: Option<Vec<OpeningPeriod>>,

    /// Human readable hours, one line per weekday
    #[serde(default)]
    pub weekday_text: Option<Vec<String>>,

    /// Place offset from UTC, needed to evaluate periods
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl OpeningHours {
    /// Whether detailed periods are present, i.e. `is_open_at` can be attempted
    pub fn has_periods(&self) -> bool {
        self.periods.as_ref().map_or(false, |p| !p.is_empty())
    }

    /// Computed "is open" check
    /// DOCUMENTATION: Converts `now` to the place's local time and tests it
    /// against every weekly period, handling intervals that wrap past
    /// Saturday midnight
    pub fn is_open_at(&self, now: DateTime<Utc>) -> Result<bool, HoursError> {
        let periods = match self.periods.as_deref() {
            Some(periods) if !periods.is_empty() => periods,
            _ => return Err(HoursError::NoPeriods),
        };
        let offset = self.utc_offset_minutes.ok_or(HoursError::MissingUtcOffset)?;

        let local = now + Duration::minutes(offset as i64);
        let now_minute = local.weekday().num_days_from_sunday() as i32 * MINUTES_PER_DAY
            + local.hour() as i32 * 60
            + local.minute() as i32;

        for period in periods {
            let open = period.open.minute_of_week()?;
            let close = match &period.close {
                Some(close) => close.minute_of_week()?,
                None => return Ok(true),
            };
            let close = if close <= open { close + MINUTES_PER_WEEK } else { close };

            let window = open..close;
            if window.contains(&now_minute) || window.contains(&(now_minute + MINUTES_PER_WEEK)) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
