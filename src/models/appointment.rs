// src/models/appointment.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "SCHEDULED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Appointment as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub user_id: Option<i64>,
    pub doctor_name: String,
    pub specialization: Option<String>,
    pub hospital_name: Option<String>,
    pub hospital_address: Option<String>,
    pub hospital_place_id: Option<String>,
    pub appointment_date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub appointment_time: NaiveTime,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form data as submitted by the frontend
/// DOCUMENTATION: Dates and times arrive as free-form strings and are
/// coerced before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentInput {
    pub doctor_name: Option<String>,
    pub specialization: Option<String>,
    pub hospital_name: Option<String>,
    pub hospital_address: Option<String>,
    pub hospital_place_id: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
}

/// Sanitized, validated body sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub doctor_name: String,
    pub specialization: Option<String>,
    pub hospital_name: Option<String>,
    pub hospital_address: Option<String>,
    pub hospital_place_id: Option<String>,
    pub appointment_date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub appointment_time: NaiveTime,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

/// Appointment fields prefilled from a selected hospital
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPrefill {
    pub hospital_name: String,
    pub hospital_address: Option<String>,
    pub hospital_place_id: String,
    pub hospital_phone: Option<String>,
}

/// Times travel as "HH:MM"; the backend may answer with seconds
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(de::Error::custom)
    }
}
