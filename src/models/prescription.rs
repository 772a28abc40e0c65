// src/models/prescription.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrescriptionStatus {
    Active,
    Completed,
    Discontinued,
}

impl Default for PrescriptionStatus {
    fn default() -> Self {
        PrescriptionStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: i64,
    pub user_id: Option<i64>,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub prescribed_by: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub pharmacy_name: Option<String>,
    pub status: PrescriptionStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrescriptionInput {
    pub medication_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub prescribed_by: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub instructions: Option<String>,
    pub pharmacy_name: Option<String>,
    pub status: Option<PrescriptionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionPayload {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub prescribed_by: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub pharmacy_name: Option<String>,
    pub status: PrescriptionStatus,
}
