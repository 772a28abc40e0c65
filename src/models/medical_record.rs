// src/models/medical_record.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Diagnosis,
    LabResult,
    Imaging,
    Vaccination,
    Allergy,
    Surgery,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub record_type: RecordType,
    pub record_date: NaiveDate,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub description: Option<String>,
    pub attachment_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalRecordInput {
    pub title: Option<String>,
    pub record_type: Option<RecordType>,
    pub record_date: Option<String>,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub description: Option<String>,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordPayload {
    pub title: String,
    pub record_type: RecordType,
    pub record_date: NaiveDate,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub description: Option<String>,
    pub attachment_url: Option<String>,
}
