// src/services/medical_record_service.rs
// DOCUMENTATION: Medical history records

use crate::errors::{CareError, ValidationErrors};
use crate::models::{MedicalRecord, MedicalRecordInput, MedicalRecordPayload};
use crate::services::backend_client::{BackendClient, Resource, Session};
use crate::services::validation::{required_date, required_text, sanitize_text};
use chrono::{NaiveDate, Utc};

const MEDICAL_RECORDS: Resource = Resource {
    path: "/web/medical-records",
    singular: "medical record",
    plural: "medical records",
};

pub struct MedicalRecordService;

impl MedicalRecordService {
    /// Records describe past events, so future dates are rejected
    pub fn validate(
        input: &MedicalRecordInput,
        today: NaiveDate,
    ) -> Result<MedicalRecordPayload, CareError> {
        let mut errors = ValidationErrors::new();

        let title = required_text(input.title.as_deref(), "Title is required", &mut errors);
        if input.record_type.is_none() {
            errors.push("Record type is required");
        }
        let record_date = required_date(
            input.record_date.as_deref(),
            "Record date is required",
            "Record date is invalid",
            &mut errors,
        );
        if let Some(date) = record_date {
            if date > today {
                errors.push("Record date cannot be in the future");
            }
        }

        let attachment_url = sanitize_text(input.attachment_url.as_deref());
        if let Some(url) = &attachment_url {
            if !validator::validate_url(url.as_str()) {
                errors.push("Attachment URL is invalid");
            }
        }

        match (title, input.record_type, record_date) {
            (Some(title), Some(record_type), Some(record_date)) if errors.is_empty() => {
                Ok(MedicalRecordPayload {
                    title,
                    record_type,
                    record_date,
                    doctor_name: sanitize_text(input.doctor_name.as_deref()),
                    hospital_name: sanitize_text(input.hospital_name.as_deref()),
                    description: sanitize_text(input.description.as_deref()),
                    attachment_url,
                })
            }
            _ => Err(CareError::Validation(errors)),
        }
    }

    pub async fn list(
        client: &BackendClient,
        session: &Session,
    ) -> Result<Vec<MedicalRecord>, CareError> {
        client.list(&MEDICAL_RECORDS, session).await
    }

    pub async fn get(
        client: &BackendClient,
        session: &Session,
        id: i64,
    ) -> Result<MedicalRecord, CareError> {
        client.fetch(&MEDICAL_RECORDS, id, session).await
    }

    pub async fn create(
        client: &BackendClient,
        session: &Session,
        input: &MedicalRecordInput,
    ) -> Result<MedicalRecord, CareError> {
        let payload = Self::validate(input, Utc::now().date_naive())?;
        client.create(&MEDICAL_RECORDS, &payload, session).await
    }

    pub async fn update(
        client: &BackendClient,
        session: &Session,
        id: i64,
        input: &MedicalRecordInput,
    ) -> Result<MedicalRecord, CareError> {
        let payload = Self::validate(input, Utc::now().date_naive())?;
        client.update(&MEDICAL_RECORDS, id, &payload, session).await
    }

    pub async fn delete(client: &BackendClient, session: &Session, id: i64) -> Result<(), CareError> {
        client.remove(&MEDICAL_RECORDS, id, session).await
    }
}
