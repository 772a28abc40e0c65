// src/services/prescription_service.rs
// DOCUMENTATION: Prescription tracking
// PURPOSE: Local validation plus backend CRUD for prescriptions

use crate::errors::{CareError, ValidationErrors};
use crate::models::{Prescription, PrescriptionInput, PrescriptionPayload};
use crate::services::backend_client::{BackendClient, Resource, Session};
use crate::services::validation::{optional_date, required_date, required_text, sanitize_text};

const PRESCRIPTIONS: Resource = Resource {
    path: "/web/prescriptions",
    singular: "prescription",
    plural: "prescriptions",
};

pub struct PrescriptionService;

impl PrescriptionService {
    pub fn validate(input: &PrescriptionInput) -> Result<PrescriptionPayload, CareError> {
        let mut errors = ValidationErrors::new();

        let medication_name = required_text(
            input.medication_name.as_deref(),
            "Medication name is required",
            &mut errors,
        );
        let dosage = required_text(input.dosage.as_deref(), "Dosage is required", &mut errors);
        let frequency = required_text(
            input.frequency.as_deref(),
            "Frequency is required",
            &mut errors,
        );
        let prescribed_by = required_text(
            input.prescribed_by.as_deref(),
            "Prescribing doctor is required",
            &mut errors,
        );
        let start_date = required_date(
            input.start_date.as_deref(),
            "Start date is required",
            "Start date is invalid",
            &mut errors,
        );
        let end_date = optional_date(input.end_date.as_deref(), "End date is invalid", &mut errors);

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.push("End date cannot be before start date");
            }
        }

        match (medication_name, dosage, frequency, prescribed_by, start_date) {
            (Some(medication_name), Some(dosage), Some(frequency), Some(prescribed_by), Some(start_date))
                if errors.is_empty() =>
            {
                Ok(PrescriptionPayload {
                    medication_name,
                    dosage,
                    frequency,
                    prescribed_by,
                    start_date,
                    end_date,
                    instructions: sanitize_text(input.instructions.as_deref()),
                    pharmacy_name: sanitize_text(input.pharmacy_name.as_deref()),
                    status: input.status.unwrap_or_default(),
                })
            }
            _ => Err(CareError::Validation(errors)),
        }
    }

    pub async fn list(client: &BackendClient, session: &Session) -> Result<Vec<Prescription>, CareError> {
        client.list(&PRESCRIPTIONS, session).await
    }

    pub async fn get(
        client: &BackendClient,
        session: &Session,
        id: i64,
    ) -> Result<Prescription, CareError> {
        client.fetch(&PRESCRIPTIONS, id, session).await
    }

    pub async fn create(
        client: &BackendClient,
        session: &Session,
        input: &PrescriptionInput,
    ) -> Result<Prescription, CareError> {
        let payload = Self::validate(input)?;
        client.create(&PRESCRIPTIONS, &payload, session).await
    }

    pub async fn update(
        client: &BackendClient,
        session: &Session,
        id: i64,
        input: &PrescriptionInput,
    ) -> Result<Prescription, CareError> {
        let payload = Self::validate(input)?;
        client.update(&PRESCRIPTIONS, id, &payload, session).await
    }

    pub async fn delete(client: &BackendClient, session: &Session, id: i64) -> Result<(), CareError> {
        client.remove(&PRESCRIPTIONS, id, session).await
    }
}
