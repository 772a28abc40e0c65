// src/services/appointment_service.rs
// DOCUMENTATION: Appointment booking
// PURPOSE: Validate appointment forms locally, then proxy CRUD to the backend

use crate::errors::{CareError, ValidationErrors};
use crate::models::{Appointment, AppointmentInput, AppointmentPayload, AppointmentStatus};
use crate::services::backend_client::{BackendClient, Resource, Session};
use crate::services::validation::{parse_time, required_date, required_text, sanitize_text};
use chrono::{NaiveDate, Utc};

const APPOINTMENTS: Resource = Resource {
    path: "/web/appointments",
    singular: "appointment",
    plural: "appointments",
};

pub struct AppointmentService;

impl AppointmentService {
    /// Sanitize, coerce and validate an appointment form
    /// DOCUMENTATION: Every violated rule is reported, in form field order.
    /// Scheduled appointments may not be dated before `today`
    pub fn validate(
        input: &AppointmentInput,
        today: NaiveDate,
    ) -> Result<AppointmentPayload, CareError> {
        let mut errors = ValidationErrors::new();
        let status = input.status.unwrap_or_default();

        let doctor_name = required_text(
            input.doctor_name.as_deref(),
            "Doctor name is required",
            &mut errors,
        );

        let appointment_date = required_date(
            input.appointment_date.as_deref(),
            "Appointment date is required",
            "Appointment date is invalid",
            &mut errors,
        );
        if let Some(date) = appointment_date {
            if status == AppointmentStatus::Scheduled && date < today {
                errors.push("Appointment date cannot be in the past");
            }
        }

        let appointment_time = match sanitize_text(input.appointment_time.as_deref()) {
            None => {
                errors.push("Appointment time is required");
                None
            }
            Some(raw) => {
                let time = parse_time(&raw);
                if time.is_none() {
                    errors.push("Appointment time is invalid");
                }
                time
            }
        };

        let reason = required_text(
            input.reason.as_deref(),
            "Reason for visit is required",
            &mut errors,
        );

        match (doctor_name, appointment_date, appointment_time, reason) {
            (Some(doctor_name), Some(appointment_date), Some(appointment_time), Some(reason))
                if errors.is_empty() =>
            {
                Ok(AppointmentPayload {
                    doctor_name,
                    specialization: sanitize_text(input.specialization.as_deref()),
                    hospital_name: sanitize_text(input.hospital_name.as_deref()),
                    hospital_address: sanitize_text(input.hospital_address.as_deref()),
                    hospital_place_id: sanitize_text(input.hospital_place_id.as_deref()),
                    appointment_date,
                    appointment_time,
                    reason,
                    notes: sanitize_text(input.notes.as_deref()),
                    status,
                })
            }
            _ => Err(CareError::Validation(errors)),
        }
    }

    pub async fn list(client: &BackendClient, session: &Session) -> Result<Vec<Appointment>, CareError> {
        client.list(&APPOINTMENTS, session).await
    }

    pub async fn get(
        client: &BackendClient,
        session: &Session,
        id: i64,
    ) -> Result<Appointment, CareError> {
        client.fetch(&APPOINTMENTS, id, session).await
    }

    pub async fn create(
        client: &BackendClient,
        session: &Session,
        input: &AppointmentInput,
    ) -> Result<Appointment, CareError> {
        let payload = Self::validate(input, Utc::now().date_naive())?;
        log::info!(
            "Booking appointment with {} on {}",
            payload.doctor_name,
            payload.appointment_date
        );
        client.create(&APPOINTMENTS, &payload, session).await
    }

    pub async fn update(
        client: &BackendClient,
        session: &Session,
        id: i64,
        input: &AppointmentInput,
    ) -> Result<Appointment, CareError> {
        let payload = Self::validate(input, Utc::now().date_naive())?;
        client.update(&APPOINTMENTS, id, &payload, session).await
    }

    pub async fn delete(client: &BackendClient, session: &Session, id: i64) -> Result<(), CareError> {
        client.remove(&APPOINTMENTS, id, session).await
    }
}
