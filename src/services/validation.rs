// src/services/validation.rs
// DOCUMENTATION: Form sanitization and coercion helpers
// PURPOSE: Shared by every domain service before anything is sent to the backend

use crate::errors::ValidationErrors;
use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> Option<&'static Regex> {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").ok()).as_ref()
}

/// Trim and strip HTML tags; blank input becomes None
pub fn sanitize_text(value: Option<&str>) -> Option<String> {
    let raw = value?;
    let stripped = match tag_pattern() {
        Some(tags) => tags.replace_all(raw, "").into_owned(),
        None => raw.to_string(),
    };
    let trimmed = stripped.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts YYYY-MM-DD, DD/MM/YYYY and RFC 3339 timestamps
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Accepts HH:MM, HH:MM:SS and hh:mm AM/PM
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(&value.to_ascii_uppercase(), "%I:%M %p"))
        .ok()
}

/// Sanitized required text, recording `message` when missing
pub fn required_text(
    value: Option<&str>,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let text = sanitize_text(value);
    if text.is_none() {
        errors.push(message);
    }
    text
}

/// Required date field with distinct messages for missing and malformed values
pub fn required_date(
    value: Option<&str>,
    required: &str,
    invalid: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    match sanitize_text(value) {
        None => {
            errors.push(required);
            None
        }
        Some(raw) => {
            let date = parse_date(&raw);
            if date.is_none() {
                errors.push(invalid);
            }
            date
        }
    }
}

/// Optional date field; present but malformed records `invalid`
pub fn optional_date(
    value: Option<&str>,
    invalid: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let raw = sanitize_text(value)?;
    let date = parse_date(&raw);
    if date.is_none() {
        errors.push(invalid);
    }
    date
}

/// Email shape check shared by auth forms
pub fn check_email(email: &str, errors: &mut ValidationErrors) -> Option<String> {
    match sanitize_text(Some(email)) {
        None => {
            errors.push("Email is required");
            None
        }
        Some(email) if !validator::validate_email(email.as_str()) => {
            errors.push("Email is invalid");
            None
        }
        Some(email) => Some(email.to_ascii_lowercase()),
    }
}
