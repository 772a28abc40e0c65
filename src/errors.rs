// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Aggregated client-side validation failures
/// DOCUMENTATION: Collected in field order so callers can show every
/// violated constraint at once
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ok when nothing was collected, otherwise the aggregated error
    pub fn into_result(self) -> Result<(), CareError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CareError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors.join("; "))
    }
}

/// Normalized non-2xx response from the healthcare backend
/// DOCUMENTATION: Shape shared with the frontend: message, HTTP status,
/// the operation that failed and when it failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerError {
    pub message: String,
    pub status: u16,
    pub operation: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.operation, self.status, self.message)
    }
}

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and JSON body
#[derive(Error, Debug)]
pub enum CareError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Session expired, please log in again")]
    SessionExpired { redirect_to: String },

    #[error("Places provider returned {status}: {message}")]
    ProviderError { status: String, message: String },

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("{0}")]
    Server(ServerError),

    #[error("Search {0} was superseded by a newer search")]
    SearchSuperseded(u64),
}

impl CareError {
    fn code(&self) -> &'static str {
        match self {
            CareError::NotFound(_) => "NOT_FOUND",
            CareError::InvalidInput(_) => "INVALID_INPUT",
            CareError::Validation(_) => "VALIDATION_ERROR",
            CareError::Unauthorized => "UNAUTHORIZED",
            CareError::SessionExpired { .. } => "SESSION_EXPIRED",
            CareError::ProviderError { .. } => "PROVIDER_ERROR",
            CareError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            CareError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            CareError::Server(_) => "SERVER_ERROR",
            CareError::SearchSuperseded(_) => "SEARCH_SUPERSEDED",
        }
    }
}

/// Convert CareError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for CareError {
    fn error_response(&self) -> HttpResponse {
        let mut error = json!({
            "code": self.code(),
            "message": self.to_string(),
            "timestamp": Utc::now().to_rfc3339()
        });

        match self {
            CareError::Validation(errors) => {
                error["errors"] = json!(errors.errors);
            }
            CareError::SessionExpired { redirect_to } => {
                error["redirect_to"] = json!(redirect_to);
            }
            CareError::Server(server) => {
                error["message"] = json!(server.message);
                error["status"] = json!(server.status);
                error["operation"] = json!(server.operation);
                error["timestamp"] = json!(server.timestamp.to_rfc3339());
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": error }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            CareError::NotFound(_) => StatusCode::NOT_FOUND,
            CareError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CareError::Validation(_) => StatusCode::BAD_REQUEST,
            CareError::Unauthorized => StatusCode::UNAUTHORIZED,
            CareError::SessionExpired { .. } => StatusCode::UNAUTHORIZED,
            CareError::ProviderError { .. } => StatusCode::BAD_GATEWAY,
            CareError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            CareError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            CareError::Server(server) => {
                StatusCode::from_u16(server.status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            CareError::SearchSuperseded(_) => StatusCode::CONFLICT,
        }
    }
}
