// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod account;
pub mod health;
pub mod places;
pub mod records;

pub use account::config as account_config;
pub use health::config as health_config;
pub use places::config as places_config;
pub use records::config as records_config;

use crate::services::Session;
use actix_web::{http::header::AUTHORIZATION, HttpRequest};

/// Session carried by the caller's Authorization header
pub(crate) fn session_from(req: &HttpRequest) -> Session {
    Session::from_authorization(
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    )
}
