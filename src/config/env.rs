// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8003)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Google Places API Key
    pub google_places_api_key: String,

    /// Base URL of the Google Places web service
    pub google_places_base_url: String,

    /// Base URL of the healthcare backend REST API
    pub backend_api_url: String,

    /// Route the frontend should navigate to once a session expires
    pub login_route: String,

    /// Fallback coordinate used when the user location is unavailable
    pub default_latitude: f64,
    pub default_longitude: f64,

    /// Search radius used when the request does not carry one
    pub default_search_radius_m: u32,

    /// How long to wait for a location source before falling back
    pub geolocation_timeout_ms: u64,

    /// Upper bound for each per-place details lookup during enrichment
    pub details_timeout_ms: u64,

    /// Timeout applied to every outbound HTTP request
    pub http_timeout_secs: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env_or("SERVER_PORT", 8003),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default(),
            google_places_base_url: env::var("GOOGLE_PLACES_BASE_URL")
                .unwrap_or_else(|_| "https://maps.googleapis.com/maps/api/place".to_string()),
            backend_api_url: env::var("BACKEND_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            login_route: env::var("LOGIN_ROUTE").unwrap_or_else(|_| "/login".to_string()),
            default_latitude: env_or("DEFAULT_LATITUDE", 19.0760),
            default_longitude: env_or("DEFAULT_LONGITUDE", 72.8777),
            default_search_radius_m: env_or("DEFAULT_SEARCH_RADIUS_M", 5000),
            geolocation_timeout_ms: env_or("GEOLOCATION_TIMEOUT_MS", 10_000),
            details_timeout_ms: env_or("DETAILS_TIMEOUT_MS", 5_000),
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", 15),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_api_url.is_empty() {
            return Err("BACKEND_API_URL is required".to_string());
        }

        if !(-90.0..=90.0).contains(&self.default_latitude)
            || !(-180.0..=180.0).contains(&self.default_longitude)
        {
            return Err("DEFAULT_LATITUDE/DEFAULT_LONGITUDE out of range".to_string());
        }

        if self.default_search_radius_m == 0 || self.default_search_radius_m > 50_000 {
            return Err("DEFAULT_SEARCH_RADIUS_M must be between 1 and 50000".to_string());
        }

        if self.google_places_api_key.is_empty() {
            log::warn!("GOOGLE_PLACES_API_KEY not configured - nearby search will fail");
        }

        Ok(())
    }
}

#[cfg(test)]
impl Config {
    /// Configuration pointing both upstreams at test servers
    pub fn for_tests(places_url: &str, backend_url: &str) -> Self {
        Config {
            server_address: "127.0.0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            google_places_api_key: "test_key".to_string(),
            google_places_base_url: places_url.to_string(),
            backend_api_url: backend_url.to_string(),
            login_route: "/login".to_string(),
            default_latitude: 19.0760,
            default_longitude: 72.8777,
            default_search_radius_m: 5000,
            geolocation_timeout_ms: 200,
            details_timeout_ms: 500,
            http_timeout_secs: 5,
        }
    }
}
