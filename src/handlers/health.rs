// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Liveness check reporting which upstreams are configured

use crate::config::Config;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "carefinder",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": config.environment,
        "places_configured": !config.google_places_api_key.is_empty()
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
