// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, upstream clients and start HTTP server

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use models::Coordinate;
use services::{
    BackendClient, EnrichmentPipeline, GeolocationProvider, GooglePlacesClient, MapPresenter,
    PlaceService, PlacesProvider,
};
use services::search_tracker::start_cleanup_task;
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        return Err(io::Error::new(io::ErrorKind::InvalidInput, e));
    }

    log::info!("Starting carefinder service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Places provider and discovery pipeline
    let http_timeout = Duration::from_secs(config.http_timeout_secs);
    let provider: Arc<dyn PlacesProvider> = Arc::new(GooglePlacesClient::new(
        config.google_places_api_key.clone(),
        config.google_places_base_url.clone(),
        http_timeout,
    ));
    let pipeline = EnrichmentPipeline::new(
        provider.clone(),
        Duration::from_millis(config.details_timeout_ms),
    );
    let place_service = web::Data::new(PlaceService::new(provider.clone(), pipeline));

    // Start background cleanup of abandoned searches (runs every minute)
    start_cleanup_task(place_service.tracker().clone(), 60, Duration::from_secs(300));
    log::info!("Started search tracker cleanup task (interval: 1 minute)");
    let geolocation = web::Data::new(GeolocationProvider::new(
        Coordinate::new(config.default_latitude, config.default_longitude),
        Duration::from_millis(config.geolocation_timeout_ms),
    ));
    let fallback = geolocation.fallback();
    log::info!("Fallback location: {}, {}", fallback.lat, fallback.lng);

    let presenter = MapPresenter::new(provider);
    presenter.selections().register(|selected| {
        log::info!(
            "Selected {} ({}) at {}, {}",
            selected.place.name,
            selected.place.category,
            selected.place.location.lat,
            selected.place.location.lng
        );
    });
    let presenter = web::Data::new(presenter);

    // 5. Healthcare backend
    let backend = web::Data::new(BackendClient::new(
        config.backend_api_url.clone(),
        config.login_route.clone(),
        http_timeout,
    ));
    log::info!("Proxying domain requests to {}", config.backend_api_url);

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(config_data.clone())
            .app_data(place_service.clone())
            .app_data(geolocation.clone())
            .app_data(presenter.clone())
            .app_data(backend.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::records_config)
            .configure(handlers::account_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
