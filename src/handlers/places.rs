// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for nearby discovery and the map screen
// PURPOSE: Parse requests, call services, return responses

use crate::config::Config;
use crate::errors::CareError;
use crate::models::{
    parse_category, parse_optional_category, Coordinate, MapClickRequest, NearbyQuery,
    PlaceCategoryQuery,
};
use crate::services::{
    GeolocationProvider, MapPresenter, NearbyResult, PlaceService, ReportedLocation,
    ResolvedLocation, SelectAction,
};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Header identifying the browser tab whose searches supersede each other
pub const CLIENT_ID_HEADER: &str = "X-Client-Id";

fn client_id(req: &HttpRequest) -> String {
    req.headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

async fn run_nearby(
    req: &HttpRequest,
    config: &Config,
    geolocation: &GeolocationProvider,
    places: &PlaceService,
    query: NearbyQuery,
) -> Result<NearbyResult, CareError> {
    if let Err(e) = query.validate() {
        return Err(CareError::InvalidInput(e.to_string()));
    }
    let category = parse_category(query.category.as_deref()).map_err(CareError::InvalidInput)?;

    let reported = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
        _ => None,
    };
    let location = geolocation
        .current_location(
            &ReportedLocation(reported),
            None,
            query.high_accuracy.unwrap_or(false),
        )
        .await;

    places
        .search_nearby(
            &client_id(req),
            location,
            query.radius.unwrap_or(config.default_search_radius_m),
            category,
            query.keyword,
        )
        .await
}

/// GET /places/nearby
/// Hospitals, pharmacies or labs around the user, with open status
pub async fn nearby_places(
    req: HttpRequest,
    config: web::Data<Config>,
    geolocation: web::Data<GeolocationProvider>,
    places: web::Data<PlaceService>,
    query: web::Query<NearbyQuery>,
) -> Result<impl Responder, CareError> {
    let result = run_nearby(&req, &config, &geolocation, &places, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /places/map
/// Same search rendered as a GeoJSON FeatureCollection
pub async fn nearby_map(
    req: HttpRequest,
    config: web::Data<Config>,
    geolocation: web::Data<GeolocationProvider>,
    places: web::Data<PlaceService>,
    presenter: web::Data<MapPresenter>,
    query: web::Query<NearbyQuery>,
) -> Result<impl Responder, CareError> {
    let result = run_nearby(&req, &config, &geolocation, &places, query.into_inner()).await?;
    let view = presenter.render(result.center, &result.places);

    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .json(view.to_geojson()))
}

/// POST /places/map/click
/// New search centred where the user clicked
pub async fn map_click(
    req: HttpRequest,
    config: web::Data<Config>,
    places: web::Data<PlaceService>,
    body: web::Json<MapClickRequest>,
) -> Result<impl Responder, CareError> {
    if let Err(e) = body.validate() {
        return Err(CareError::InvalidInput(e.to_string()));
    }
    let body = body.into_inner();
    let category = parse_category(body.category.as_deref()).map_err(CareError::InvalidInput)?;

    let result = places
        .search_nearby(
            &client_id(&req),
            ResolvedLocation::map_click(Coordinate::new(body.lat, body.lng)),
            body.radius.unwrap_or(config.default_search_radius_m),
            category,
            body.keyword,
        )
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /places/{place_id}/details
/// Info window content for a clicked marker
pub async fn place_details(
    presenter: web::Data<MapPresenter>,
    path: web::Path<String>,
    query: web::Query<PlaceCategoryQuery>,
) -> Result<impl Responder, CareError> {
    let category =
        parse_optional_category(query.category.as_deref()).map_err(CareError::InvalidInput)?;
    let window = presenter.info_window(&path.into_inner(), category).await?;
    Ok(HttpResponse::Ok().json(window))
}

/// POST /places/{place_id}/select
/// Select a place; hospitals and labs come back with appointment prefill
pub async fn select_place(
    presenter: web::Data<MapPresenter>,
    path: web::Path<String>,
    query: web::Query<PlaceCategoryQuery>,
) -> Result<impl Responder, CareError> {
    let category =
        parse_optional_category(query.category.as_deref()).map_err(CareError::InvalidInput)?;
    let place_id = path.into_inner();

    let selected = match category {
        Some(category) => presenter.select(&SelectAction { place_id, category }).await?,
        None => presenter.select_place(&place_id, None).await?,
    };
    let prefill = selected.appointment_prefill();
    Ok(HttpResponse::Ok().json(json!({
        "selected": selected,
        "appointment_prefill": prefill
    })))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .route("/nearby", web::get().to(nearby_places))
            .route("/map", web::get().to(nearby_map))
            .route("/map/click", web::post().to(map_click))
            .route("/{place_id}/details", web::get().to(place_details))
            .route("/{place_id}/select", web::post().to(select_place)),
    );
}
