// src/services/google_places_client.rs
// DOCUMENTATION: Google Places API client
// PURPOSE: Nearby search and place details, validated into typed results

use crate::errors::CareError;
use crate::models::{
    BusinessStatus, Coordinate, OpeningHours, OpeningPeriod, OpeningTime, RawPlace,
    RawPlaceDetails, SearchRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Fields requested for every place during bulk enrichment
pub const BULK_DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "business_status",
    "opening_hours",
    "utc_offset",
    "rating",
    "user_ratings_total",
];

/// Fields requested when the user opens a place's info window
pub const FULL_DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "name",
    "geometry",
    "types",
    "formatted_address",
    "formatted_phone_number",
    "international_phone_number",
    "website",
    "url",
    "rating",
    "user_ratings_total",
    "business_status",
    "opening_hours",
    "utc_offset",
];

/// Source of nearby-search results and place details
/// DOCUMENTATION: Seam between the enrichment pipeline and the provider SDK;
/// every call is single-shot with no retry
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Nearby search. Zero results is an empty Vec, never an error.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawPlace>, CareError>;

    /// Details for one place restricted to `fields`
    async fn get_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<RawPlaceDetails, CareError>;
}

/// Status field of every Places web service response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacesStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    NotFound,
    UnknownError,
    Error,
    Other(String),
}

impl PlacesStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "OK" => PlacesStatus::Ok,
            "ZERO_RESULTS" => PlacesStatus::ZeroResults,
            "OVER_QUERY_LIMIT" => PlacesStatus::OverQueryLimit,
            "REQUEST_DENIED" => PlacesStatus::RequestDenied,
            "INVALID_REQUEST" => PlacesStatus::InvalidRequest,
            "NOT_FOUND" => PlacesStatus::NotFound,
            "UNKNOWN_ERROR" => PlacesStatus::UnknownError,
            "ERROR" => PlacesStatus::Error,
            other => PlacesStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlacesStatus::Ok => "OK",
            PlacesStatus::ZeroResults => "ZERO_RESULTS",
            PlacesStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            PlacesStatus::RequestDenied => "REQUEST_DENIED",
            PlacesStatus::InvalidRequest => "INVALID_REQUEST",
            PlacesStatus::NotFound => "NOT_FOUND",
            PlacesStatus::UnknownError => "UNKNOWN_ERROR",
            PlacesStatus::Error => "ERROR",
            PlacesStatus::Other(raw) => raw,
        }
    }

    /// Map a non-success status to the error surfaced to callers
    fn into_error(self, error_message: Option<String>) -> CareError {
        match self {
            PlacesStatus::OverQueryLimit => CareError::RateLimitExceeded,
            PlacesStatus::NotFound => CareError::NotFound(
                error_message.unwrap_or_else(|| "Place not found".to_string()),
            ),
            other => {
                let message = error_message.unwrap_or_else(|| "Unknown error".to_string());
                CareError::ProviderError {
                    status: other.as_str().to_string(),
                    message,
                }
            }
        }
    }
}

/// Response from Google Places Nearby Search
#[derive(Debug, Deserialize)]
struct GooglePlacesResponse {
    #[serde(default)]
    results: Vec<GooglePlace>,
    status: String,
    error_message: Option<String>,
}

/// Response from Google Place Details
#[derive(Debug, Deserialize)]
struct GoogleDetailsResponse {
    result: Option<GooglePlace>,
    status: String,
    error_message: Option<String>,
}

/// Place as the provider sends it: every field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
struct GooglePlace {
    place_id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    geometry: Option<GoogleGeometry>,
    formatted_address: Option<String>,
    vicinity: Option<String>,
    rating: Option<f32>,
    user_ratings_total: Option<i32>,
    business_status: Option<String>,
    opening_hours: Option<GoogleOpeningHours>,
    utc_offset: Option<i32>,
    formatted_phone_number: Option<String>,
    international_phone_number: Option<String>,
    website: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleOpeningHours {
    open_now: Option<bool>,
    weekday_text: Option<Vec<String>>,
    periods: Option<Vec<GoogleOpeningPeriod>>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleOpeningPeriod {
    open: Option<GoogleOpeningTime>,
    close: Option<GoogleOpeningTime>,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleOpeningTime {
    day: Option<u8>,
    time: Option<String>,
}

impl GoogleOpeningTime {
    fn to_opening_time(&self) -> Option<OpeningTime> {
        Some(OpeningTime {
            day: self.day?,
            time: self.time.clone()?,
        })
    }
}

impl GooglePlace {
    fn location(&self) -> Option<Coordinate> {
        self.geometry
            .as_ref()
            .map(|g| Coordinate::new(g.location.lat, g.location.lng))
            .filter(Coordinate::is_valid)
    }

    fn business_status(&self) -> Option<BusinessStatus> {
        self.business_status
            .as_deref()
            .and_then(BusinessStatus::from_provider)
    }

    fn opening_hours(&self) -> Option<OpeningHours> {
        self.opening_hours.as_ref().map(|hours| OpeningHours {
            open_now: hours.open_now,
            periods: hours.periods.as_ref().map(|periods| {
                periods
                    .iter()
                    .filter_map(|p| {
                        Some(OpeningPeriod {
                            open: p.open.as_ref()?.to_opening_time()?,
                            close: p.close.as_ref().and_then(|c| c.to_opening_time()),
                        })
                    })
                    .collect()
            }),
            weekday_text: hours.weekday_text.clone(),
            utc_offset_minutes: self.utc_offset,
        })
    }

    /// Validate a search hit; hits without id, name or location are unusable
    fn into_raw_place(self) -> Option<RawPlace> {
        let location = self.location()?;
        let business_status = self.business_status();
        let opening_hours = self.opening_hours();
        let place_id = self.place_id.filter(|id| !id.is_empty())?;
        let name = self.name.filter(|n| !n.is_empty())?;

        Some(RawPlace {
            place_id,
            name,
            location,
            vicinity: self.vicinity.or(self.formatted_address),
            types: self.types,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            business_status,
            opening_hours,
        })
    }

    fn into_details(self) -> RawPlaceDetails {
        let location = self.location();
        let business_status = self.business_status();
        let opening_hours = self.opening_hours();

        RawPlaceDetails {
            place_id: self.place_id,
            name: self.name,
            location,
            formatted_address: self.formatted_address.or(self.vicinity),
            formatted_phone_number: self.formatted_phone_number,
            international_phone_number: self.international_phone_number,
            website: self.website,
            url: self.url,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            business_status,
            opening_hours,
            types: self.types,
        }
    }
}

/// Google Places API client
/// DOCUMENTATION: Handles authentication and API calls to Google Places
pub struct GooglePlacesClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Places API key
    api_key: String,
    /// Base URL for Google Places API
    base_url: String,
}

impl GooglePlacesClient {
    /// Create new Google Places API client
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &HashMap<&str, String>,
    ) -> Result<T, CareError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                log::error!("Google Places API request failed: {}", e);
                CareError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Google Places API error {}: {}", status, body);
            return Err(CareError::ExternalApiError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            log::error!("Failed to parse Google Places response: {}", e);
            CareError::ExternalApiError(format!("Parse error: {}", e))
        })
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    /// Perform nearby search for places
    /// DOCUMENTATION: Searches around `request.center`; `ZERO_RESULTS` is a
    /// valid empty answer, `UNKNOWN_ERROR`/`ERROR` and the other non-OK
    /// statuses are fatal for the search
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawPlace>, CareError> {
        let mut params = HashMap::new();
        params.insert(
            "location",
            format!("{},{}", request.center.lat, request.center.lng),
        );
        params.insert("radius", request.radius_meters.to_string());
        params.insert("type", request.category.provider_type().to_string());
        params.insert("key", self.api_key.clone());

        if let Some(keyword) = request.effective_keyword() {
            params.insert("keyword", keyword.to_string());
        }

        log::debug!(
            "Google Places nearby search: lat={}, lng={}, radius={}, category={}",
            request.center.lat,
            request.center.lng,
            request.radius_meters,
            request.category
        );

        let api_response: GooglePlacesResponse =
            self.get_json("nearbysearch/json", &params).await?;

        match PlacesStatus::parse(&api_response.status) {
            PlacesStatus::Ok | PlacesStatus::ZeroResults => {
                let total = api_response.results.len();
                let places: Vec<RawPlace> = api_response
                    .results
                    .into_iter()
                    .filter_map(GooglePlace::into_raw_place)
                    .collect();

                if places.len() < total {
                    log::warn!(
                        "Dropped {} malformed search hits",
                        total - places.len()
                    );
                }
                log::info!("Google Places search returned {} results", places.len());
                Ok(places)
            }
            status => {
                log::error!(
                    "Google Places search failed with status {}",
                    status.as_str()
                );
                Err(status.into_error(api_response.error_message))
            }
        }
    }

    /// Get information about a specific place
    /// DOCUMENTATION: Only the requested fields are billed and returned
    async fn get_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<RawPlaceDetails, CareError> {
        let mut params = HashMap::new();
        params.insert("place_id", place_id.to_string());
        params.insert("fields", fields.join(","));
        params.insert("key", self.api_key.clone());

        log::debug!("Google Places details lookup: place_id={}", place_id);

        let api_response: GoogleDetailsResponse = self.get_json("details/json", &params).await?;

        match PlacesStatus::parse(&api_response.status) {
            PlacesStatus::Ok => {
                let details = api_response.result.unwrap_or_default().into_details();
                Ok(details)
            }
            status => Err(status.into_error(api_response.error_message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceCategory;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GooglePlacesClient {
        GooglePlacesClient::new(
            "test_key".to_string(),
            server.uri(),
            Duration::from_secs(5),
        )
    }

    fn pharmacy_request() -> SearchRequest {
        SearchRequest::new(Coordinate::new(19.0760, 72.8777), 5000, PlaceCategory::Pharmacy)
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(PlacesStatus::parse("ZERO_RESULTS"), PlacesStatus::ZeroResults);
        assert_eq!(PlacesStatus::parse("UNKNOWN_ERROR"), PlacesStatus::UnknownError);
        assert_eq!(
            PlacesStatus::parse("SOMETHING"),
            PlacesStatus::Other("SOMETHING".to_string())
        );
        assert!(matches!(
            PlacesStatus::OverQueryLimit.into_error(None),
            CareError::RateLimitExceeded
        ));
    }

    #[test]
    fn test_hit_without_geometry_is_dropped() {
        let hit = GooglePlace {
            place_id: Some("abc".to_string()),
            name: Some("No Geometry Clinic".to_string()),
            ..Default::default()
        };
        assert!(hit.into_raw_place().is_none());
    }

    #[tokio::test]
    async fn test_search_parses_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("type", "pharmacy"))
            .and(query_param("radius", "5000"))
            .and(query_param("location", "19.076,72.8777"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [
                    {
                        "place_id": "p1",
                        "name": "Wellness Forever",
                        "geometry": { "location": { "lat": 19.07, "lng": 72.88 } },
                        "vicinity": "Linking Road",
                        "business_status": "OPERATIONAL",
                        "opening_hours": { "open_now": true },
                        "types": ["pharmacy", "health"]
                    },
                    { "name": "missing id", "geometry": { "location": { "lat": 1.0, "lng": 1.0 } } }
                ]
            })))
            .mount(&server)
            .await;

        let places = client_for(&server).search(&pharmacy_request()).await.unwrap();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].place_id, "p1");
        assert_eq!(places[0].business_status, Some(BusinessStatus::Operational));
        assert_eq!(
            places[0].opening_hours.as_ref().and_then(|h| h.open_now),
            Some(true)
        );
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
            )
            .mount(&server)
            .await;

        let places = client_for(&server).search(&pharmacy_request()).await.unwrap();
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "UNKNOWN_ERROR",
                "results": [],
                "error_message": "backend hiccup"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&pharmacy_request())
            .await
            .unwrap_err();
        match err {
            CareError::ProviderError { status, message } => {
                assert_eq!(status, "UNKNOWN_ERROR");
                assert_eq!(message, "backend hiccup");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_diagnostic_search_sends_default_keyword() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("type", "health"))
            .and(query_param("keyword", "diagnostic center"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = SearchRequest::new(
            Coordinate::new(19.0760, 72.8777),
            3000,
            PlaceCategory::Diagnostic,
        );
        client_for(&server).search(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_details_carry_utc_offset_into_hours() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .and(query_param("place_id", "p1"))
            .and(query_param("fields", BULK_DETAIL_FIELDS.join(",")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "result": {
                    "place_id": "p1",
                    "business_status": "CLOSED_TEMPORARILY",
                    "utc_offset": 330,
                    "opening_hours": {
                        "open_now": false,
                        "periods": [
                            { "open": { "day": 1, "time": "0900" }, "close": { "day": 1, "time": "1700" } },
                            { "close": { "day": 2, "time": "1700" } }
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        let details = client_for(&server)
            .get_details("p1", BULK_DETAIL_FIELDS)
            .await
            .unwrap();

        assert_eq!(details.business_status, Some(BusinessStatus::ClosedTemporarily));
        let hours = details.opening_hours.unwrap();
        assert_eq!(hours.utc_offset_minutes, Some(330));
        // period without an open time is discarded
        assert_eq!(hours.periods.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_details_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "NOT_FOUND" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_details("missing", FULL_DETAIL_FIELDS)
            .await
            .unwrap_err();
        assert!(matches!(err, CareError::NotFound(_)));
    }
}
