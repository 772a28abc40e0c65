// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Typed search requests, provider results and enriched places

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::{AppointmentPrefill, Coordinate, OpeningHours};

/// Maximum radius accepted by the nearby search endpoint
pub const MAX_RADIUS_METERS: u32 = 50_000;

/// Kind of care facility being searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    Hospital,
    Pharmacy,
    Diagnostic,
}

impl PlaceCategory {
    /// Provider place type used as the search filter
    pub fn provider_type(&self) -> &'static str {
        match self {
            PlaceCategory::Hospital => "hospital",
            PlaceCategory::Pharmacy => "pharmacy",
            PlaceCategory::Diagnostic => "health",
        }
    }

    /// Keyword added when the caller gives none
    /// The provider has no dedicated diagnostic-centre type
    pub fn default_keyword(&self) -> Option<&'static str> {
        match self {
            PlaceCategory::Diagnostic => Some("diagnostic center"),
            _ => None,
        }
    }
}

impl PlaceCategory {
    /// Category implied by provider place types
    /// Hospitals win over pharmacies; any other place is treated as a lab
    pub fn from_types(types: &[String]) -> Self {
        let has = |wanted: &str| types.iter().any(|t| t == wanted);

        if has("hospital") {
            PlaceCategory::Hospital
        } else if has("pharmacy") || has("drugstore") {
            PlaceCategory::Pharmacy
        } else {
            PlaceCategory::Diagnostic
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceCategory::Hospital => write!(f, "hospital"),
            PlaceCategory::Pharmacy => write!(f, "pharmacy"),
            PlaceCategory::Diagnostic => write!(f, "diagnostic"),
        }
    }
}

impl FromStr for PlaceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hospital" | "hospitals" => Ok(PlaceCategory::Hospital),
            "pharmacy" | "pharmacies" => Ok(PlaceCategory::Pharmacy),
            "diagnostic" | "diagnostics" | "lab" => Ok(PlaceCategory::Diagnostic),
            other => Err(format!("Unknown place category: {}", other)),
        }
    }
}

/// Provider closure flag, independent of opening hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    #[serde(alias = "OPEN")]
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
}

impl BusinessStatus {
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            BusinessStatus::ClosedTemporarily | BusinessStatus::ClosedPermanently
        )
    }

    /// Parse a provider status string; unknown values are ignored
    pub fn from_provider(value: &str) -> Option<Self> {
        match value {
            "OPERATIONAL" | "OPEN" => Some(BusinessStatus::Operational),
            "CLOSED_TEMPORARILY" => Some(BusinessStatus::ClosedTemporarily),
            "CLOSED_PERMANENTLY" => Some(BusinessStatus::ClosedPermanently),
            _ => None,
        }
    }
}

/// Nearby search input
/// DOCUMENTATION: Immutable, built once per search invocation
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub center: Coordinate,
    pub radius_meters: u32,
    pub category: PlaceCategory,
    pub keyword: Option<String>,
}

impl SearchRequest {
    pub fn new(center: Coordinate, radius_meters: u32, category: PlaceCategory) -> Self {
        Self {
            center,
            radius_meters,
            category,
            keyword: None,
        }
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword.filter(|k| !k.trim().is_empty());
        self
    }

    /// Keyword sent to the provider: explicit one, else the category default
    pub fn effective_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .or_else(|| self.category.default_keyword())
    }
}

/// Search hit after boundary validation
/// DOCUMENTATION: Every field the provider may omit is an Option; id, name
/// and location are guaranteed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlace {
    pub place_id: String,
    pub name: String,
    pub location: Coordinate,
    pub vicinity: Option<String>,
    pub types: Vec<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<i32>,
    pub business_status: Option<BusinessStatus>,
    pub opening_hours: Option<OpeningHours>,
}

/// Typed place details payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlaceDetails {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub location: Option<Coordinate>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub international_phone_number: Option<String>,
    pub website: Option<String>,
    pub url: Option<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<i32>,
    pub business_status: Option<BusinessStatus>,
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Enriched place handed to the map layer
/// DOCUMENTATION: `is_open_now` is computed once during enrichment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub location: Coordinate,
    pub category: PlaceCategory,
    pub vicinity: Option<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<i32>,
    pub business_status: Option<BusinessStatus>,
    pub opening_hours: Option<OpeningHours>,
    pub is_open_now: Option<bool>,
}

/// Place chosen by the user in an info window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPlace {
    #[serde(flatten)]
    pub place: Place,
    pub place_id: String,
    pub formatted_address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub details: RawPlaceDetails,
}

impl SelectedPlace {
    /// Appointment form fields taken from a selected hospital or lab
    /// Pharmacies are not appointment venues
    pub fn appointment_prefill(&self) -> Option<AppointmentPrefill> {
        if self.place.category == PlaceCategory::Pharmacy {
            return None;
        }

        Some(AppointmentPrefill {
            hospital_name: self.place.name.clone(),
            hospital_address: self.formatted_address.clone(),
            hospital_place_id: self.place_id.clone(),
            hospital_phone: self.phone.clone(),
        })
    }
}

/// Query parameters for /places/nearby and /places/map
#[derive(Debug, Deserialize, Validate)]
pub struct NearbyQuery {
    /// Browser-reported latitude (absent when geolocation was denied)
    /// Out-of-range values resolve to the fallback location, not an error
    pub lat: Option<f64>,

    /// Browser-reported longitude
    pub lng: Option<f64>,

    /// Search radius in meters
    #[validate(range(min = 1, max = 50000))]
    pub radius: Option<u32>,

    /// hospital, pharmacy or diagnostic (default hospital)
    pub category: Option<String>,

    /// Free text keyword
    #[validate(length(max = 100))]
    pub keyword: Option<String>,

    /// Accuracy hint forwarded to the location source
    pub high_accuracy: Option<bool>,
}

/// Body for POST /places/map/click
#[derive(Debug, Deserialize, Validate)]
pub struct MapClickRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,

    #[validate(range(min = 1, max = 50000))]
    pub radius: Option<u32>,

    pub category: Option<String>,

    #[validate(length(max = 100))]
    pub keyword: Option<String>,
}

/// Query or body naming the category of a place being inspected
#[derive(Debug, Default, Deserialize)]
pub struct PlaceCategoryQuery {
    pub category: Option<String>,
}

/// Parse an optional category string, defaulting to hospitals
pub fn parse_category(value: Option<&str>) -> Result<PlaceCategory, String> {
    match value {
        Some(v) if !v.trim().is_empty() => v.parse(),
        _ => Ok(PlaceCategory::Hospital),
    }
}

/// Parse an optional category string, leaving absent values undecided
pub fn parse_optional_category(value: Option<&str>) -> Result<Option<PlaceCategory>, String> {
    match value {
        Some(v) if !v.trim().is_empty() => v.parse().map(Some),
        _ => Ok(None),
    }
}
