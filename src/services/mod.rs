// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod appointment_service;
pub mod auth_service;
pub mod backend_client;
pub mod cart_service;
pub mod enrichment;
pub mod geolocation;
pub mod google_places_client;
pub mod map_view;
pub mod medical_record_service;
pub mod open_status;
pub mod place_service;
pub mod prescription_service;
pub mod product_service;
pub mod search_tracker;
pub mod validation;

pub use appointment_service::AppointmentService;
pub use auth_service::AuthService;
pub use backend_client::{BackendClient, Session};
pub use cart_service::CartService;
pub use enrichment::EnrichmentPipeline;
pub use geolocation::{GeolocationProvider, LocationOrigin, ReportedLocation, ResolvedLocation};
pub use google_places_client::{GooglePlacesClient, PlacesProvider};
pub use map_view::{MapPresenter, SelectAction};
pub use medical_record_service::MedicalRecordService;
pub use open_status::compute_open_status;
pub use place_service::{NearbyResult, PlaceService};
pub use prescription_service::PrescriptionService;
pub use product_service::ProductService;
pub use search_tracker::SearchTracker;
