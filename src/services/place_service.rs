// src/services/place_service.rs
// DOCUMENTATION: Nearby discovery flow
// PURPOSE: Geolocation -> places search -> enrichment, guarded by the search
// tracker so stale results never reach the caller

use crate::errors::CareError;
use crate::models::{Coordinate, Place, PlaceCategory, SearchRequest, MAX_RADIUS_METERS};
use crate::services::enrichment::EnrichmentPipeline;
use crate::services::geolocation::{LocationOrigin, ResolvedLocation};
use crate::services::google_places_client::PlacesProvider;
use crate::services::search_tracker::{SearchTicket, SearchTracker};
use serde::Serialize;
use std::sync::Arc;

/// Result of one nearby search
#[derive(Debug, Clone, Serialize)]
pub struct NearbyResult {
    /// Sequence number of the search
    pub search_id: u64,
    pub center: Coordinate,
    pub location_origin: LocationOrigin,
    pub category: PlaceCategory,
    pub radius_meters: u32,
    pub places: Vec<Place>,
}

/// Discovery service shared by all handlers
pub struct PlaceService {
    provider: Arc<dyn PlacesProvider>,
    pipeline: EnrichmentPipeline,
    tracker: Arc<SearchTracker>,
}

impl PlaceService {
    pub fn new(provider: Arc<dyn PlacesProvider>, pipeline: EnrichmentPipeline) -> Self {
        Self {
            provider,
            pipeline,
            tracker: Arc::new(SearchTracker::new()),
        }
    }

    pub fn tracker(&self) -> &Arc<SearchTracker> {
        &self.tracker
    }

    /// Build a search request, validating the radius
    pub fn build_request(
        center: Coordinate,
        radius_meters: u32,
        category: PlaceCategory,
        keyword: Option<String>,
    ) -> Result<SearchRequest, CareError> {
        if !center.is_valid() {
            return Err(CareError::InvalidInput(format!(
                "Invalid search center: {}, {}",
                center.lat, center.lng
            )));
        }
        if radius_meters == 0 || radius_meters > MAX_RADIUS_METERS {
            return Err(CareError::InvalidInput(format!(
                "Radius must be between 1 and {} meters",
                MAX_RADIUS_METERS
            )));
        }

        Ok(SearchRequest::new(center, radius_meters, category).with_keyword(keyword))
    }

    /// Search around a resolved location for `client_id`
    /// DOCUMENTATION: Provider errors are fatal for the search; zero results
    /// yield an empty list; a result superseded by a newer search of the same
    /// client is discarded
    pub async fn search_nearby(
        &self,
        client_id: &str,
        location: ResolvedLocation,
        radius_meters: u32,
        category: PlaceCategory,
        keyword: Option<String>,
    ) -> Result<NearbyResult, CareError> {
        let request = Self::build_request(location.coordinate, radius_meters, category, keyword)?;
        let ticket = self.tracker.begin(client_id).await;

        // the ticket is released on every outcome; staleness wins over errors
        let outcome = self.run(&request, &ticket).await;
        let places = self.tracker.complete(&ticket, outcome).await??;

        Ok(NearbyResult {
            search_id: ticket.sequence,
            center: request.center,
            location_origin: location.origin,
            category,
            radius_meters,
            places,
        })
    }

    async fn run(
        &self,
        request: &SearchRequest,
        ticket: &SearchTicket,
    ) -> Result<Vec<Place>, CareError> {
        let hits = self.provider.search(request).await?;

        if hits.is_empty() {
            log::info!(
                "No {} found within {}m of {}, {}",
                request.category,
                request.radius_meters,
                request.center.lat,
                request.center.lng
            );
            return Ok(Vec::new());
        }

        if !self.tracker.is_current(ticket).await {
            log::debug!(
                "Search {} superseded before enrichment, skipping {} details lookups",
                ticket.sequence,
                hits.len()
            );
            return Ok(Vec::new());
        }

        Ok(self.pipeline.enrich(hits, request.category).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessStatus, RawPlace, RawPlaceDetails};
    use crate::services::enrichment::test_support::{details, hit, DetailsReply, FakeProvider};
    use std::time::Duration;

    fn service(provider: FakeProvider) -> PlaceService {
        let provider: Arc<dyn PlacesProvider> = Arc::new(provider);
        let pipeline = EnrichmentPipeline::new(provider.clone(), Duration::from_millis(200));
        PlaceService::new(provider, pipeline)
    }

    fn mumbai() -> ResolvedLocation {
        ResolvedLocation {
            coordinate: Coordinate::new(19.0760, 72.8777),
            origin: LocationOrigin::Fallback,
        }
    }

    #[tokio::test]
    async fn test_pharmacy_search_scenario() {
        let provider = FakeProvider::new(vec![
            hit("p-closed", Some(BusinessStatus::ClosedPermanently), None),
            hit("p-open", None, Some(true)),
        ])
        .with_details(
            "p-closed",
            DetailsReply::Found(details(Some(BusinessStatus::ClosedPermanently), None)),
        )
        .with_details("p-open", DetailsReply::Found(details(None, Some(true))));

        let result = service(provider)
            .search_nearby("tab", mumbai(), 5000, PlaceCategory::Pharmacy, None)
            .await
            .unwrap();

        let statuses: Vec<Option<bool>> = result.places.iter().map(|p| p.is_open_now).collect();
        assert_eq!(statuses, vec![Some(false), Some(true)]);
        assert_eq!(result.center, Coordinate::new(19.0760, 72.8777));
        assert_eq!(result.location_origin, LocationOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_success() {
        let result = service(FakeProvider::new(Vec::new()))
            .search_nearby("tab", mumbai(), 5000, PlaceCategory::Hospital, None)
            .await
            .unwrap();
        assert!(result.places.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_produces_no_places() {
        let provider = FakeProvider::failing(CareError::ProviderError {
            status: "ERROR".to_string(),
            message: "provider down".to_string(),
        });

        let result = service(provider)
            .search_nearby("tab", mumbai(), 5000, PlaceCategory::Pharmacy, None)
            .await;
        assert!(matches!(result, Err(CareError::ProviderError { .. })));
    }

    #[tokio::test]
    async fn test_invalid_radius_rejected_before_search() {
        let result = service(FakeProvider::new(Vec::new()))
            .search_nearby("tab", mumbai(), 60_000, PlaceCategory::Pharmacy, None)
            .await;
        assert!(matches!(result, Err(CareError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_search_superseded_by_newer_request() {
        let service = service(FakeProvider::new(Vec::new()));
        let stale_ticket = service.tracker().begin("tab").await;
        // a newer search for the same client completes first
        service
            .search_nearby("tab", mumbai(), 5000, PlaceCategory::Hospital, None)
            .await
            .unwrap();

        let stale = service.tracker().complete(&stale_ticket, ()).await;
        assert!(matches!(stale, Err(CareError::SearchSuperseded(_))));
        assert_eq!(service.tracker().client_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_search_releases_client() {
        let provider = FakeProvider::failing(CareError::RateLimitExceeded);
        let service = service(provider);

        let result = service
            .search_nearby("tab", mumbai(), 5000, PlaceCategory::Pharmacy, None)
            .await;
        assert!(matches!(result, Err(CareError::RateLimitExceeded)));
        assert_eq!(service.tracker().client_count().await, 0);
    }

    /// Issues a newer search for the same client while the search is running
    struct OvertakenProvider {
        inner: FakeProvider,
        tracker: Arc<SearchTracker>,
    }

    #[async_trait::async_trait]
    impl PlacesProvider for OvertakenProvider {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<RawPlace>, CareError> {
            self.tracker.begin("tab").await;
            self.inner.search(request).await
        }

        async fn get_details(
            &self,
            place_id: &str,
            fields: &[&str],
        ) -> Result<RawPlaceDetails, CareError> {
            self.inner.get_details(place_id, fields).await
        }
    }

    #[tokio::test]
    async fn test_overtaken_search_skips_enrichment() {
        let tracker = Arc::new(SearchTracker::new());
        let overtaken = Arc::new(OvertakenProvider {
            inner: FakeProvider::new(vec![hit("p-1", None, Some(true)), hit("p-2", None, None)]),
            tracker: tracker.clone(),
        });
        let provider: Arc<dyn PlacesProvider> = overtaken.clone();
        let service = PlaceService {
            provider: provider.clone(),
            pipeline: EnrichmentPipeline::new(provider, Duration::from_millis(200)),
            tracker,
        };

        let result = service
            .search_nearby("tab", mumbai(), 5000, PlaceCategory::Pharmacy, None)
            .await;

        assert!(matches!(result, Err(CareError::SearchSuperseded(_))));
        assert!(overtaken.inner.requested_fields.lock().unwrap().is_empty());
    }
}
