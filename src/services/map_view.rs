// src/services/map_view.rs
// DOCUMENTATION: Map presentation model
// PURPOSE: Markers, info windows and place selection for the map screen

use crate::errors::CareError;
use crate::models::{Coordinate, Place, PlaceCategory, RawPlaceDetails, SelectedPlace};
use crate::services::google_places_client::{PlacesProvider, FULL_DETAIL_FIELDS};
use crate::services::open_status::compute_open_status;
use chrono::{DateTime, Utc};
use geojson::{feature, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Marker kinds drawn on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    User,
    Place,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub id: String,
    pub title: String,
    pub position: Coordinate,
    pub is_open_now: Option<bool>,
    pub rating: Option<f32>,
    /// Straight-line distance from the user, place markers only
    pub distance_km: Option<f64>,
}

/// Everything needed to draw one search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub user_marker: Marker,
    pub markers: Vec<Marker>,
}

impl MapView {
    pub fn marker_count(&self) -> usize {
        self.markers.len() + 1
    }

    /// Export as a GeoJSON FeatureCollection, user marker first
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = std::iter::once(&self.user_marker)
            .chain(self.markers.iter())
            .map(marker_feature)
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn marker_feature(marker: &Marker) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("kind".to_string(), json!(marker.kind));
    properties.insert("title".to_string(), json!(marker.title));
    properties.insert("is_open_now".to_string(), json!(marker.is_open_now));
    properties.insert("rating".to_string(), json!(marker.rating));
    properties.insert("distance_km".to_string(), json!(marker.distance_km));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            marker.position.lng,
            marker.position.lat,
        ]))),
        id: Some(feature::Id::String(marker.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Typed "Select" action carried by an info window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectAction {
    pub place_id: String,
    pub category: PlaceCategory,
}

/// Full details shown when a marker is clicked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoWindow {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub maps_url: Option<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<i32>,
    pub is_open_now: Option<bool>,
    pub weekday_text: Vec<String>,
    pub select: SelectAction,
}

/// Identifies a registered selection handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type SelectionHandler = Arc<dyn Fn(&SelectedPlace) + Send + Sync>;

/// Selection handlers scoped to one presenter
#[derive(Default)]
pub struct SelectionRegistry {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(HandlerId, SelectionHandler)>>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&SelectedPlace) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler; false when it was not registered
    pub fn unregister(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Invoke every handler, returns how many ran
    pub fn dispatch(&self, selected: &SelectedPlace) -> usize {
        // clone out so handlers may (un)register without deadlocking
        let handlers: Vec<SelectionHandler> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in &handlers {
            handler(selected);
        }
        handlers.len()
    }
}

/// Map presenter
/// DOCUMENTATION: Builds map views from enriched places, fetches full details
/// on marker click and emits the selected place to registered handlers
pub struct MapPresenter {
    provider: Arc<dyn PlacesProvider>,
    selections: SelectionRegistry,
}

impl MapPresenter {
    pub fn new(provider: Arc<dyn PlacesProvider>) -> Self {
        Self {
            provider,
            selections: SelectionRegistry::new(),
        }
    }

    pub fn selections(&self) -> &SelectionRegistry {
        &self.selections
    }

    /// One marker per place plus the user marker
    pub fn render(&self, user_location: Coordinate, places: &[Place]) -> MapView {
        let markers = places
            .iter()
            .map(|place| Marker {
                kind: MarkerKind::Place,
                id: place.id.clone(),
                title: place.name.clone(),
                position: place.location,
                is_open_now: place.is_open_now,
                rating: place.rating,
                distance_km: Some(user_location.distance_km(&place.location)),
            })
            .collect();

        MapView {
            center: user_location,
            user_marker: Marker {
                kind: MarkerKind::User,
                id: "user-location".to_string(),
                title: "You are here".to_string(),
                position: user_location,
                is_open_now: None,
                rating: None,
                distance_km: None,
            },
            markers,
        }
    }

    /// Fetch full details for a clicked marker
    /// Without a category, the place's own types decide it
    pub async fn info_window(
        &self,
        place_id: &str,
        category: Option<PlaceCategory>,
    ) -> Result<InfoWindow, CareError> {
        let details = self.provider.get_details(place_id, FULL_DETAIL_FIELDS).await?;
        let category = category.unwrap_or_else(|| PlaceCategory::from_types(&details.types));
        let is_open_now = compute_open_status(
            details.business_status,
            category,
            details.opening_hours.as_ref(),
            Utc::now(),
        );

        Ok(InfoWindow {
            place_id: place_id.to_string(),
            name: details.name.clone().unwrap_or_else(|| place_id.to_string()),
            formatted_address: details.formatted_address.clone(),
            phone: phone_of(&details),
            website: details.website.clone(),
            maps_url: details.url.clone(),
            rating: details.rating,
            user_ratings_total: details.user_ratings_total,
            is_open_now,
            weekday_text: details
                .opening_hours
                .as_ref()
                .and_then(|hours| hours.weekday_text.clone())
                .unwrap_or_default(),
            select: SelectAction {
                place_id: place_id.to_string(),
                category,
            },
        })
    }

    /// Handle the info window's Select action
    pub async fn select(&self, action: &SelectAction) -> Result<SelectedPlace, CareError> {
        self.select_place(&action.place_id, Some(action.category))
            .await
    }

    /// Select a place by id, inferring the category from its types when absent
    pub async fn select_place(
        &self,
        place_id: &str,
        category: Option<PlaceCategory>,
    ) -> Result<SelectedPlace, CareError> {
        let details = self.provider.get_details(place_id, FULL_DETAIL_FIELDS).await?;
        let category = category.unwrap_or_else(|| PlaceCategory::from_types(&details.types));
        let selected = build_selected_place(place_id, category, details, Utc::now())?;

        let notified = self.selections.dispatch(&selected);
        log::info!(
            "Place {} selected, {} handler(s) notified",
            selected.place_id,
            notified
        );
        Ok(selected)
    }
}

fn phone_of(details: &RawPlaceDetails) -> Option<String> {
    details
        .formatted_phone_number
        .clone()
        .or_else(|| details.international_phone_number.clone())
}

/// Build the selected place, recomputing the open status with the same
/// precedence used during enrichment
fn build_selected_place(
    place_id: &str,
    category: PlaceCategory,
    details: RawPlaceDetails,
    now: DateTime<Utc>,
) -> Result<SelectedPlace, CareError> {
    let location = details.location.ok_or_else(|| {
        CareError::ExternalApiError(format!("Details for {} carry no location", place_id))
    })?;
    let is_open_now = compute_open_status(
        details.business_status,
        category,
        details.opening_hours.as_ref(),
        now,
    );

    let place = Place {
        id: place_id.to_string(),
        name: details.name.clone().unwrap_or_else(|| place_id.to_string()),
        location,
        category,
        vicinity: details.formatted_address.clone(),
        rating: details.rating,
        user_ratings_total: details.user_ratings_total,
        business_status: details.business_status,
        opening_hours: details.opening_hours.clone(),
        is_open_now,
    };

    Ok(SelectedPlace {
        place,
        place_id: place_id.to_string(),
        formatted_address: details.formatted_address.clone(),
        phone: phone_of(&details),
        website: details.website.clone(),
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessStatus, OpeningHours};
    use crate::services::enrichment::test_support::{DetailsReply, FakeProvider};
    use std::sync::atomic::AtomicUsize;

    fn full_details(status: Option<BusinessStatus>, open_now: Option<bool>) -> RawPlaceDetails {
        RawPlaceDetails {
            place_id: Some("p1".to_string()),
            name: Some("Lilavati Hospital".to_string()),
            location: Some(Coordinate::new(19.0509, 72.8294)),
            formatted_address: Some("A-791, Bandra Reclamation, Mumbai".to_string()),
            formatted_phone_number: None,
            international_phone_number: Some("+91 22 2675 1000".to_string()),
            website: Some("https://lilavatihospital.com".to_string()),
            url: None,
            rating: Some(4.3),
            user_ratings_total: Some(2000),
            business_status: status,
            opening_hours: open_now.map(|open_now| OpeningHours {
                open_now: Some(open_now),
                weekday_text: Some(vec!["Monday: Open 24 hours".to_string()]),
                ..Default::default()
            }),
            types: vec!["hospital".to_string()],
        }
    }

    fn place(id: &str, is_open_now: Option<bool>) -> Place {
        Place {
            id: id.to_string(),
            name: format!("Place {}", id),
            location: Coordinate::new(19.06, 72.83),
            category: PlaceCategory::Pharmacy,
            vicinity: None,
            rating: None,
            user_ratings_total: None,
            business_status: None,
            opening_hours: None,
            is_open_now,
        }
    }

    #[test]
    fn test_render_adds_user_marker() {
        let presenter = MapPresenter::new(Arc::new(FakeProvider::new(Vec::new())));
        let user = Coordinate::new(19.0760, 72.8777);
        let view = presenter.render(user, &[place("a", Some(true)), place("b", None)]);

        assert_eq!(view.marker_count(), 3);
        assert_eq!(view.user_marker.kind, MarkerKind::User);

        let collection = view.to_geojson();
        assert_eq!(collection.features.len(), 3);
        let first = &collection.features[0];
        assert_eq!(
            first.properties.as_ref().unwrap().get("kind"),
            Some(&json!("user"))
        );
        match &first.geometry.as_ref().unwrap().value {
            Value::Point(coords) => assert_eq!(coords, &vec![72.8777, 19.0760]),
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_registry_register_and_unregister() {
        let registry = SelectionRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let selected =
            build_selected_place("p1", PlaceCategory::Hospital, full_details(None, None), Utc::now())
                .unwrap();
        assert_eq!(registry.dispatch(&selected), 1);
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert_eq!(registry.dispatch(&selected), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_select_recomputes_status_and_notifies() {
        let provider = FakeProvider::new(Vec::new()).with_details(
            "p1",
            DetailsReply::Found(full_details(Some(BusinessStatus::ClosedTemporarily), Some(true))),
        );
        let presenter = MapPresenter::new(Arc::new(provider));
        let seen = Arc::new(RwLock::new(Vec::new()));
        let sink = seen.clone();
        presenter
            .selections()
            .register(move |selected| sink.write().unwrap().push(selected.place_id.clone()));

        let selected = presenter
            .select(&SelectAction {
                place_id: "p1".to_string(),
                category: PlaceCategory::Hospital,
            })
            .await
            .unwrap();

        assert_eq!(selected.place.is_open_now, Some(false));
        assert_eq!(selected.phone.as_deref(), Some("+91 22 2675 1000"));
        assert_eq!(seen.read().unwrap().as_slice(), &["p1".to_string()]);
    }

    #[tokio::test]
    async fn test_info_window_carries_select_action() {
        let provider = FakeProvider::new(Vec::new())
            .with_details("p1", DetailsReply::Found(full_details(None, Some(false))));
        let presenter = MapPresenter::new(Arc::new(provider));

        let window = presenter
            .info_window("p1", Some(PlaceCategory::Hospital))
            .await
            .unwrap();

        assert_eq!(window.name, "Lilavati Hospital");
        assert_eq!(window.is_open_now, Some(true));
        assert_eq!(window.weekday_text.len(), 1);
        assert_eq!(window.select.place_id, "p1");
    }

    #[tokio::test]
    async fn test_select_without_location_fails() {
        let mut details = full_details(None, None);
        details.location = None;
        let provider = FakeProvider::new(Vec::new()).with_details("p1", DetailsReply::Found(details));
        let presenter = MapPresenter::new(Arc::new(provider));

        let result = presenter
            .select(&SelectAction {
                place_id: "p1".to_string(),
                category: PlaceCategory::Pharmacy,
            })
            .await;
        assert!(matches!(result, Err(CareError::ExternalApiError(_))));
    }

    #[tokio::test]
    async fn test_missing_category_inferred_from_types() {
        let mut details = full_details(None, Some(false));
        details.types = vec!["pharmacy".to_string(), "health".to_string(), "store".to_string()];
        let provider = FakeProvider::new(Vec::new())
            .with_details("ph1", DetailsReply::Found(details.clone()))
            .with_details("ph2", DetailsReply::Found(details));
        let presenter = MapPresenter::new(Arc::new(provider));

        let window = presenter.info_window("ph1", None).await.unwrap();
        assert_eq!(window.select.category, PlaceCategory::Pharmacy);
        assert_eq!(window.is_open_now, Some(false));

        let selected = presenter.select_place("ph2", None).await.unwrap();
        assert_eq!(selected.place.category, PlaceCategory::Pharmacy);
        assert!(selected.appointment_prefill().is_none());
    }
}
