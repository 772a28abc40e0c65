// src/services/geolocation.rs
// DOCUMENTATION: Geolocation provider
// PURPOSE: Best-effort user coordinate with a fixed fallback

use crate::models::Coordinate;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Something that can report where the user is
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// One-shot location request
    async fn locate(&self, high_accuracy: bool) -> Result<Coordinate>;
}

/// Coordinate reported by the browser alongside the request
/// DOCUMENTATION: `None` means permission was denied or geolocation is
/// unsupported on the client
pub struct ReportedLocation(pub Option<Coordinate>);

#[async_trait]
impl LocationSource for ReportedLocation {
    async fn locate(&self, _high_accuracy: bool) -> Result<Coordinate> {
        match self.0 {
            Some(coordinate) if coordinate.is_valid() => Ok(coordinate),
            Some(coordinate) => bail!(
                "reported coordinate out of range: {}, {}",
                coordinate.lat,
                coordinate.lng
            ),
            None => bail!("location unavailable or permission denied"),
        }
    }
}

/// Where a resolved coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationOrigin {
    Detected,
    Fallback,
    /// Search re-centred on a point the user clicked
    MapClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub origin: LocationOrigin,
}

impl ResolvedLocation {
    pub fn map_click(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            origin: LocationOrigin::MapClick,
        }
    }
}

/// Geolocation provider
/// DOCUMENTATION: Never fails; denial, errors and timeouts resolve to the
/// configured fallback coordinate so a search always has a center
#[derive(Debug, Clone)]
pub struct GeolocationProvider {
    fallback: Coordinate,
    default_timeout: Duration,
}

impl GeolocationProvider {
    pub fn new(fallback: Coordinate, default_timeout: Duration) -> Self {
        Self {
            fallback,
            default_timeout,
        }
    }

    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }

    /// Resolve the user's location
    pub async fn current_location(
        &self,
        source: &dyn LocationSource,
        timeout: Option<Duration>,
        high_accuracy: bool,
    ) -> ResolvedLocation {
        let timeout = timeout.unwrap_or(self.default_timeout);

        match tokio::time::timeout(timeout, source.locate(high_accuracy)).await {
            Ok(Ok(coordinate)) => ResolvedLocation {
                coordinate,
                origin: LocationOrigin::Detected,
            },
            Ok(Err(e)) => {
                log::info!("Geolocation unavailable ({}), using fallback", e);
                self.fallback_location()
            }
            Err(_) => {
                log::warn!("Geolocation timed out after {:?}, using fallback", timeout);
                self.fallback_location()
            }
        }
    }

    fn fallback_location(&self) -> ResolvedLocation {
        ResolvedLocation {
            coordinate: self.fallback,
            origin: LocationOrigin::Fallback,
        }
    }
}
