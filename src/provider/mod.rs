//! Distance and geocoding provider abstraction
//!
//! The engine talks to whatever mapping backend is configured through the
//! [`DistanceProvider`] trait: a ground-route measurement for a given mode,
//! and a great-circle approximation used for flights. Two adapters are
//! provided, one over the Google Maps web services and one over
//! openrouteservice; the engine never sees backend-specific response shapes.

pub mod google;
pub mod openroute;

pub use google::GoogleMapsProvider;
pub use openroute::OpenRouteProvider;

use crate::config::TripmeterConfig;
use crate::mode::TravelMode;
use crate::retry::ErrorClass;
use crate::{Result, TripmeterError};
use async_trait::async_trait;
use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance and duration reported for one ground route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_hours: f64,
}

/// Geocoded point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Per-call provider failure, classified for retry handling.
///
/// Only [`ProviderError::Transient`] is retried; the other classes are
/// terminal for the call that produced them.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The backend affirmatively reported that no route exists
    #[error("no route between the given locations")]
    NoRoute,

    /// One or both locations could not be resolved to coordinates
    #[error("location could not be geocoded: {0}")]
    GeocodeFailure(String),

    /// The backend rejected the request (bad credentials, unsupported mode,
    /// malformed query or response)
    #[error("request rejected by the backend: {0}")]
    Rejected(String),

    /// Connectivity, rate-limit, or service fault worth retrying
    #[error("transient backend failure: {0}")]
    Transient(String),
}

impl ProviderError {
    /// Stable tag recorded in output rows and logs
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderError::NoRoute => "no_route",
            ProviderError::GeocodeFailure(_) => "geocode_failure",
            ProviderError::Rejected(_) => "rejected",
            ProviderError::Transient(_) => "transient_failure",
        }
    }

    /// Whether a different origin could plausibly change the answer
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ProviderError::Rejected(_))
    }
}

impl ErrorClass for ProviderError {
    fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Capability interface over the configured mapping backend.
///
/// Both operations are pure queries: safe to repeat with identical arguments,
/// no state accumulated on either side.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Measure a ground route between two place descriptors for a mode.
    async fn measure_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> ProviderResult<RouteMetrics>;

    /// Geocode both place descriptors and approximate the flight distance
    /// as a great-circle arc.
    async fn measure_great_circle(&self, origin: &str, destination: &str) -> ProviderResult<f64>;
}

/// Construct the configured backend adapter.
pub fn from_config(config: &TripmeterConfig) -> Result<Box<dyn DistanceProvider>> {
    match config.provider.backend.as_str() {
        "google" => Ok(Box::new(GoogleMapsProvider::new(&config.provider)?)),
        "openroute" => Ok(Box::new(OpenRouteProvider::new(&config.provider)?)),
        other => Err(TripmeterError::config(format!(
            "unknown provider backend '{other}'"
        ))),
    }
}

/// Great-circle distance in kilometers between two geocoded points
#[must_use]
pub fn great_circle_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let from = HaversineLocation {
        latitude: from.latitude,
        longitude: from.longitude,
    };
    let to = HaversineLocation {
        latitude: to.latitude,
        longitude: to.longitude,
    };
    distance(from, to, Units::Kilometers)
}

/// Round to two decimals, matching the precision written to output records
#[must_use]
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ProviderError::Transient("timeout".into()).is_transient());
        assert!(!ProviderError::NoRoute.is_transient());
        assert!(!ProviderError::GeocodeFailure("nowhere".into()).is_transient());
        assert!(!ProviderError::Rejected("bad key".into()).is_transient());
    }

    #[test]
    fn test_rejected_is_not_recoverable() {
        assert!(!ProviderError::Rejected("bad key".into()).is_recoverable());
        assert!(ProviderError::NoRoute.is_recoverable());
        assert!(ProviderError::GeocodeFailure("nowhere".into()).is_recoverable());
        assert!(ProviderError::Transient("timeout".into()).is_recoverable());
    }

    #[test]
    fn test_error_tags() {
        assert_eq!(ProviderError::NoRoute.tag(), "no_route");
        assert_eq!(ProviderError::GeocodeFailure(String::new()).tag(), "geocode_failure");
        assert_eq!(ProviderError::Rejected(String::new()).tag(), "rejected");
        assert_eq!(ProviderError::Transient(String::new()).tag(), "transient_failure");
    }

    #[test]
    fn test_great_circle_new_york_to_london() {
        // JFK to Heathrow, roughly 5540 km
        let jfk = GeoPoint {
            latitude: 40.6413,
            longitude: -73.7781,
        };
        let lhr = GeoPoint {
            latitude: 51.4700,
            longitude: -0.4543,
        };
        let km = great_circle_km(jfk, lhr);
        assert!((5400.0..5700.0).contains(&km), "got {km}");
    }

    #[test]
    fn test_great_circle_zero_for_same_point() {
        let p = GeoPoint {
            latitude: 40.0,
            longitude: -74.0,
        };
        assert!(great_circle_km(p, p).abs() < 1e-6);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(50.0), 50.0);
    }
}
