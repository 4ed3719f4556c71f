//! openrouteservice adapter
//!
//! Geocoding goes through the Pelias-based `/geocode/search` endpoint and
//! ground routes through `/v2/directions/{profile}`. The backend has no
//! public-transport profile, so transit lookups are rejected outright rather
//! than silently routed as driving. Flight approximations geocode both
//! endpoints and measure the great-circle arc locally.

use super::{GeoPoint, ProviderError, ProviderResult, RouteMetrics, great_circle_km, round2};
use crate::config::ProviderConfig;
use crate::mode::TravelMode;
use crate::provider::DistanceProvider;
use crate::{Result, TripmeterError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Adapter over the openrouteservice geocoding and directions APIs
pub struct OpenRouteProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouteProvider {
    /// Create a new adapter from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| TripmeterError::config("openrouteservice backend requires an API key"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("Tripmeter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TripmeterError::general(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// The routing profile for a mode; transit has no openrouteservice
    /// equivalent and is rejected rather than approximated.
    fn profile(mode: TravelMode) -> ProviderResult<&'static str> {
        match mode {
            TravelMode::Driving => Ok("driving-car"),
            TravelMode::Walking => Ok("foot-walking"),
            TravelMode::Bicycling => Ok("cycling-regular"),
            TravelMode::Transit => Err(ProviderError::Rejected(
                "openrouteservice has no public transport profile".into(),
            )),
            TravelMode::Flight | TravelMode::Unsupported => Err(ProviderError::Rejected(format!(
                "'{mode}' is not a routable mode"
            ))),
        }
    }

    fn classify_http(status: reqwest::StatusCode, context: &str) -> Option<ProviderError> {
        if status.is_success() {
            return None;
        }
        Some(match status.as_u16() {
            401 | 403 => {
                ProviderError::Rejected(format!("{context} authentication rejected (HTTP {status})"))
            }
            // Directions reports unreachable coordinate pairs as 404
            404 => ProviderError::NoRoute,
            429 => ProviderError::Transient(format!("{context} rate limited (HTTP 429)")),
            code if status.is_server_error() => {
                ProviderError::Transient(format!("{context} service error (HTTP {code})"))
            }
            _ => ProviderError::Rejected(format!("{context} failed (HTTP {status})")),
        })
    }

    async fn geocode(&self, place: &str) -> ProviderResult<GeoPoint> {
        let url = format!(
            "{}/geocode/search?api_key={}&text={}&size=1",
            self.base_url,
            self.api_key,
            urlencoding::encode(place)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("geocoding request failed: {e}")))?;

        if let Some(err) = Self::classify_http(response.status(), "geocoding") {
            // An unmatched place is a geocode miss, not a dead route
            return Err(match err {
                ProviderError::NoRoute => ProviderError::GeocodeFailure(place.to_string()),
                other => other,
            });
        }

        let geocode: GeocodeResponse = response.json().await.map_err(|e| {
            ProviderError::Rejected(format!("failed to parse geocoding response: {e}"))
        })?;

        parse_geocode(geocode, place)
    }
}

#[async_trait]
impl DistanceProvider for OpenRouteProvider {
    #[instrument(skip(self))]
    async fn measure_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> ProviderResult<RouteMetrics> {
        let profile = Self::profile(mode)?;

        let from = self.geocode(origin).await?;
        let to = self.geocode(destination).await?;

        let url = format!("{}/v2/directions/{}", self.base_url, profile);
        let body = serde_json::json!({
            "coordinates": [
                [from.longitude, from.latitude],
                [to.longitude, to.latitude]
            ]
        });

        debug!("Measuring {mode} route: '{origin}' -> '{destination}'");
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("directions request failed: {e}")))?;

        if let Some(err) = Self::classify_http(response.status(), "directions") {
            return Err(err);
        }

        let directions: DirectionsResponse = response.json().await.map_err(|e| {
            ProviderError::Rejected(format!("failed to parse directions response: {e}"))
        })?;

        parse_directions(directions)
    }

    #[instrument(skip(self))]
    async fn measure_great_circle(&self, origin: &str, destination: &str) -> ProviderResult<f64> {
        debug!("Approximating flight distance: '{origin}' -> '{destination}'");
        let from = self.geocode(origin).await?;
        let to = self.geocode(destination).await?;
        Ok(round2(great_circle_km(from, to)))
    }
}

/// GeoJSON feature collection returned by `/geocode/search`
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    geometry: FeatureGeometry,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    /// `[longitude, latitude]` per GeoJSON
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    summary: RouteSummary,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
}

fn parse_geocode(response: GeocodeResponse, place: &str) -> ProviderResult<GeoPoint> {
    let feature = response
        .features
        .first()
        .ok_or_else(|| ProviderError::GeocodeFailure(place.to_string()))?;

    match feature.geometry.coordinates.as_slice() {
        [longitude, latitude, ..] => Ok(GeoPoint {
            latitude: *latitude,
            longitude: *longitude,
        }),
        _ => Err(ProviderError::Rejected(
            "geocoding feature had malformed coordinates".into(),
        )),
    }
}

fn parse_directions(response: DirectionsResponse) -> ProviderResult<RouteMetrics> {
    let route = response.routes.first().ok_or(ProviderError::NoRoute)?;
    Ok(RouteMetrics {
        distance_km: round2(route.summary.distance / 1000.0),
        duration_hours: round2(route.summary.duration / 3600.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geocode_feature() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{"features": [{"geometry": {"coordinates": [-74.0060, 40.7128]}}]}"#,
        )
        .unwrap();
        let point = parse_geocode(response, "New York").unwrap();
        assert_eq!(point.latitude, 40.7128);
        assert_eq!(point.longitude, -74.0060);
    }

    #[test]
    fn test_empty_features_is_geocode_failure() {
        let response: GeocodeResponse = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(matches!(
            parse_geocode(response, "Nowhere"),
            Err(ProviderError::GeocodeFailure(_))
        ));
    }

    #[test]
    fn test_parse_directions_summary() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{"routes": [{"summary": {"distance": 306500.0, "duration": 10980.0}}]}"#,
        )
        .unwrap();
        let metrics = parse_directions(response).unwrap();
        assert_eq!(metrics.distance_km, 306.5);
        assert_eq!(metrics.duration_hours, 3.05);
    }

    #[test]
    fn test_empty_routes_is_no_route() {
        let response: DirectionsResponse = serde_json::from_str(r#"{"routes": []}"#).unwrap();
        assert!(matches!(
            parse_directions(response),
            Err(ProviderError::NoRoute)
        ));
    }

    #[test]
    fn test_transit_is_rejected() {
        assert!(matches!(
            OpenRouteProvider::profile(TravelMode::Transit),
            Err(ProviderError::Rejected(_))
        ));
        assert_eq!(
            OpenRouteProvider::profile(TravelMode::Driving).unwrap(),
            "driving-car"
        );
        assert_eq!(
            OpenRouteProvider::profile(TravelMode::Bicycling).unwrap(),
            "cycling-regular"
        );
    }

    #[test]
    fn test_http_classification() {
        use reqwest::StatusCode;
        assert!(OpenRouteProvider::classify_http(StatusCode::OK, "t").is_none());
        assert!(matches!(
            OpenRouteProvider::classify_http(StatusCode::NOT_FOUND, "t"),
            Some(ProviderError::NoRoute)
        ));
        assert!(matches!(
            OpenRouteProvider::classify_http(StatusCode::TOO_MANY_REQUESTS, "t"),
            Some(ProviderError::Transient(_))
        ));
        assert!(matches!(
            OpenRouteProvider::classify_http(StatusCode::UNAUTHORIZED, "t"),
            Some(ProviderError::Rejected(_))
        ));
        assert!(matches!(
            OpenRouteProvider::classify_http(StatusCode::BAD_GATEWAY, "t"),
            Some(ProviderError::Transient(_))
        ));
    }
}
