//! Google Maps web services adapter
//!
//! Ground routes come from the Distance Matrix API; flight approximations
//! geocode both endpoints through the Geocoding API and measure the
//! great-circle arc locally. API statuses are mapped onto the provider error
//! classes so the retry layer can tell a dead route from a service fault.

use super::{GeoPoint, ProviderError, ProviderResult, RouteMetrics, great_circle_km, round2};
use crate::config::ProviderConfig;
use crate::mode::TravelMode;
use crate::provider::DistanceProvider;
use crate::{Result, TripmeterError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Adapter over the Google Maps Distance Matrix and Geocoding APIs
pub struct GoogleMapsProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsProvider {
    /// Create a new adapter from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| TripmeterError::config("Google Maps backend requires an API key"))?;

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

    /// The mode token the Distance Matrix API understands, if any
    fn mode_token(mode: TravelMode) -> ProviderResult<&'static str> {
        match mode {
            TravelMode::Driving => Ok("driving"),
            TravelMode::Transit => Ok("transit"),
            TravelMode::Walking => Ok("walking"),
            TravelMode::Bicycling => Ok("bicycling"),
            TravelMode::Flight | TravelMode::Unsupported => Err(ProviderError::Rejected(format!(
                "'{mode}' is not a routable mode"
            ))),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> ProviderResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("{context} request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ProviderError::Rejected(format!(
                "{context} authentication rejected (HTTP {status})"
            )));
        }
        if status.as_u16() == 429 {
            warn!("{context} rate limited (HTTP 429)");
            return Err(ProviderError::Transient(format!(
                "{context} rate limited (HTTP 429)"
            )));
        }
        if status.is_server_error() {
            return Err(ProviderError::Transient(format!(
                "{context} service error (HTTP {status})"
            )));
        }
        if !status.is_success() {
            return Err(ProviderError::Rejected(format!(
                "{context} failed (HTTP {status})"
            )));
        }

        response.json().await.map_err(|e| {
            ProviderError::Rejected(format!("failed to parse {context} response: {e}"))
        })
    }

    async fn geocode(&self, place: &str) -> ProviderResult<GeoPoint> {
        let url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(place),
            self.api_key
        );

        let response: GeocodeResponse = self.fetch_json(&url, "geocoding").await?;
        parse_geocode(response, place)
    }
}

#[async_trait]
impl DistanceProvider for GoogleMapsProvider {
    #[instrument(skip(self))]
    async fn measure_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> ProviderResult<RouteMetrics> {
        let mode_token = Self::mode_token(mode)?;

        let url = format!(
            "{}/distancematrix/json?origins={}&destinations={}&mode={}&units=metric&departure_time={}&key={}",
            self.base_url,
            urlencoding::encode(origin),
            urlencoding::encode(destination),
            mode_token,
            Utc::now().timestamp(),
            self.api_key
        );

        debug!("Measuring {mode} route: '{origin}' -> '{destination}'");
        let response: MatrixResponse = self.fetch_json(&url, "distance matrix").await?;
        parse_matrix(response)
    }

    #[instrument(skip(self))]
    async fn measure_great_circle(&self, origin: &str, destination: &str) -> ProviderResult<f64> {
        debug!("Approximating flight distance: '{origin}' -> '{destination}'");
        let from = self.geocode(origin).await?;
        let to = self.geocode(destination).await?;
        Ok(round2(great_circle_km(from, to)))
    }
}

/// Distance Matrix response envelope
#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MetricValue>,
    duration: Option<MetricValue>,
}

#[derive(Debug, Deserialize)]
struct MetricValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn classify_top_status(status: &str, error_message: Option<String>) -> Option<ProviderError> {
    match status {
        "OK" => None,
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" | "UNKNOWN_ERROR" => Some(ProviderError::Transient(
            format!("backend reported {status}"),
        )),
        "REQUEST_DENIED" | "INVALID_REQUEST" | "MAX_ELEMENTS_EXCEEDED" => {
            Some(ProviderError::Rejected(format!(
                "backend reported {status}: {}",
                error_message.unwrap_or_default()
            )))
        }
        other => Some(ProviderError::Transient(format!(
            "unexpected backend status {other}"
        ))),
    }
}

fn parse_matrix(response: MatrixResponse) -> ProviderResult<RouteMetrics> {
    if let Some(err) = classify_top_status(&response.status, response.error_message) {
        return Err(err);
    }

    let element = response
        .rows
        .first()
        .and_then(|row| row.elements.first())
        .ok_or_else(|| ProviderError::Rejected("distance matrix response had no elements".into()))?;

    match element.status.as_str() {
        "OK" => {
            let distance = element.distance.as_ref().ok_or_else(|| {
                ProviderError::Rejected("distance matrix element missing distance".into())
            })?;
            let duration = element.duration.as_ref().ok_or_else(|| {
                ProviderError::Rejected("distance matrix element missing duration".into())
            })?;
            Ok(RouteMetrics {
                distance_km: round2(distance.value / 1000.0),
                duration_hours: round2(duration.value / 3600.0),
            })
        }
        "ZERO_RESULTS" => Err(ProviderError::NoRoute),
        "NOT_FOUND" => Err(ProviderError::GeocodeFailure(
            "one of the route endpoints could not be matched".into(),
        )),
        other => Err(ProviderError::Transient(format!(
            "unexpected element status {other}"
        ))),
    }
}

fn parse_geocode(response: GeocodeResponse, place: &str) -> ProviderResult<GeoPoint> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(ProviderError::GeocodeFailure(place.to_string())),
        _ => {
            if let Some(err) = classify_top_status(&response.status, response.error_message) {
                return Err(err);
            }
        }
    }

    response
        .results
        .first()
        .map(|entry| GeoPoint {
            latitude: entry.geometry.location.lat,
            longitude: entry.geometry.location.lng,
        })
        .ok_or_else(|| ProviderError::GeocodeFailure(place.to_string()))
}
