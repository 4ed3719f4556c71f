//! Per-record lookup outcomes

use crate::mode::TravelMode;
use crate::provider::RouteMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal state of one trip record's resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupOutcome {
    /// A usable distance was produced
    Success,
    /// The record was not queried (missing fields or unresolved mode)
    Skipped,
    /// Lookups failed; the batch continues
    Failed,
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupOutcome::Success => "success",
            LookupOutcome::Skipped => "skipped",
            LookupOutcome::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The single result every trip record resolves to.
///
/// `duration_hours` is only ever set for ground modes. A failed flight lookup
/// still carries a zero distance, while a failed ground lookup leaves the
/// distance absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub mode: TravelMode,
    pub distance_km: Option<f64>,
    pub duration_hours: Option<f64>,
    pub outcome: LookupOutcome,
    pub failure_reason: Option<String>,
}

impl DistanceResult {
    /// Successful ground-mode lookup with distance and duration
    #[must_use]
    pub fn route_success(mode: TravelMode, metrics: RouteMetrics) -> Self {
        Self {
            mode,
            distance_km: Some(metrics.distance_km),
            duration_hours: Some(metrics.duration_hours),
            outcome: LookupOutcome::Success,
            failure_reason: None,
        }
    }

    /// Successful distance-only lookup (flight, or a straight-line stand-in
    /// after a ground route could not be resolved)
    #[must_use]
    pub fn distance_success(mode: TravelMode, distance_km: f64) -> Self {
        Self {
            mode,
            distance_km: Some(distance_km),
            duration_hours: None,
            outcome: LookupOutcome::Success,
            failure_reason: None,
        }
    }

    /// Record skipped before any provider call
    #[must_use]
    pub fn skipped(reason: &str) -> Self {
        Self {
            mode: TravelMode::Unsupported,
            distance_km: None,
            duration_hours: None,
            outcome: LookupOutcome::Skipped,
            failure_reason: Some(reason.to_string()),
        }
    }

    /// Failed lookup; flight failures carry the zero sentinel in
    /// `distance_km`, ground failures carry `None`
    #[must_use]
    pub fn failed(mode: TravelMode, distance_km: Option<f64>, reason: &str) -> Self {
        Self {
            mode,
            distance_km,
            duration_hours: None,
            outcome: LookupOutcome::Failed,
            failure_reason: Some(reason.to_string()),
        }
    }
}

/// Distances for every mode of one record, queried in a fixed order:
/// driving, transit, walking, bicycling, then the flight approximation.
/// Failed lookups leave their slot empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeSurvey {
    pub driving: Option<RouteMetrics>,
    pub transit: Option<RouteMetrics>,
    pub walking: Option<RouteMetrics>,
    pub bicycling: Option<RouteMetrics>,
    pub flight_distance_km: Option<f64>,
}
