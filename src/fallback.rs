//! Alternate-origin fallback for failed lookups
//!
//! When the configured origin yields nothing for a non-domestic destination,
//! the flight approximation is retried from a fixed ordered list of
//! airport-area anchor points, stopping at the first anchor that resolves.

use crate::provider::DistanceProvider;
use crate::retry::{self, RetryOutcome, RetryPolicy};
use tracing::{info, warn};

/// Default anchor points, tried in order
pub const DEFAULT_ANCHORS: &[&str] = &[
    "John F. Kennedy International Airport, Queens, NY",
    "Newark Liberty International Airport, Newark, NJ",
];

/// Ordered alternate origins substituted when the primary origin fails
#[derive(Debug, Clone)]
pub struct FallbackOrigins {
    anchors: Vec<String>,
    policy: RetryPolicy,
}

impl Default for FallbackOrigins {
    fn default() -> Self {
        Self::new(
            DEFAULT_ANCHORS.iter().map(ToString::to_string).collect(),
            RetryPolicy::default(),
        )
    }
}

impl FallbackOrigins {
    #[must_use]
    pub fn new(anchors: Vec<String>, policy: RetryPolicy) -> Self {
        Self { anchors, policy }
    }

    /// Try each anchor in order via the great-circle lookup.
    ///
    /// Returns the first distance that resolves, or `None` when every anchor
    /// fails. The caller decides what an empty result means for its mode.
    pub async fn attempt(
        &self,
        destination: &str,
        provider: &dyn DistanceProvider,
    ) -> Option<f64> {
        for anchor in &self.anchors {
            let outcome = retry::run(&self.policy, || {
                provider.measure_great_circle(anchor, destination)
            })
            .await;

            match outcome {
                RetryOutcome::Success(distance_km) => {
                    info!(%anchor, destination, distance_km, "fallback origin resolved");
                    return Some(distance_km);
                }
                RetryOutcome::Terminal(err) => {
                    warn!(%anchor, destination, error = %err, "fallback origin failed");
                }
                RetryOutcome::Exhausted { attempts, last } => {
                    warn!(
                        %anchor,
                        destination,
                        attempts,
                        error = %last,
                        "fallback origin exhausted retries"
                    );
                }
            }
        }
        None
    }
}
