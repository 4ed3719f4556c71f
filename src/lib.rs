//! `Tripmeter` - batch travel distance resolution
//!
//! This library resolves a representative travel distance (and duration for
//! ground modes) for origin/destination trip records, selecting the transport
//! mode from free-text travel-method lists and querying a pluggable
//! geocoding/routing backend with bounded retries and alternate-origin
//! fallback.

pub mod batch;
pub mod config;
pub mod error;
pub mod fallback;
pub mod mode;
pub mod models;
pub mod processor;
pub mod provider;
pub mod retry;

// Re-export core types for public API
pub use batch::{BatchSummary, TripRecord};
pub use config::TripmeterConfig;
pub use error::TripmeterError;
pub use fallback::FallbackOrigins;
pub use mode::{TravelMode, resolve_travel_mode};
pub use models::{DistanceResult, LookupOutcome, ModeSurvey, ResolvedRoute, RouteRules, TripRequest};
pub use processor::TripProcessor;
pub use provider::{DistanceProvider, ProviderError, RouteMetrics};
pub use retry::{RetryOutcome, RetryPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripmeterError>;
