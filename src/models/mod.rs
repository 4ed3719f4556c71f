//! Data models for the `Tripmeter` application
//!
//! This module contains the core domain models organized by concern:
//! - Trip: input trip records and resolved route descriptors
//! - Result: per-record lookup outcomes and the all-modes survey

pub mod result;
pub mod trip;

// Re-export all public types for convenient access
pub use result::{DistanceResult, LookupOutcome, ModeSurvey};
pub use trip::{ResolvedRoute, RouteRules, TripRequest};
