//! Per-record trip processing
//!
//! One processor instance owns the route-building rules, the retry policy,
//! and the fallback origins, and borrows the provider handle constructed by
//! the caller. Records flow through strictly sequentially; the chosen mode
//! never changes once its lookup has started.

use crate::config::TripmeterConfig;
use crate::fallback::FallbackOrigins;
use crate::mode::TravelMode;
use crate::models::{DistanceResult, ModeSurvey, ResolvedRoute, RouteRules, TripRequest};
use crate::provider::{DistanceProvider, RouteMetrics};
use crate::retry::{self, RetryOutcome, RetryPolicy};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Resolves trip records against a shared provider handle
pub struct TripProcessor<'a> {
    provider: &'a dyn DistanceProvider,
    rules: RouteRules,
    retry: RetryPolicy,
    fallback: FallbackOrigins,
    /// Pause between consecutive lookups within one record's survey
    pacing: Duration,
}

impl<'a> TripProcessor<'a> {
    #[must_use]
    pub fn new(
        provider: &'a dyn DistanceProvider,
        rules: RouteRules,
        retry: RetryPolicy,
        fallback: FallbackOrigins,
        pacing: Duration,
    ) -> Self {
        Self {
            provider,
            rules,
            retry,
            fallback,
            pacing,
        }
    }

    /// Processor with default rules and policies
    #[must_use]
    pub fn with_defaults(provider: &'a dyn DistanceProvider) -> Self {
        Self::new(
            provider,
            RouteRules::default(),
            RetryPolicy::default(),
            FallbackOrigins::default(),
            Duration::from_millis(100),
        )
    }

    /// Processor wired from application configuration
    #[must_use]
    pub fn from_config(provider: &'a dyn DistanceProvider, config: &TripmeterConfig) -> Self {
        let retry = RetryPolicy::new(
            config.provider.max_attempts,
            Duration::from_millis(config.provider.retry_delay_ms),
        );
        Self::new(
            provider,
            RouteRules {
                default_origin: config.route.default_origin.clone(),
                domestic_country: config.route.domestic_country.clone(),
            },
            retry.clone(),
            FallbackOrigins::new(config.route.fallback_origins.clone(), retry),
            Duration::from_millis(config.provider.pacing_ms),
        )
    }

    /// Resolve one trip record to exactly one result.
    pub async fn process(&self, request: &TripRequest) -> DistanceResult {
        if !request.has_destination() {
            debug!("skipping record with blank destination");
            return DistanceResult::skipped("missing destination");
        }
        if !request.has_travel_methods() {
            debug!("skipping record with blank travel methods");
            return DistanceResult::skipped("missing travel methods");
        }

        let route = ResolvedRoute::build(request, &self.rules);
        if route.mode == TravelMode::Unsupported {
            info!(
                methods = %request.raw_travel_methods,
                "travel methods did not resolve to a supported mode, skipping"
            );
            return DistanceResult::skipped("unsupported or ambiguous travel methods");
        }

        debug!(
            origin = %route.effective_origin,
            destination = %route.effective_destination,
            mode = %route.mode,
            "resolving trip"
        );

        let domestic = self
            .rules
            .is_domestic(request.destination_country.as_deref());

        if route.mode == TravelMode::Flight {
            self.flight_lookup(&route).await
        } else {
            self.ground_lookup(&route, domestic).await
        }
    }

    /// Query every mode for one record: the four ground modes in a fixed
    /// order, then the flight approximation, pacing between lookups. Failed
    /// lookups leave their slot empty; the survey never substitutes origins.
    pub async fn survey(&self, request: &TripRequest) -> ModeSurvey {
        if !request.has_destination() {
            debug!("skipping survey for record with blank destination");
            return ModeSurvey::default();
        }

        let route = ResolvedRoute::build(request, &self.rules);

        let driving = self.query_route(&route, TravelMode::Driving).await;
        sleep(self.pacing).await;
        let transit = self.query_route(&route, TravelMode::Transit).await;
        sleep(self.pacing).await;
        let walking = self.query_route(&route, TravelMode::Walking).await;
        sleep(self.pacing).await;
        let bicycling = self.query_route(&route, TravelMode::Bicycling).await;
        sleep(self.pacing).await;

        let flight = retry::run(&self.retry, || {
            self.provider
                .measure_great_circle(&route.effective_origin, &route.effective_destination)
        })
        .await;

        ModeSurvey {
            driving,
            transit,
            walking,
            bicycling,
            flight_distance_km: flight.into_success(),
        }
    }

    async fn query_route(&self, route: &ResolvedRoute, mode: TravelMode) -> Option<RouteMetrics> {
        let outcome = retry::run(&self.retry, || {
            self.provider
                .measure_route(&route.effective_origin, &route.effective_destination, mode)
        })
        .await;

        match outcome {
            RetryOutcome::Success(metrics) => Some(metrics),
            RetryOutcome::Terminal(err) => {
                debug!(mode = %mode, error = %err, "survey lookup failed");
                None
            }
            RetryOutcome::Exhausted { attempts, last } => {
                warn!(mode = %mode, attempts, error = %last, "survey lookup exhausted retries");
                None
            }
        }
    }

    async fn ground_lookup(&self, route: &ResolvedRoute, domestic: bool) -> DistanceResult {
        let outcome = retry::run(&self.retry, || {
            self.provider.measure_route(
                &route.effective_origin,
                &route.effective_destination,
                route.mode,
            )
        })
        .await;

        match outcome {
            RetryOutcome::Success(metrics) => DistanceResult::route_success(route.mode, metrics),
            RetryOutcome::Terminal(err) => {
                warn!(
                    destination = %route.effective_destination,
                    mode = %route.mode,
                    error = %err,
                    "ground lookup failed"
                );
                self.ground_failure(route, domestic, err.is_recoverable(), err.tag())
                    .await
            }
            RetryOutcome::Exhausted { attempts, last } => {
                warn!(
                    destination = %route.effective_destination,
                    mode = %route.mode,
                    attempts,
                    error = %last,
                    "ground lookup exhausted retries"
                );
                self.ground_failure(route, domestic, true, "retries_exhausted")
                    .await
            }
        }
    }

    /// A failed ground route to a non-domestic destination still gets a
    /// straight-line stand-in from the fallback anchors; a domestic one does
    /// not, and its distance stays absent.
    async fn ground_failure(
        &self,
        route: &ResolvedRoute,
        domestic: bool,
        recoverable: bool,
        reason: &str,
    ) -> DistanceResult {
        if !domestic && recoverable {
            if let Some(distance_km) = self
                .fallback
                .attempt(&route.effective_destination, self.provider)
                .await
            {
                return DistanceResult::distance_success(route.mode, distance_km);
            }
        }
        DistanceResult::failed(route.mode, None, reason)
    }

    async fn flight_lookup(&self, route: &ResolvedRoute) -> DistanceResult {
        let outcome = retry::run(&self.retry, || {
            self.provider
                .measure_great_circle(&route.effective_origin, &route.effective_destination)
        })
        .await;

        match outcome {
            RetryOutcome::Success(distance_km) => {
                DistanceResult::distance_success(TravelMode::Flight, distance_km)
            }
            RetryOutcome::Terminal(err) => {
                warn!(
                    destination = %route.effective_destination,
                    error = %err,
                    "flight lookup failed"
                );
                self.flight_failure(route).await
            }
            RetryOutcome::Exhausted { attempts, last } => {
                warn!(
                    destination = %route.effective_destination,
                    attempts,
                    error = %last,
                    "flight lookup exhausted retries"
                );
                self.flight_failure(route).await
            }
        }
    }

    /// A flight distance is always populated: the fallback anchors first,
    /// and the zero sentinel when every anchor fails too.
    async fn flight_failure(&self, route: &ResolvedRoute) -> DistanceResult {
        match self
            .fallback
            .attempt(&route.effective_destination, self.provider)
            .await
        {
            Some(distance_km) => DistanceResult::distance_success(TravelMode::Flight, distance_km),
            None => {
                warn!(
                    destination = %route.effective_destination,
                    "every fallback origin failed, recording zero flight distance"
                );
                DistanceResult::failed(TravelMode::Flight, Some(0.0), "flight_fallback_exhausted")
            }
        }
    }
}
