//! Trip records and resolved route descriptors

use crate::mode::{TravelMode, resolve_travel_mode};
use serde::{Deserialize, Serialize};

/// One origin/destination trip record, as supplied by the tabular layer.
///
/// Immutable input to a single resolution; constructed from one input row and
/// discarded once its result is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin_city: String,
    pub origin_region: Option<String>,
    pub destination_city: String,
    pub destination_region: Option<String>,
    pub destination_country: Option<String>,
    /// Free text, comma-separated travel-method list
    pub raw_travel_methods: String,
}

impl TripRequest {
    #[must_use]
    pub fn has_destination(&self) -> bool {
        !self.destination_city.trim().is_empty()
    }

    #[must_use]
    pub fn has_travel_methods(&self) -> bool {
        !self.raw_travel_methods.trim().is_empty()
    }
}

/// Address-building rules applied when turning a trip record into
/// provider-facing place strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRules {
    /// Origin substituted when a record carries no starting city
    pub default_origin: String,
    /// Country treated as domestic for region-based formatting
    pub domestic_country: String,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            default_origin: "New York, NY".to_string(),
            domestic_country: "united states".to_string(),
        }
    }
}

impl RouteRules {
    /// A destination with no country is treated as domestic.
    #[must_use]
    pub fn is_domestic(&self, country: Option<&str>) -> bool {
        match country.map(str::trim) {
            None => true,
            Some(c) if c.is_empty() => true,
            Some(c) => c.eq_ignore_ascii_case(&self.domestic_country),
        }
    }
}

/// Provider-facing origin/destination strings plus the resolved mode.
/// Built once per request; the mode never changes after this point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub effective_origin: String,
    pub effective_destination: String,
    pub mode: TravelMode,
}

impl ResolvedRoute {
    /// Build the effective route for a request.
    ///
    /// A blank origin city falls back to the configured default origin.
    /// Domestic destinations are formatted as "city, region"; non-domestic
    /// destinations as "city, country".
    #[must_use]
    pub fn build(request: &TripRequest, rules: &RouteRules) -> Self {
        let origin_city = request.origin_city.trim();
        let effective_origin = if origin_city.is_empty() {
            rules.default_origin.clone()
        } else {
            join_place(origin_city, request.origin_region.as_deref())
        };

        let destination_city = request.destination_city.trim();
        let effective_destination = if rules.is_domestic(request.destination_country.as_deref()) {
            join_place(destination_city, request.destination_region.as_deref())
        } else {
            join_place(destination_city, request.destination_country.as_deref())
        };

        Self {
            effective_origin,
            effective_destination,
            mode: resolve_travel_mode(&request.raw_travel_methods),
        }
    }
}

fn join_place(city: &str, suffix: Option<&str>) -> String {
    match suffix.map(str::trim).filter(|s| !s.is_empty()) {
        Some(suffix) => format!("{city}, {suffix}"),
        None => city.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        origin: &str,
        destination: &str,
        region: Option<&str>,
        country: Option<&str>,
        methods: &str,
    ) -> TripRequest {
        TripRequest {
            origin_city: origin.to_string(),
            origin_region: None,
            destination_city: destination.to_string(),
            destination_region: region.map(str::to_string),
            destination_country: country.map(str::to_string),
            raw_travel_methods: methods.to_string(),
        }
    }

    #[test]
    fn test_domestic_destination_appends_region() {
        let req = request("Boston", "Albany", Some("NY"), Some("united states"), "car");
        let route = ResolvedRoute::build(&req, &RouteRules::default());
        assert_eq!(route.effective_destination, "Albany, NY");
        assert_eq!(route.mode, TravelMode::Driving);
    }

    #[test]
    fn test_non_domestic_destination_appends_country() {
        let req = request("Boston", "Paris", Some("Ile-de-France"), Some("France"), "flight");
        let route = ResolvedRoute::build(&req, &RouteRules::default());
        assert_eq!(route.effective_destination, "Paris, France");
        assert_eq!(route.mode, TravelMode::Flight);
    }

    #[test]
    fn test_domestic_match_is_case_insensitive() {
        let rules = RouteRules::default();
        assert!(rules.is_domestic(Some("United States")));
        assert!(rules.is_domestic(Some("UNITED STATES")));
        assert!(!rules.is_domestic(Some("France")));
    }

    #[test]
    fn test_missing_country_treated_as_domestic() {
        let req = request("Boston", "Albany", Some("NY"), None, "car");
        let route = ResolvedRoute::build(&req, &RouteRules::default());
        assert_eq!(route.effective_destination, "Albany, NY");
    }

    #[test]
    fn test_blank_origin_uses_default() {
        let req = request("", "Paris", None, Some("France"), "flight");
        let route = ResolvedRoute::build(&req, &RouteRules::default());
        assert_eq!(route.effective_origin, "New York, NY");
    }

    #[test]
    fn test_origin_region_is_appended() {
        let mut req = request("Portland", "Seattle", None, None, "car");
        req.origin_region = Some("OR".to_string());
        let route = ResolvedRoute::build(&req, &RouteRules::default());
        assert_eq!(route.effective_origin, "Portland, OR");
    }

    #[test]
    fn test_blank_region_is_ignored() {
        let req = request("Boston", "Albany", Some("  "), None, "car");
        let route = ResolvedRoute::build(&req, &RouteRules::default());
        assert_eq!(route.effective_destination, "Albany");
    }

    #[test]
    fn test_skip_predicates() {
        let req = request("Boston", "", None, None, "");
        assert!(!req.has_destination());
        assert!(!req.has_travel_methods());

        let req = request("Boston", "Albany", None, None, "car");
        assert!(req.has_destination());
        assert!(req.has_travel_methods());
    }
}
