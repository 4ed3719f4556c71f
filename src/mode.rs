//! Travel mode resolution from free-text travel-method lists
//!
//! Input text arrives as loosely formatted, comma-separated method lists
//! ("Personal Car", "bus, plane", "Rental car, Train"). Resolution is a pure
//! function over a static ordered synonym table; flight outranks any other
//! mode listed alongside it, and any other multi-mode list is ambiguous.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported transport modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelMode {
    Driving,
    Transit,
    Walking,
    Bicycling,
    Flight,
    /// Unmatched or ambiguous input; the caller treats this as a skip
    Unsupported,
}

impl TravelMode {
    /// Modes routed over the surface network, with a travel duration
    #[must_use]
    pub fn is_ground(self) -> bool {
        matches!(
            self,
            TravelMode::Driving | TravelMode::Transit | TravelMode::Walking | TravelMode::Bicycling
        )
    }

    /// Stable lower-case label used in output records and logs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Flight => "flight",
            TravelMode::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Synonyms that mark a method token as a flight
const FLIGHT_SYNONYMS: &[&str] = &["plane", "flight", "airplane"];

/// Ordered synonym table; earlier entries win when a token matches several.
/// "rental car" and "personal car" precede the bare "car" substring so the
/// table reads in the same order the matching happens.
const SYNONYM_TABLE: &[(&[&str], TravelMode)] = &[
    (&["rental car", "personal car", "car"], TravelMode::Driving),
    (
        &["public transport", "bus", "train", "subway"],
        TravelMode::Transit,
    ),
    (&["walking"], TravelMode::Walking),
    (&["bicycling"], TravelMode::Bicycling),
    (FLIGHT_SYNONYMS, TravelMode::Flight),
];

/// Resolve a raw travel-method string into a single transport mode.
///
/// Identical input always resolves to the same mode. Lists with more than one
/// method resolve to [`TravelMode::Flight`] when any entry names a flight,
/// and to [`TravelMode::Unsupported`] otherwise.
#[must_use]
pub fn resolve_travel_mode(raw_travel_methods: &str) -> TravelMode {
    let lowered = raw_travel_methods.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    match tokens.as_slice() {
        [] => TravelMode::Unsupported,
        [single] => match_single_token(single),
        many => {
            let has_flight = many
                .iter()
                .any(|token| FLIGHT_SYNONYMS.iter().any(|syn| token.contains(syn)));
            if has_flight {
                TravelMode::Flight
            } else {
                TravelMode::Unsupported
            }
        }
    }
}

fn match_single_token(token: &str) -> TravelMode {
    for (patterns, mode) in SYNONYM_TABLE {
        if patterns.iter().any(|pattern| token.contains(pattern)) {
            return *mode;
        }
    }
    TravelMode::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("personal car", TravelMode::Driving)]
    #[case("rental car", TravelMode::Driving)]
    #[case("Car", TravelMode::Driving)]
    #[case("public transport", TravelMode::Transit)]
    #[case("bus", TravelMode::Transit)]
    #[case("train", TravelMode::Transit)]
    #[case("subway", TravelMode::Transit)]
    #[case("walking", TravelMode::Walking)]
    #[case("bicycling", TravelMode::Bicycling)]
    #[case("flight", TravelMode::Flight)]
    #[case("Airplane", TravelMode::Flight)]
    #[case("teleporter", TravelMode::Unsupported)]
    fn test_single_token_mapping(#[case] raw: &str, #[case] expected: TravelMode) {
        assert_eq!(resolve_travel_mode(raw), expected);
    }

    #[rstest]
    #[case("car, flight", TravelMode::Flight)]
    #[case("bus, plane, walking", TravelMode::Flight)]
    #[case("Rental Car, Airplane", TravelMode::Flight)]
    fn test_flight_priority(#[case] raw: &str, #[case] expected: TravelMode) {
        assert_eq!(resolve_travel_mode(raw), expected);
    }

    #[rstest]
    #[case("car, bus")]
    #[case("walking, bicycling")]
    #[case("train, personal car")]
    fn test_ambiguous_without_flight(#[case] raw: &str) {
        assert_eq!(resolve_travel_mode(raw), TravelMode::Unsupported);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(resolve_travel_mode(""), TravelMode::Unsupported);
        assert_eq!(resolve_travel_mode("   "), TravelMode::Unsupported);
        assert_eq!(resolve_travel_mode(",, ,"), TravelMode::Unsupported);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for raw in ["personal car", "Car", "rental car, bus", "plane, train"] {
            let first = resolve_travel_mode(raw);
            for _ in 0..3 {
                assert_eq!(resolve_travel_mode(raw), first);
            }
        }
    }

    #[test]
    fn test_case_and_whitespace_normalization() {
        assert_eq!(resolve_travel_mode("  PUBLIC TRANSPORT  "), TravelMode::Transit);
        assert_eq!(resolve_travel_mode(" Flight , car"), TravelMode::Flight);
    }

    #[test]
    fn test_ground_mode_predicate() {
        assert!(TravelMode::Driving.is_ground());
        assert!(TravelMode::Transit.is_ground());
        assert!(TravelMode::Walking.is_ground());
        assert!(TravelMode::Bicycling.is_ground());
        assert!(!TravelMode::Flight.is_ground());
        assert!(!TravelMode::Unsupported.is_ground());
    }
}
