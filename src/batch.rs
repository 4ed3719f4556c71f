//! Sequential batch driver over tabular trip records
//!
//! Reads one trip record per CSV row, resolves each record strictly in order
//! through the processor, and writes exactly one output row per input row.
//! Two commands are supported: `resolve`, which derives one mode per record
//! from its travel-method text, and `survey`, which measures every mode.

use crate::Result;
use crate::models::{LookupOutcome, TripRequest};
use crate::processor::TripProcessor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// One input row. Region and country columns are optional; absent columns
/// deserialize as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    #[serde(rename = "Starting_City", default)]
    pub starting_city: String,
    #[serde(rename = "Starting_Region", default)]
    pub starting_region: Option<String>,
    #[serde(rename = "Destination", default)]
    pub destination: String,
    #[serde(rename = "Destination_Region", default)]
    pub destination_region: Option<String>,
    #[serde(rename = "Destination_Country", default)]
    pub destination_country: Option<String>,
    #[serde(rename = "Travel_Methods", default)]
    pub travel_methods: String,
}

impl TripRecord {
    /// The immutable request handed to the processor
    #[must_use]
    pub fn to_request(&self) -> TripRequest {
        TripRequest {
            origin_city: self.starting_city.clone(),
            origin_region: self.starting_region.clone(),
            destination_city: self.destination.clone(),
            destination_region: self.destination_region.clone(),
            destination_country: self.destination_country.clone(),
            raw_travel_methods: self.travel_methods.clone(),
        }
    }
}

/// Output row for the `resolve` command
#[derive(Debug, Serialize)]
struct ResolvedRow {
    #[serde(rename = "Starting_City")]
    starting_city: String,
    #[serde(rename = "Destination")]
    destination: String,
    #[serde(rename = "Mode")]
    mode: String,
    #[serde(rename = "Distance_km")]
    distance_km: Option<f64>,
    #[serde(rename = "Duration_hrs")]
    duration_hours: Option<f64>,
    #[serde(rename = "Outcome")]
    outcome: String,
    #[serde(rename = "Failure_Reason")]
    failure_reason: Option<String>,
}

/// Output row for the `survey` command, one column pair per ground mode plus
/// the flight distance
#[derive(Debug, Serialize)]
struct SurveyRow {
    #[serde(rename = "Starting_City")]
    starting_city: String,
    #[serde(rename = "Destination")]
    destination: String,
    #[serde(rename = "Car_Distance_km")]
    car_distance_km: Option<f64>,
    #[serde(rename = "Car_Duration_hrs")]
    car_duration_hours: Option<f64>,
    #[serde(rename = "Public_Transport_Distance_km")]
    public_transport_distance_km: Option<f64>,
    #[serde(rename = "Public_Transport_Duration_hrs")]
    public_transport_duration_hours: Option<f64>,
    #[serde(rename = "Walking_Distance_km")]
    walking_distance_km: Option<f64>,
    #[serde(rename = "Walking_Duration_hrs")]
    walking_duration_hours: Option<f64>,
    #[serde(rename = "Bicycle_Distance_km")]
    bicycle_distance_km: Option<f64>,
    #[serde(rename = "Bicycle_Duration_hrs")]
    bicycle_duration_hours: Option<f64>,
    #[serde(rename = "Flight_Distance_km")]
    flight_distance_km: Option<f64>,
}

/// Per-run accounting reported to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Read all trip records from a CSV file
pub fn read_records(input: &Path) -> Result<Vec<TripRecord>> {
    let mut reader = csv::Reader::from_path(input)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Resolve one mode per record and write one output row per input row.
pub async fn run_resolve(
    processor: &TripProcessor<'_>,
    input: &Path,
    output: &Path,
    pacing: Duration,
) -> Result<BatchSummary> {
    let records = read_records(input)?;
    let total = records.len();
    info!("Resolving {total} trip records from {}", input.display());

    let mut writer = csv::Writer::from_path(output)?;
    let mut summary = BatchSummary::default();

    for (index, record) in records.iter().enumerate() {
        let request = record.to_request();
        let result = processor.process(&request).await;

        summary.processed += 1;
        match result.outcome {
            LookupOutcome::Success => summary.succeeded += 1,
            LookupOutcome::Skipped => summary.skipped += 1,
            LookupOutcome::Failed => summary.failed += 1,
        }

        writer.serialize(ResolvedRow {
            starting_city: record.starting_city.clone(),
            destination: record.destination.clone(),
            mode: result.mode.to_string(),
            distance_km: result.distance_km,
            duration_hours: result.duration_hours,
            outcome: result.outcome.to_string(),
            failure_reason: result.failure_reason,
        })?;

        info!(
            "Processed row {}/{}: {} to {} ({})",
            index + 1,
            total,
            record.starting_city,
            record.destination,
            result.outcome
        );

        // Stay under the backend's request rate between records
        sleep(pacing).await;
    }

    writer.flush()?;
    info!("Results saved to {}", output.display());
    Ok(summary)
}

/// Measure every mode for every record and write one output row per input
/// row, matching the survey output schema column for column.
pub async fn run_survey(
    processor: &TripProcessor<'_>,
    input: &Path,
    output: &Path,
    pacing: Duration,
) -> Result<BatchSummary> {
    let records = read_records(input)?;
    let total = records.len();
    info!("Surveying {total} trip records from {}", input.display());

    let mut writer = csv::Writer::from_path(output)?;
    let mut summary = BatchSummary::default();

    for (index, record) in records.iter().enumerate() {
        let request = record.to_request();
        let survey = processor.survey(&request).await;

        summary.processed += 1;
        let any_value = survey.driving.is_some()
            || survey.transit.is_some()
            || survey.walking.is_some()
            || survey.bicycling.is_some()
            || survey.flight_distance_km.is_some();
        if any_value {
            summary.succeeded += 1;
        } else if request.has_destination() {
            summary.failed += 1;
        } else {
            summary.skipped += 1;
        }

        writer.serialize(SurveyRow {
            starting_city: record.starting_city.clone(),
            destination: record.destination.clone(),
            car_distance_km: survey.driving.map(|m| m.distance_km),
            car_duration_hours: survey.driving.map(|m| m.duration_hours),
            public_transport_distance_km: survey.transit.map(|m| m.distance_km),
            public_transport_duration_hours: survey.transit.map(|m| m.duration_hours),
            walking_distance_km: survey.walking.map(|m| m.distance_km),
            walking_duration_hours: survey.walking.map(|m| m.duration_hours),
            bicycle_distance_km: survey.bicycling.map(|m| m.distance_km),
            bicycle_duration_hours: survey.bicycling.map(|m| m.duration_hours),
            flight_distance_km: survey.flight_distance_km,
        })?;

        info!(
            "Processed row {}/{}: {} to {}",
            index + 1,
            total,
            record.starting_city,
            record.destination
        );

        sleep(pacing).await;
    }

    writer.flush()?;
    info!("Results saved to {}", output.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialization_with_all_columns() {
        let data = "\
Starting_City,Starting_Region,Destination,Destination_Region,Destination_Country,Travel_Methods
Boston,MA,Paris,,France,flight
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let records: Vec<TripRecord> =
            reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].starting_city, "Boston");
        assert_eq!(records[0].starting_region.as_deref(), Some("MA"));
        assert_eq!(records[0].destination, "Paris");
        assert_eq!(records[0].destination_country.as_deref(), Some("France"));
        assert_eq!(records[0].travel_methods, "flight");
    }

    #[test]
    fn test_record_deserialization_minimal_columns() {
        let data = "\
Starting_City,Destination,Travel_Methods
New York,Boston,car
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let records: Vec<TripRecord> =
            reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].starting_region.is_none());
        assert!(records[0].destination_country.is_none());
    }

    #[test]
    fn test_to_request_maps_all_fields() {
        let record = TripRecord {
            starting_city: "Boston".to_string(),
            starting_region: Some("MA".to_string()),
            destination: "Paris".to_string(),
            destination_region: None,
            destination_country: Some("France".to_string()),
            travel_methods: "flight".to_string(),
        };
        let request = record.to_request();
        assert_eq!(request.origin_city, "Boston");
        assert_eq!(request.origin_region.as_deref(), Some("MA"));
        assert_eq!(request.destination_city, "Paris");
        assert_eq!(request.destination_country.as_deref(), Some("France"));
        assert_eq!(request.raw_travel_methods, "flight");
    }

    #[test]
    fn test_absent_values_serialize_as_empty_fields() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(ResolvedRow {
                starting_city: "Boston".to_string(),
                destination: "Nowhere".to_string(),
                mode: "driving".to_string(),
                distance_km: None,
                duration_hours: None,
                outcome: "failed".to_string(),
                failure_reason: Some("no_route".to_string()),
            })
            .unwrap();
        let written = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(written.contains("Boston,Nowhere,driving,,,failed,no_route"));
    }
}
