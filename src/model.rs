/// Core data types for the road-accident pipeline.
///
/// This module defines the shared domain model imported by all other modules:
/// the raw rows of the two source datasets, the merged accident-vehicle
/// record, the sample row persisted to Postgres, and the pipeline error type.
/// It contains no I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Dataset constants
// ---------------------------------------------------------------------------

/// Kaggle dataset holding both source files.
pub const KAGGLE_DATASET: &str = "tsiaras/uk-road-safety-accidents-and-vehicles";

/// One row per accident.
pub const ACCIDENT_FILE: &str = "Accident_Information.csv";

/// One row per vehicle involved in an accident. ISO-8859-1 encoded.
pub const VEHICLE_FILE: &str = "Vehicle_Information.csv";

/// Inner join of the two source files, written by the merge pipeline.
pub const MERGED_FILE: &str = "Accident_Vehicle_Information.csv";

/// Name of the table holding the persisted sample.
pub const ACCIDENTS_TABLE: &str = "accidents";

/// Number of rows persisted to the `accidents` table.
pub const SAMPLE_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// Source rows
// ---------------------------------------------------------------------------

/// A single row of `Accident_Information.csv`.
///
/// Only the columns used downstream are kept; the remaining ~25 columns of
/// the file are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccidentInfo {
    #[serde(rename = "Accident_Index")]
    pub accident_index: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Time")]
    pub time: Option<String>, // "HH:MM", empty when unknown
    #[serde(rename = "Day_of_Week")]
    pub day_of_week: String,
    #[serde(rename = "Accident_Severity")]
    pub accident_severity: String, // "Fatal" | "Serious" | "Slight"
    #[serde(rename = "Weather_Conditions")]
    pub weather_conditions: String,
}

/// A single row of `Vehicle_Information.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleInfo {
    #[serde(rename = "Accident_Index")]
    pub accident_index: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Age_Band_of_Driver")]
    pub age_band_of_driver: String,
    #[serde(rename = "Sex_of_Driver")]
    pub sex_of_driver: String,
    #[serde(rename = "Age_of_Vehicle", deserialize_with = "csv::invalid_option")]
    pub age_of_vehicle: Option<f64>,
    #[serde(rename = "Driver_Home_Area_Type")]
    pub driver_home_area_type: String,
    #[serde(rename = "Journey_Purpose_of_Driver")]
    pub journey_purpose_of_driver: String,
    #[serde(rename = "Vehicle_Manoeuvre")]
    pub vehicle_manoeuvre: String,
}

// ---------------------------------------------------------------------------
// Merged record
// ---------------------------------------------------------------------------

/// One accident-vehicle pairing: an `AccidentInfo` joined with one of its
/// `VehicleInfo` rows on (`Accident_Index`, `Year`).
///
/// Column names follow the source files, except `Date` which becomes
/// `Accident_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    #[serde(rename = "Accident_Index")]
    pub accident_index: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Accident_date")]
    pub accident_date: NaiveDate,
    #[serde(rename = "Time")]
    pub time: Option<String>,
    #[serde(rename = "Day_of_Week")]
    pub day_of_week: String,
    #[serde(rename = "Accident_Severity")]
    pub accident_severity: String,
    #[serde(rename = "Weather_Conditions")]
    pub weather_conditions: String,
    #[serde(rename = "Age_Band_of_Driver")]
    pub age_band_of_driver: String,
    #[serde(rename = "Sex_of_Driver")]
    pub sex_of_driver: String,
    #[serde(rename = "Age_of_Vehicle", deserialize_with = "csv::invalid_option")]
    pub age_of_vehicle: Option<f64>,
    #[serde(rename = "Driver_Home_Area_Type")]
    pub driver_home_area_type: String,
    #[serde(rename = "Journey_Purpose_of_Driver")]
    pub journey_purpose_of_driver: String,
    #[serde(rename = "Vehicle_Manoeuvre")]
    pub vehicle_manoeuvre: String,
}

impl AccidentRecord {
    pub fn from_parts(accident: &AccidentInfo, vehicle: &VehicleInfo) -> Self {
        Self {
            accident_index: accident.accident_index.clone(),
            year: accident.year,
            accident_date: accident.date,
            time: accident.time.clone(),
            day_of_week: accident.day_of_week.clone(),
            accident_severity: accident.accident_severity.clone(),
            weather_conditions: accident.weather_conditions.clone(),
            age_band_of_driver: vehicle.age_band_of_driver.clone(),
            sex_of_driver: vehicle.sex_of_driver.clone(),
            age_of_vehicle: vehicle.age_of_vehicle,
            driver_home_area_type: vehicle.driver_home_area_type.clone(),
            journey_purpose_of_driver: vehicle.journey_purpose_of_driver.clone(),
            vehicle_manoeuvre: vehicle.vehicle_manoeuvre.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted sample
// ---------------------------------------------------------------------------

/// A row of the `accidents` table.
///
/// Deserialized from CSV files whose headers have been lowercased, so both
/// the merged file and the output of the transform pipeline can be loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRow {
    pub accident_index: String,
    pub year: i32,
    pub age_band_of_driver: String,
    #[serde(default, deserialize_with = "deserialize_whole_years")]
    pub age_of_vehicle: Option<i32>,
    pub driver_home_area_type: String,
    pub journey_purpose_of_driver: String,
    pub accident_severity: String,
    pub accident_date: NaiveDate,
    pub day_of_week: String,
}

impl From<&AccidentRecord> for AccidentRow {
    fn from(record: &AccidentRecord) -> Self {
        Self {
            accident_index: record.accident_index.clone(),
            year: record.year,
            age_band_of_driver: record.age_band_of_driver.clone(),
            age_of_vehicle: record.age_of_vehicle.map(|age| age.trunc() as i32),
            driver_home_area_type: record.driver_home_area_type.clone(),
            journey_purpose_of_driver: record.journey_purpose_of_driver.clone(),
            accident_severity: record.accident_severity.clone(),
            accident_date: record.accident_date,
            day_of_week: record.day_of_week.clone(),
        }
    }
}

/// Columns of `AccidentRow` as they appear in the source files.
pub const SAMPLE_COLUMNS: [&str; 9] = [
    "Accident_Index",
    "Year",
    "Age_Band_of_Driver",
    "Age_of_Vehicle",
    "Driver_Home_Area_Type",
    "Journey_Purpose_of_Driver",
    "Accident_Severity",
    "Accident_date",
    "Day_of_Week",
];

/// Vehicle ages are written as floats ("3.0") by most exports; empty or
/// unparseable values become `None`.
fn deserialize_whole_years<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|age| age.is_finite())
        .map(|age| age.trunc() as i32))
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise in any stage of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Non-2xx HTTP response from the Kaggle API.
    #[error("HTTP error: {0}")]
    HttpError(u16),
    /// The request itself failed (DNS, TLS, timeout).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Database error: {0}")]
    Database(#[from] postgres::Error),
    /// Missing or malformed configuration file or section.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Kaggle credentials could not be found or parsed.
    #[error("Credentials error: {0}")]
    Credentials(String),
    #[error("{0} does not exist.")]
    MissingFile(String),
    /// Requested columns that are absent from a CSV header.
    #[error("Columns {0:?} are not in dataframe.")]
    MissingColumns(Vec<String>),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Chart error: {0}")]
    Chart(String),
}
