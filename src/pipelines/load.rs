//! Persists the first rows of a CSV into the `accidents` table.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use csv::StringRecord;

use crate::config::{self, DEFAULT_CONFIG_FILE};
use crate::db::Database;
use crate::logging::{self, Stage};
use crate::model::{ACCIDENTS_TABLE, AccidentRow, MERGED_FILE, PipelineError, SAMPLE_SIZE};

#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    #[arg(long, default_value = "data")]
    pub input_folder: PathBuf,
    /// CSV holding the rows to persist
    #[arg(long, default_value = MERGED_FILE)]
    pub filename: String,
    /// TOML file with a [postgresql] section
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub db_config_file: PathBuf,
    /// Field separator of the input file
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

/// First `limit` rows of a CSV, matching headers case-insensitively so both
/// the merged file and the transformed one can be read.
pub fn read_sample<R: Read>(reader: R, delimiter: u8, limit: usize) -> Result<Vec<AccidentRow>, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new().delimiter(delimiter).from_reader(reader);
    let lowered: StringRecord = rdr.headers()?.iter().map(str::to_lowercase).collect();
    rdr.set_headers(lowered);

    let mut rows = Vec::with_capacity(limit);
    for result in rdr.deserialize().take(limit) {
        rows.push(result?);
    }
    Ok(rows)
}

/// Creates the table if needed and replaces its contents with `rows`.
/// Returns the table's row count afterwards.
pub fn load_rows(connection_string: &str, rows: &[AccidentRow]) -> Result<i64, PipelineError> {
    let mut db = Database::connect(connection_string)?;
    db.ensure_accidents_table()?;
    logging::info(Stage::Load, Some(ACCIDENTS_TABLE), "Insert data into database");
    let inserted = db.insert_rows(ACCIDENTS_TABLE, rows)?;
    let count = db.count_rows(ACCIDENTS_TABLE)?;
    logging::log_stage_summary(Stage::Load, "Sample rows", rows.len(), inserted as usize);
    logging::info(Stage::Load, Some(ACCIDENTS_TABLE), &format!("The number of rows: {}", count));
    Ok(count)
}

fn delimiter_byte(delimiter: char) -> Result<u8, PipelineError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| PipelineError::Config(format!("delimiter '{}' is not a single ASCII character", delimiter)))
}

/// Connection string for `db_config_file`, unless `DATABASE_URL` wins.
pub fn connection_for(db_config_file: &Path) -> Result<String, PipelineError> {
    if let Some(url) = config::database_url_from_env() {
        return Ok(url);
    }
    if !db_config_file.exists() {
        return Err(PipelineError::MissingFile(db_config_file.display().to_string()));
    }
    config::resolve_connection_string(Some(db_config_file))
}

pub fn run(args: &LoadArgs) -> Result<i64, PipelineError> {
    let input = args.input_folder.join(&args.filename);
    if !input.exists() {
        return Err(PipelineError::MissingFile(args.filename.clone()));
    }
    let connection = connection_for(&args.db_config_file)?;
    let rows = read_sample(File::open(&input)?, delimiter_byte(args.delimiter)?, SAMPLE_SIZE)?;
    load_rows(&connection, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MERGED: &str = "\
Accident_Index,Year,Accident_date,Time,Day_of_Week,Accident_Severity,Weather_Conditions,Age_Band_of_Driver,Sex_of_Driver,Age_of_Vehicle,Driver_Home_Area_Type,Journey_Purpose_of_Driver,Vehicle_Manoeuvre
A1,2005,2005-01-04,17:42,Tuesday,Serious,Fine no high winds,26 - 35,Male,3.0,Urban area,Other,Going ahead other
A2,2005,2005-01-05,08:00,Wednesday,Slight,Fine no high winds,36 - 45,Female,,Rural,Other,Turning right
A3,2005,2005-01-06,09:00,Thursday,Slight,Fine no high winds,36 - 45,Female,11.0,Rural,Other,Turning right
";

    #[test]
    fn test_sample_reads_merged_headers_case_insensitively() {
        let rows = read_sample(MERGED.as_bytes(), b',', 2).expect("merged file should load");
        assert_eq!(rows.len(), 2, "sample is capped at the limit");
        assert_eq!(rows[0].accident_index, "A1");
        assert_eq!(rows[0].age_of_vehicle, Some(3));
        assert_eq!(rows[1].age_of_vehicle, None);
    }

    #[test]
    fn test_sample_of_short_file_returns_everything() {
        let rows = read_sample(MERGED.as_bytes(), b',', SAMPLE_SIZE).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_delimiter_must_be_ascii() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert!(delimiter_byte('é').is_err());
    }

    #[test]
    fn test_missing_input_is_reported_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let args = LoadArgs {
            input_folder: dir.path().to_path_buf(),
            filename: "absent.csv".to_string(),
            db_config_file: dir.path().join("database.toml"),
            delimiter: ',',
        };
        assert_eq!(run(&args).unwrap_err().to_string(), "absent.csv does not exist.");
    }
}
