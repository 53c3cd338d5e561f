//! Postgres access for the persisted accident sample.

use postgres::{Client, NoTls};

use crate::logging::{self, Stage};
use crate::model::{AccidentRow, PipelineError};

pub const CREATE_ACCIDENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS accidents (
        accident_index TEXT PRIMARY KEY,
        year INT,
        age_band_of_driver TEXT,
        age_of_vehicle INT,
        driver_home_area_type TEXT,
        journey_purpose_of_driver TEXT,
        accident_severity TEXT,
        accident_date DATE,
        day_of_week TEXT
    )";

pub struct Database {
    client: Client,
}

impl Database {
    pub fn connect(connection_string: &str) -> Result<Self, PipelineError> {
        let client = Client::connect(connection_string, NoTls)?;
        logging::debug(Stage::Database, None, "Connected to PostgreSQL");
        Ok(Self { client })
    }

    pub fn server_version(&mut self) -> Result<String, PipelineError> {
        let row = self.client.query_one("SELECT version()", &[])?;
        Ok(row.get(0))
    }

    /// Runs a statement with no parameters and returns the affected row count.
    pub fn execute_query(&mut self, query: &str) -> Result<u64, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::InvalidQuery("query is empty".to_string()));
        }
        Ok(self.client.execute(query, &[])?)
    }

    pub fn ensure_accidents_table(&mut self) -> Result<(), PipelineError> {
        self.execute_query(CREATE_ACCIDENTS_TABLE)?;
        Ok(())
    }

    pub fn count_rows(&mut self, table: &str) -> Result<i64, PipelineError> {
        validate_identifier(table)?;
        let row = self
            .client
            .query_one(&format!("SELECT COUNT(*) FROM {}", table), &[])?;
        Ok(row.get(0))
    }

    /// Replaces the contents of `table` with `rows` in one transaction.
    /// Rows whose `accident_index` repeats an earlier one are skipped.
    /// Returns the number of rows inserted.
    pub fn insert_rows(&mut self, table: &str, rows: &[AccidentRow]) -> Result<u64, PipelineError> {
        validate_identifier(table)?;
        if rows.is_empty() {
            logging::warn(Stage::Load, Some(table), "Dataframe is empty");
            return Ok(0);
        }

        let mut tx = self.client.transaction()?;
        tx.execute(&format!("DELETE FROM {}", table), &[])?;

        let statement = tx.prepare(&format!(
            "INSERT INTO {} (accident_index, year, age_band_of_driver, age_of_vehicle, \
             driver_home_area_type, journey_purpose_of_driver, accident_severity, \
             accident_date, day_of_week) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (accident_index) DO NOTHING",
            table
        ))?;

        let mut inserted = 0;
        for row in rows {
            inserted += tx.execute(
                &statement,
                &[
                    &row.accident_index,
                    &row.year,
                    &row.age_band_of_driver,
                    &row.age_of_vehicle,
                    &row.driver_home_area_type,
                    &row.journey_purpose_of_driver,
                    &row.accident_severity,
                    &row.accident_date,
                    &row.day_of_week,
                ],
            )?;
        }
        tx.commit()?;

        if inserted < rows.len() as u64 {
            logging::info(
                Stage::Load,
                Some(table),
                &format!("Skipped {} duplicate rows", rows.len() as u64 - inserted),
            );
        }
        Ok(inserted)
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_identifier(name: &str) -> Result<(), PipelineError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(PipelineError::InvalidQuery(format!("invalid table name '{}'", name)))
    }
}
