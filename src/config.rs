//! Database connection settings.
//!
//! Settings live in a TOML file (default `conf/database.toml`):
//!
//! ```toml
//! [postgresql]
//! host = "localhost"
//! port = 5432
//! user = "postgres"
//! password = "postgres"
//! database = "accidents"
//! ```
//!
//! `DATABASE_URL` (read from the environment or `.env`) takes precedence
//! over the file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::model::PipelineError;

pub const DEFAULT_CONFIG_FILE: &str = "conf/database.toml";
pub const DEFAULT_SECTION: &str = "postgresql";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
}

fn default_port() -> u16 {
    5432
}

impl DatabaseSettings {
    /// Key/value connection string understood by `postgres::Client::connect`.
    /// Every value is single-quoted so spaces and quotes survive parsing.
    pub fn connection_string(&self) -> String {
        let mut params = format!(
            "host={} port={} user={} dbname={}",
            quote_value(&self.host),
            self.port,
            quote_value(&self.user),
            quote_value(&self.database)
        );
        if !self.password.is_empty() {
            params.push_str(&format!(" password={}", quote_value(&self.password)));
        }
        params
    }
}

/// Quotes a libpq connection parameter, escaping `\` and `'`.
fn quote_value(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Reads one section of a TOML settings file.
pub fn load_database_settings(path: &Path, section: &str) -> Result<DatabaseSettings, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| {
        PipelineError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_database_settings(&text, section, &path.display().to_string())
}

/// Parses settings text; `origin` names the file in error messages.
pub fn parse_database_settings(
    text: &str,
    section: &str,
    origin: &str,
) -> Result<DatabaseSettings, PipelineError> {
    let mut sections: HashMap<String, toml::Value> = toml::from_str(text)
        .map_err(|e| PipelineError::Config(format!("malformed {}: {}", origin, e)))?;

    let table = sections.remove(section).ok_or_else(|| {
        PipelineError::Config(format!("Section {} not found in the {} file", section, origin))
    })?;

    table
        .try_into()
        .map_err(|e| PipelineError::Config(format!("invalid [{}] in {}: {}", section, origin, e)))
}

/// `DATABASE_URL` from the environment or `.env`, if set and non-empty.
pub fn database_url_from_env() -> Option<String> {
    dotenv::dotenv().ok();
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Picks the connection string: `DATABASE_URL` if set, otherwise the
/// `[postgresql]` section of `config_file` (or the default file).
pub fn resolve_connection_string(config_file: Option<&Path>) -> Result<String, PipelineError> {
    if let Some(url) = database_url_from_env() {
        return Ok(url);
    }
    let path = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    Ok(load_database_settings(path, DEFAULT_SECTION)?.connection_string())
}
