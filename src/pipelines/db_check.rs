//! Connectivity check against the configured database.

use std::path::PathBuf;

use clap::Args;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::db::Database;
use crate::logging::{self, Stage};
use crate::model::PipelineError;
use crate::pipelines::load;

#[derive(Debug, Clone, Args)]
pub struct DbCheckArgs {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub db_config_file: PathBuf,
}

/// Connects and returns the server version string.
pub fn run(args: &DbCheckArgs) -> Result<String, PipelineError> {
    let connection = load::connection_for(&args.db_config_file)?;
    logging::info(Stage::Database, None, "Connecting to the PostgreSQL database...");
    let mut db = Database::connect(&connection)?;
    let version = db.server_version()?;
    logging::info(Stage::Database, None, &format!("PostgreSQL database version: {}", version));
    Ok(version)
}
