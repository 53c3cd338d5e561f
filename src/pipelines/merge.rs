//! Joins the accident and vehicle files into one CSV.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::ingest::datasets;
use crate::logging::{self, Stage};
use crate::model::{ACCIDENT_FILE, AccidentRecord, MERGED_FILE, PipelineError, VEHICLE_FILE};

#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
    /// Folder holding Accident_Information.csv and Vehicle_Information.csv
    #[arg(long, default_value = "data")]
    pub input_folder: PathBuf,
    /// Folder for Accident_Vehicle_Information.csv
    #[arg(long, default_value = "data")]
    pub output_folder: PathBuf,
}

/// Reads both source files from `input_folder` and joins them.
pub fn merge_folder(input_folder: &Path) -> Result<Vec<AccidentRecord>, PipelineError> {
    let accidents = datasets::read_accidents(&input_folder.join(ACCIDENT_FILE))?;
    let vehicles = datasets::read_vehicles(&input_folder.join(VEHICLE_FILE))?;
    let merged = datasets::merge(&accidents, &vehicles);
    logging::info(
        Stage::Merge,
        None,
        &format!(
            "{} accidents x {} vehicles -> {} merged rows",
            accidents.len(),
            vehicles.len(),
            merged.len()
        ),
    );
    Ok(merged)
}

pub fn run(args: &MergeArgs) -> Result<PathBuf, PipelineError> {
    let merged = merge_folder(&args.input_folder)?;
    fs::create_dir_all(&args.output_folder)?;
    let path = args.output_folder.join(MERGED_FILE);
    datasets::write_records(&path, &merged)?;
    logging::info(Stage::Merge, Some(MERGED_FILE), &format!("Wrote {}", path.display()));
    Ok(path)
}
