//! The whole chain: extract, merge, load a sample, visualize.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::analysis::accidents;
use crate::charts::Chart;
use crate::config::DEFAULT_CONFIG_FILE;
use crate::ingest::datasets;
use crate::logging::{self, Stage};
use crate::model::{ACCIDENT_FILE, AccidentRow, KAGGLE_DATASET, MERGED_FILE, PipelineError, SAMPLE_SIZE, VEHICLE_FILE};
use crate::pipelines::{extract, load, merge, visualize};

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[arg(long, default_value = KAGGLE_DATASET)]
    pub repo: String,
    /// Where the datasets are downloaded and merged
    #[arg(long, default_value = "data")]
    pub data_folder: PathBuf,
    /// Where the charts are written
    #[arg(long, default_value = "plots")]
    pub output_folder: PathBuf,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub db_config_file: PathBuf,
    /// Do not touch the database
    #[arg(long)]
    pub skip_load: bool,
}

/// Summary of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub merged_rows: usize,
    pub loaded_rows: Option<i64>,
    pub charts: usize,
}

pub fn run(args: &RunArgs) -> Result<RunReport, PipelineError> {
    extract::run(&extract::ExtractArgs {
        repo: args.repo.clone(),
        files_list: vec![ACCIDENT_FILE.to_string(), VEHICLE_FILE.to_string()],
        output_folder: args.data_folder.clone(),
    })?;

    let records = merge::merge_folder(&args.data_folder)?;
    datasets::write_records(&args.data_folder.join(MERGED_FILE), &records)?;
    let merged_rows = records.len();

    let loaded_rows = if args.skip_load {
        logging::info(Stage::Load, None, "Skipping database load");
        None
    } else {
        let sample: Vec<AccidentRow> = records.iter().take(SAMPLE_SIZE).map(AccidentRow::from).collect();
        let connection = load::connection_for(&args.db_config_file)?;
        Some(load::load_rows(&connection, &sample)?)
    };

    fs::create_dir_all(&args.output_folder)?;
    let data = accidents::transform(records);
    let mut chart = Chart::new(&args.output_folder);
    let charts = visualize::visualize(&data, &mut chart)?;

    Ok(RunReport { merged_rows, loaded_rows, charts })
}
