//! Projects a CSV onto a set of columns and writes it `;`-separated with
//! lowercase headers.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use csv::StringRecord;

use crate::logging::{self, Stage};
use crate::model::{MERGED_FILE, PipelineError, SAMPLE_COLUMNS};

pub const TRANSFORMED_FILE: &str = "transformed_data.csv";

#[derive(Debug, Clone, Args)]
pub struct TransformArgs {
    #[arg(long, default_value = "data")]
    pub input_folder: PathBuf,
    /// File to transform
    #[arg(long, default_value = MERGED_FILE)]
    pub filename: String,
    #[arg(long, default_value = "data")]
    pub output_folder: PathBuf,
    /// Columns to keep, in output order
    #[arg(long, num_args = 1.., default_values = SAMPLE_COLUMNS)]
    pub columns: Vec<String>,
}

/// Positions of `columns` in `headers`, or every missing column name.
pub fn column_positions(headers: &StringRecord, columns: &[String]) -> Result<Vec<usize>, PipelineError> {
    let mut positions = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for column in columns {
        match headers.iter().position(|h| h == column) {
            Some(p) => positions.push(p),
            None => missing.push(column.clone()),
        }
    }
    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(PipelineError::MissingColumns(missing))
    }
}

/// Streams `input` to `output`, keeping `columns`. Returns the row count.
pub fn transform_file(input: &Path, output: &Path, columns: &[String]) -> Result<usize, PipelineError> {
    let mut rdr = csv::Reader::from_path(input)?;
    let positions = column_positions(rdr.headers()?, columns)?;

    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_path(output)?;
    wtr.write_record(columns.iter().map(|c| c.to_lowercase()))?;

    let mut rows = 0;
    for result in rdr.records() {
        let record = result?;
        wtr.write_record(positions.iter().map(|p| record.get(*p).unwrap_or("")))?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

pub fn run(args: &TransformArgs) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(&args.output_folder)?;
    let input = args.input_folder.join(&args.filename);
    if !input.exists() {
        return Err(PipelineError::MissingFile(args.filename.clone()));
    }
    let output = args.output_folder.join(TRANSFORMED_FILE);
    let rows = transform_file(&input, &output, &args.columns)?;
    logging::info(
        Stage::Transform,
        Some(TRANSFORMED_FILE),
        &format!("Wrote {} rows x {} columns to {}", rows, args.columns.len(), output.display()),
    );
    Ok(output)
}
