//! Downloads the source datasets into a folder.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::ingest::kaggle::{FileOutcome, KaggleDataset};
use crate::logging::{self, Stage};
use crate::model::{ACCIDENT_FILE, KAGGLE_DATASET, PipelineError, VEHICLE_FILE};

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Kaggle dataset, as owner/slug
    #[arg(long, default_value = KAGGLE_DATASET)]
    pub repo: String,
    /// Files of the dataset to fetch
    #[arg(long, num_args = 1.., default_values = [ACCIDENT_FILE, VEHICLE_FILE])]
    pub files_list: Vec<String>,
    /// Folder the files end up in (created if missing)
    #[arg(long, default_value = "data")]
    pub output_folder: PathBuf,
}

pub fn run(args: &ExtractArgs) -> Result<Vec<FileOutcome>, PipelineError> {
    fs::create_dir_all(&args.output_folder)?;
    logging::info(
        Stage::Extract,
        None,
        &format!("Fetching {} file(s) of {} into {}", args.files_list.len(), args.repo, args.output_folder.display()),
    );
    KaggleDataset::new(&args.repo, &args.files_list, &args.output_folder).load_files()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("data");
        assert!(!output.exists());

        let args = ExtractArgs {
            repo: "owner/data".to_string(),
            files_list: Vec::new(),
            output_folder: output.clone(),
        };
        let outcomes = run(&args).expect("nothing to download");
        assert!(outcomes.is_empty());
        assert!(output.is_dir(), "run should create the nested folder");
    }

    #[test]
    fn test_keeps_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("data");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("a.csv"), "x\n").unwrap();

        let args = ExtractArgs {
            repo: "owner/data".to_string(),
            files_list: vec!["a.csv".to_string()],
            output_folder: output.clone(),
        };
        let outcomes = run(&args).expect("present files need no download");
        assert_eq!(outcomes, vec![FileOutcome::AlreadyPresent]);
        assert_eq!(fs::read_to_string(output.join("a.csv")).unwrap(), "x\n");
    }
}
