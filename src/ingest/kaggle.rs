/// Kaggle dataset download client
///
/// Retrieves individual files of a public Kaggle dataset through the
/// Kaggle REST API and unpacks them next to where they were requested.
///
/// API Documentation: https://www.kaggle.com/docs/api
/// Credentials: `KAGGLE_USERNAME` / `KAGGLE_KEY`, or `kaggle.json` in
/// `$KAGGLE_CONFIG_DIR` (default `~/.kaggle`).

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::logging::{self, Stage};
use crate::model::PipelineError;

const KAGGLE_BASE_URL: &str = "https://www.kaggle.com/api/v1";

/// Local file header signature every zip archive starts with.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

// ============================================================================
// Credentials
// ============================================================================

/// API credentials, as stored in `kaggle.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KaggleCredentials {
    pub username: String,
    pub key: String,
}

impl KaggleCredentials {
    /// Environment variables first, then `kaggle.json`.
    pub fn discover() -> Result<Self, PipelineError> {
        if let (Ok(username), Ok(key)) = (
            std::env::var("KAGGLE_USERNAME"),
            std::env::var("KAGGLE_KEY"),
        ) {
            return Ok(Self { username, key });
        }

        let config_dir = match std::env::var("KAGGLE_CONFIG_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::var("HOME")
                .map(|home| Path::new(&home).join(".kaggle"))
                .map_err(|_| {
                    PipelineError::Credentials(
                        "set KAGGLE_USERNAME/KAGGLE_KEY or KAGGLE_CONFIG_DIR".to_string(),
                    )
                })?,
        };
        Self::from_file(&config_dir.join("kaggle.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(text)
            .map_err(|e| PipelineError::Credentials(format!("malformed kaggle.json: {}", e)))
    }
}

// ============================================================================
// Dataset files
// ============================================================================

/// What `load_files` did for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    AlreadyPresent,
    Unzipped,
    Downloaded,
}

/// A set of files from one Kaggle dataset, materialized in `target_dir`.
pub struct KaggleDataset {
    /// `owner/dataset-slug`, e.g. "tsiaras/uk-road-safety-accidents-and-vehicles".
    pub repo: String,
    pub files: Vec<String>,
    pub target_dir: PathBuf,
}

impl KaggleDataset {
    pub fn new(repo: &str, files: &[String], target_dir: &Path) -> Self {
        Self {
            repo: repo.to_string(),
            files: files.to_vec(),
            target_dir: target_dir.to_path_buf(),
        }
    }

    /// Makes every file available in `target_dir`: present files are kept,
    /// a lingering `<file>.zip` is unpacked, anything else is downloaded.
    /// Credentials are only looked up if a download is needed.
    pub fn load_files(&self) -> Result<Vec<FileOutcome>, PipelineError> {
        let mut client: Option<(reqwest::blocking::Client, KaggleCredentials)> = None;
        let mut outcomes = Vec::with_capacity(self.files.len());

        for file in self.files.iter().map(String::as_str) {
            let path = self.target_dir.join(file);
            let zip_path = self.zip_path(file);

            if path.exists() {
                logging::info(Stage::Extract, Some(file), &format!("{} exists already.", file));
                outcomes.push(FileOutcome::AlreadyPresent);
            } else if zip_path.exists() {
                logging::info(Stage::Extract, Some(file), &format!("{}.zip file found. Unzipping...", file));
                self.unzip_file(file)?;
                outcomes.push(FileOutcome::Unzipped);
            } else {
                logging::info(Stage::Extract, Some(file), &format!("Loading file : {}", file));
                if client.is_none() {
                    let http = reqwest::blocking::Client::builder()
                        .timeout(Duration::from_secs(600))
                        .build()?;
                    client = Some((http, KaggleCredentials::discover()?));
                }
                if let Some((http, credentials)) = &client {
                    self.download_file(http, credentials, file)?;
                }
                outcomes.push(FileOutcome::Downloaded);
            }
        }

        logging::info(Stage::Extract, Some(self.repo.as_str()), &outcome_summary(&outcomes));
        Ok(outcomes)
    }

    fn zip_path(&self, file: &str) -> PathBuf {
        self.target_dir.join(format!("{}.zip", file))
    }

    /// Downloads one dataset file. The API answers with either a zip
    /// archive or the raw file; archives are unpacked, raw files written
    /// in place.
    fn download_file(
        &self,
        client: &reqwest::blocking::Client,
        credentials: &KaggleCredentials,
        file: &str,
    ) -> Result<(), PipelineError> {
        let url = build_download_url(&self.repo, file);

        let response = client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.key))
            .send()?;

        if !response.status().is_success() {
            return Err(PipelineError::HttpError(response.status().as_u16()));
        }

        let body = response.bytes()?;
        if is_zip(&body) {
            fs::write(self.zip_path(file), &body)?;
            self.unzip_file(file)
        } else {
            fs::write(self.target_dir.join(file), &body)?;
            Ok(())
        }
    }

    /// Extracts `<file>.zip` into `target_dir`.
    pub fn unzip_file(&self, file: &str) -> Result<(), PipelineError> {
        logging::info(Stage::Extract, Some(file), &format!("Unzipping file : {}", file));
        let archive_file = File::open(self.zip_path(file))?;
        let mut archive = zip::ZipArchive::new(archive_file)?;
        archive.extract(&self.target_dir)?;
        Ok(())
    }
}

/// One-line tally of what `load_files` did, e.g.
/// "2 file(s): 1 already present, 0 unzipped, 1 downloaded".
pub fn outcome_summary(outcomes: &[FileOutcome]) -> String {
    let count = |kind: FileOutcome| outcomes.iter().filter(|o| **o == kind).count();
    format!(
        "{} file(s): {} already present, {} unzipped, {} downloaded",
        outcomes.len(),
        count(FileOutcome::AlreadyPresent),
        count(FileOutcome::Unzipped),
        count(FileOutcome::Downloaded)
    )
}

/// Download endpoint for a single file of a dataset.
pub fn build_download_url(repo: &str, file: &str) -> String {
    format!("{}/datasets/download/{}/{}", KAGGLE_BASE_URL, repo, file)
}

pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(dir: &Path, name: &str, inner: &str, contents: &str) {
        let file = File::create(dir.join(name)).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(inner, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_download_url_includes_repo_and_file() {
        let url = build_download_url("tsiaras/uk-road-safety-accidents-and-vehicles", "Accident_Information.csv");
        assert_eq!(
            url,
            "https://www.kaggle.com/api/v1/datasets/download/tsiaras/uk-road-safety-accidents-and-vehicles/Accident_Information.csv"
        );
    }

    #[test]
    fn test_zip_detection() {
        assert!(is_zip(&[0x50, 0x4b, 0x03, 0x04, 0x14]));
        assert!(!is_zip(b"Accident_Index,Year\n"));
        assert!(!is_zip(&[]));
    }

    #[test]
    fn test_credentials_from_json() {
        let creds = KaggleCredentials::from_json(r#"{"username":"analyst","key":"abc123"}"#)
            .expect("valid kaggle.json should parse");
        assert_eq!(creds.username, "analyst");
        assert_eq!(creds.key, "abc123");
    }

    #[test]
    fn test_malformed_credentials_are_rejected() {
        let err = KaggleCredentials::from_json(r#"{"username":"analyst"}"#).unwrap_err();
        assert!(err.to_string().starts_with("Credentials error"), "got '{}'", err);
    }

    #[test]
    fn test_existing_file_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();
        let dataset = KaggleDataset::new("owner/data", &["a.csv".to_string()], dir.path());
        let outcomes = dataset.load_files().expect("present file needs no network");
        assert_eq!(outcomes, vec![FileOutcome::AlreadyPresent]);
    }

    #[test]
    fn test_lingering_zip_is_unpacked() {
        let dir = tempfile::tempdir().unwrap();
        write_zip(dir.path(), "a.csv.zip", "a.csv", "x\n1\n");
        assert!(is_zip(&fs::read(dir.path().join("a.csv.zip")).unwrap()));

        let dataset = KaggleDataset::new("owner/data", &["a.csv".to_string()], dir.path());
        let outcomes = dataset.load_files().expect("zip should unpack without network");
        assert_eq!(outcomes, vec![FileOutcome::Unzipped]);
        assert_eq!(fs::read_to_string(dir.path().join("a.csv")).unwrap(), "x\n1\n");
    }

    #[test]
    fn test_outcome_summary_counts_each_kind() {
        let outcomes = [FileOutcome::AlreadyPresent, FileOutcome::Downloaded, FileOutcome::AlreadyPresent];
        assert_eq!(
            outcome_summary(&outcomes),
            "3 file(s): 2 already present, 0 unzipped, 1 downloaded"
        );
    }

    #[test]
    #[ignore] // Needs Kaggle credentials and network access
    fn kaggle_api_downloads_vehicle_file() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = KaggleDataset::new(
            crate::model::KAGGLE_DATASET,
            &[crate::model::VEHICLE_FILE.to_string()],
            dir.path(),
        );
        let outcomes = dataset.load_files().expect("download should succeed");
        assert_eq!(outcomes, vec![FileOutcome::Downloaded]);
        assert!(dir.path().join(crate::model::VEHICLE_FILE).exists());
    }
}
