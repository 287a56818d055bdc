use std::path::PathBuf;
use thiserror::Error;

/// The main error type for datascout operations.
#[derive(Debug, Error)]
pub enum DataScoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dataset reference '{input}': {message}")]
    InvalidDatasetRef { input: String, message: String },

    #[error("No dataset selected")]
    NoDatasetSelected,

    #[error("Invalid hub endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("Hub listing request to {url} failed: {message}")]
    HubListing { url: String, message: String },

    #[error("Hugging Face Hub API error for {repo_id}: {message}")]
    HubApi { repo_id: String, message: String },

    #[error("Split '{split}' not found for {repo_id} (available: {available})")]
    SplitNotFound {
        repo_id: String,
        split: String,
        available: String,
    },

    #[error("Failed to read parquet data from {path}: {message}")]
    ParquetRead { path: PathBuf, message: String },

    #[error("Failed to write CSV for column '{column}': {message}")]
    CsvWrite { column: String, message: String },

    #[error("Failed to serialize output: {0}")]
    JsonWrite(#[from] serde_json::Error),
}
