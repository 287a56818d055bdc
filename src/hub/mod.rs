//! Hugging Face Hub access.
//!
//! The rest of the crate only sees the [`DatasetHub`] trait: a full listing
//! of dataset identifiers plus loading one split into a [`SplitTable`].
//! Remote concerns (reference parsing, paged listing, shard selection and
//! download) live in the submodules; parquet decoding stays in
//! `crate::table::parquet`.

pub mod acquire;
pub mod client;
pub mod listing;
pub mod memory;
pub mod resolve;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::DataScoutError;
use crate::table::SplitTable;

pub use client::HubClient;
pub use memory::MemoryHub;

/// Default Hugging Face Hub endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

/// Lazily produced dataset identifiers, in registry order.
pub type DatasetIds<'a> = Box<dyn Iterator<Item = Result<String, DataScoutError>> + 'a>;

/// The two registry capabilities every operation is built on.
pub trait DatasetHub {
    /// Iterate over every dataset identifier the registry knows about.
    fn dataset_ids(&self) -> DatasetIds<'_>;

    /// Load one split of a dataset fully into memory.
    fn load_split(&self, dataset: &str, split: Split) -> Result<SplitTable, DataScoutError>;
}

/// A named dataset partition.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    #[default]
    Train,
    Test,
    Validation,
}

impl Split {
    /// All selectable splits, in picker order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Test, Split::Validation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
            Split::Validation => "validation",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Split::ALL
            .into_iter()
            .find(|split| split.as_str() == value)
            .ok_or_else(|| format!("unknown split '{value}' (expected train, test, or validation)"))
    }
}

/// Canonical reference to a Hugging Face dataset repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetRef {
    pub repo_id: String,
    pub revision: Option<String>,
}

/// Connection settings for [`HubClient`].
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Base URL of the hub (no trailing slash required).
    pub endpoint: String,
    /// Global timeout for each listing request.
    pub timeout: Duration,
    /// Number of identifiers requested per listing page.
    pub page_size: usize,
    /// Override for the hf-hub download cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            page_size: 1000,
            cache_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_parses_only_known_names() {
        assert_eq!("validation".parse::<Split>(), Ok(Split::Validation));
        assert!("Train".parse::<Split>().is_err());
        assert!("dev".parse::<Split>().is_err());
    }

    #[test]
    fn split_display_matches_as_str() {
        for split in Split::ALL {
            assert_eq!(split.to_string(), split.as_str());
        }
    }
}
