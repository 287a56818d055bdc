//! In-memory [`DatasetHub`] for tests, benches and embedding.

use std::cell::Cell;
use std::collections::HashMap;

use crate::error::DataScoutError;
use crate::table::SplitTable;

use super::{DatasetHub, DatasetIds, Split};

/// A registry whose listing and splits are fixed at construction time.
///
/// Every `load_split` call is counted, which lets callers assert how often
/// the presentation layer went back to the registry.
#[derive(Clone, Debug, Default)]
pub struct MemoryHub {
    ids: Vec<String>,
    splits: HashMap<(String, Split), SplitTable>,
    loads: Cell<usize>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing made of exactly these identifiers, in this order.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Register a split; the dataset is appended to the listing if new.
    pub fn with_split(mut self, dataset: &str, split: Split, table: SplitTable) -> Self {
        if !self.ids.iter().any(|id| id == dataset) {
            self.ids.push(dataset.to_string());
        }
        self.splits.insert((dataset.to_string(), split), table);
        self
    }

    /// Number of `load_split` calls made so far.
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }
}

impl DatasetHub for MemoryHub {
    fn dataset_ids(&self) -> DatasetIds<'_> {
        Box::new(self.ids.iter().cloned().map(Ok))
    }

    fn load_split(&self, dataset: &str, split: Split) -> Result<SplitTable, DataScoutError> {
        self.loads.set(self.loads.get() + 1);

        if let Some(table) = self.splits.get(&(dataset.to_string(), split)) {
            return Ok(table.clone());
        }

        let mut available: Vec<&str> = self
            .splits
            .keys()
            .filter(|(name, _)| name == dataset)
            .map(|(_, split)| split.as_str())
            .collect();
        if available.is_empty() {
            return Err(DataScoutError::HubApi {
                repo_id: dataset.to_string(),
                message: "dataset not found".to_string(),
            });
        }
        available.sort_unstable();

        Err(DataScoutError::SplitNotFound {
            repo_id: dataset.to_string(),
            split: split.to_string(),
            available: available.join(", "),
        })
    }
}
