//! Dataset search over the hub listing.

use tracing::debug;

use crate::error::DataScoutError;
use crate::hub::DatasetHub;

/// Hard cap on the number of identifiers a search returns.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Return the first [`MAX_SEARCH_RESULTS`] identifiers containing `query`.
///
/// Matching is a case-sensitive substring test and results keep the
/// registry's listing order, so an empty query yields the head of the
/// listing. The listing is consumed lazily and abandoned as soon as the
/// cap is reached.
pub fn search_datasets(hub: &dyn DatasetHub, query: &str) -> Result<Vec<String>, DataScoutError> {
    let mut matches = Vec::new();
    let mut scanned = 0usize;

    for id in hub.dataset_ids() {
        let id = id?;
        scanned += 1;
        if id.contains(query) {
            matches.push(id);
            if matches.len() == MAX_SEARCH_RESULTS {
                break;
            }
        }
    }

    debug!(query, scanned, matches = matches.len(), "dataset search finished");
    Ok(matches)
}
