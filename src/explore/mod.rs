//! Dataset exploration: schema, example rows and statistics of one split.

mod report;

pub use report::{ExploreReport, PreviewTable, SchemaMap, StatsMap, ROW_COUNT_LABEL};

use crate::error::DataScoutError;
use crate::hub::{DatasetHub, Split};
use crate::table::SplitTable;

/// Load `split` of `dataset` and summarize it.
///
/// The preview holds `min(num_examples, total rows)` rows. Any load
/// failure fails the whole call; there is no partial report.
pub fn explore_dataset(
    hub: &dyn DatasetHub,
    dataset: &str,
    split: Split,
    num_examples: usize,
) -> Result<ExploreReport, DataScoutError> {
    let table = hub.load_split(dataset, split)?;
    Ok(summarize_split(dataset, split, &table, num_examples))
}

/// Build the report for an already loaded split.
pub fn summarize_split(
    dataset: &str,
    split: Split,
    table: &SplitTable,
    num_examples: usize,
) -> ExploreReport {
    let schema = SchemaMap::from_table(table);
    let examples = PreviewTable {
        columns: table.column_names().to_vec(),
        rows: table.head(num_examples).to_vec(),
    };
    let stats = StatsMap::new(table.num_rows(), schema.clone());

    ExploreReport {
        dataset: dataset.to_string(),
        split,
        schema,
        examples,
        stats,
    }
}
