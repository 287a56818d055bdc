//! Single-column CSV export.

use serde::Serialize;
use serde_json::Value;

use crate::error::DataScoutError;
use crate::hub::{DatasetHub, Split};
use crate::table::{cell_text, SplitTable};

/// Status reported when the requested column does not exist.
pub const COLUMN_NOT_FOUND: &str = "Spalte nicht gefunden.";

/// Status text plus the exported CSV.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportResult {
    pub status: String,
    pub csv: String,
}

impl ExportResult {
    pub fn column_not_found() -> Self {
        Self {
            status: COLUMN_NOT_FOUND.to_string(),
            csv: String::new(),
        }
    }

    /// Whether the export produced CSV for an existing column.
    pub fn is_found(&self) -> bool {
        self.status != COLUMN_NOT_FOUND
    }
}

/// Load `split` of `dataset` and export `column` as CSV.
///
/// An unknown column is reported through the status, not as an error;
/// only load failures are errors.
pub fn export_column(
    hub: &dyn DatasetHub,
    dataset: &str,
    split: Split,
    column: &str,
) -> Result<ExportResult, DataScoutError> {
    let table = hub.load_split(dataset, split)?;
    export_from_table(&table, column)
}

/// Export `column` of an already loaded split.
pub fn export_from_table(table: &SplitTable, column: &str) -> Result<ExportResult, DataScoutError> {
    let Some(values) = table.column(column) else {
        return Ok(ExportResult::column_not_found());
    };

    Ok(ExportResult {
        status: format!("CSV für Spalte '{column}' erzeugt."),
        csv: column_to_csv(column, values)?,
    })
}

/// Write one header line (the column name) and one line per value.
///
/// No index column is written and lines end in `\n`.
pub fn column_to_csv<'a, I>(column: &str, values: I) -> Result<String, DataScoutError>
where
    I: IntoIterator<Item = &'a Value>,
{
    let csv_error = |message: String| DataScoutError::CsvWrite {
        column: column.to_string(),
        message,
    };

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    csv_writer
        .write_record([column])
        .map_err(|source| csv_error(source.to_string()))?;
    for value in values {
        csv_writer
            .write_record([cell_text(value)])
            .map_err(|source| csv_error(source.to_string()))?;
    }

    let bytes = csv_writer
        .into_inner()
        .map_err(|e| DataScoutError::Io(e.into_error()))?;

    String::from_utf8(bytes).map_err(|e| csv_error(format!("Invalid UTF-8 in output: {}", e)))
}
