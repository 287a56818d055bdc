//! In-memory representation of one loaded dataset split.
//!
//! Cells are kept as JSON values exactly as decoded from storage; the
//! only conversion happens when a cell is rendered as text.

pub mod features;
pub mod parquet;

use serde_json::Value;

/// A fully loaded split: column names, their feature descriptions, and
/// every row in storage order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitTable {
    columns: Vec<String>,
    features: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl SplitTable {
    /// Build a table. `features` and every row are aligned with `columns`.
    ///
    /// # Panics
    ///
    /// Panics if `features` or any row has a different length than
    /// `columns`.
    pub fn new(columns: Vec<String>, features: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        assert_eq!(
            columns.len(),
            features.len(),
            "one feature description per column"
        );
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            panic!(
                "row {index} has {} cells, expected {}",
                row.len(),
                columns.len()
            );
        }
        Self {
            columns,
            features,
            rows,
        }
    }

    /// Column names in native order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// `(column, feature description)` pairs in native order.
    pub fn schema(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(&self.features)
            .map(|(column, feature)| (column.as_str(), feature.as_str()))
    }

    /// The first `n` rows, or all of them when the split is shorter.
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Every value of one column in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Render one cell as display/CSV text.
///
/// Strings are written raw, missing values as an empty string, booleans
/// as `True`/`False`, and nested values in Python literal notation so
/// exports match what the hub's Python tooling writes.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => features::python_repr(other),
    }
}
