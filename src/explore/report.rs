//! Explore report types, JSON shape and terminal formatting.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::hub::Split;
use crate::table::{cell_text, SplitTable};

/// Statistics label under which the total row count is reported.
pub const ROW_COUNT_LABEL: &str = "Anzahl Samples";

/// Widest a preview cell may get in the text report.
const PREVIEW_CELL_WIDTH: usize = 32;

/// Width of the section rules in the text report.
const RULE_WIDTH: usize = 61;

/// The result of exploring one split.
#[derive(Clone, Debug, Serialize)]
pub struct ExploreReport {
    pub dataset: String,
    pub split: Split,
    /// Column name to feature description, in native column order.
    pub schema: SchemaMap,
    /// The first rows of the split.
    pub examples: PreviewTable,
    /// Row count plus the per-column feature descriptions.
    pub stats: StatsMap,
}

/// Ordered column name → feature description mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaMap {
    entries: Vec<(String, String)>,
}

impl SchemaMap {
    pub fn from_table(table: &SplitTable) -> Self {
        Self {
            entries: table
                .schema()
                .map(|(column, feature)| (column.to_string(), feature.to_string()))
                .collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(column, _)| column.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, feature)| feature.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(column, feature)| (column.as_str(), feature.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SchemaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, feature) in &self.entries {
            map.serialize_entry(column, feature)?;
        }
        map.end()
    }
}

/// Row count merged with the schema entries.
///
/// Entries behave like a dictionary that starts with the row count and is
/// then updated with the schema: a column that happens to be named
/// [`ROW_COUNT_LABEL`] overwrites the count in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsMap {
    num_rows: usize,
    columns: SchemaMap,
}

impl StatsMap {
    pub fn new(num_rows: usize, columns: SchemaMap) -> Self {
        Self { num_rows, columns }
    }

    /// Total number of rows in the split.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        let mut entries = vec![(ROW_COUNT_LABEL.to_string(), Value::from(self.num_rows))];
        for (column, feature) in self.columns.iter() {
            let value = Value::String(feature.to_string());
            if column == ROW_COUNT_LABEL {
                entries[0].1 = value;
            } else {
                entries.push((column.to_string(), value));
            }
        }
        entries
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries()
            .into_iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

impl Serialize for StatsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in &entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Row-limited preview; serializes as a list of column → value objects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl PreviewTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for PreviewTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a>(&'a [String], &'a [Value]);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (column, value) in self.0.iter().zip(self.1) {
                    map.serialize_entry(column, value)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Row(&self.columns, row))?;
        }
        seq.end()
    }
}

impl fmt::Display for ExploreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("📊  {} ({})", self.dataset, self.split);
        writeln!(f)?;
        writeln!(f, "╭{}╮", "─".repeat(RULE_WIDTH - 2))?;
        writeln!(f, "│  {}", title)?;
        writeln!(f, "╰{}╯", "─".repeat(RULE_WIDTH - 2))?;
        writeln!(f)?;

        self.fmt_schema(f)?;
        writeln!(f)?;
        self.fmt_examples(f)?;
        writeln!(f)?;
        self.fmt_stats(f)?;

        Ok(())
    }
}

impl ExploreReport {
    fn fmt_schema(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section_rule(f, &format!("Schema ({} columns)", self.schema.len()))?;
        let width = self.schema.keys().map(display_width).max().unwrap_or(0);
        for (column, feature) in self.schema.iter() {
            writeln!(f, "│   {}  {}", pad(column, width), feature)?;
        }
        section_end(f)
    }

    fn fmt_examples(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section_rule(f, &format!("Examples ({})", self.examples.len()))?;
        if self.examples.is_empty() {
            writeln!(f, "│   No rows.")?;
            return section_end(f);
        }

        let cells: Vec<Vec<String>> = self
            .examples
            .rows
            .iter()
            .map(|row| row.iter().map(preview_cell).collect())
            .collect();
        let widths: Vec<usize> = self
            .examples
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                cells
                    .iter()
                    .map(|row| display_width(&row[idx]))
                    .chain(std::iter::once(display_width(column)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .examples
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| pad(column, *width))
            .collect();
        writeln!(f, "│   {}", header.join(" │ "))?;
        let underline: Vec<String> = widths.iter().map(|width| "─".repeat(*width)).collect();
        writeln!(f, "│   {}", underline.join("─┼─"))?;
        for row in &cells {
            let padded: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| pad(cell, *width))
                .collect();
            writeln!(f, "│   {}", padded.join(" │ "))?;
        }
        section_end(f)
    }

    fn fmt_stats(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section_rule(f, "Statistics")?;
        let entries = self.stats.entries();
        let width = entries
            .iter()
            .map(|(key, _)| display_width(key))
            .max()
            .unwrap_or(0);
        for (key, value) in &entries {
            let rendered = match value {
                Value::Number(_) => format_number(self.stats.num_rows()),
                other => cell_text(other),
            };
            writeln!(f, "│   {}  {}", pad(key, width), rendered)?;
        }
        section_end(f)
    }
}

fn section_rule(f: &mut fmt::Formatter<'_>, header: &str) -> fmt::Result {
    let fill = RULE_WIDTH.saturating_sub(display_width(header) + 5);
    writeln!(f, "┌─ {} {}┐", header, "─".repeat(fill))
}

fn section_end(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "└{}┘", "─".repeat(RULE_WIDTH - 2))
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(display_width(text))))
}

/// Single-line, width-limited rendering of one preview cell.
fn preview_cell(value: &Value) -> String {
    let flat: String = cell_text(value)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if display_width(&flat) <= PREVIEW_CELL_WIDTH {
        flat
    } else {
        let kept: String = flat.chars().take(PREVIEW_CELL_WIDTH - 1).collect();
        format!("{kept}…")
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
