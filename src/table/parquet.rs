//! Parquet shard reader.
//!
//! Every shard of a split is decoded row by row and appended in the order
//! given. Column names and feature descriptions come from the first shard;
//! later shards must carry the same columns.

use std::fs;
use std::path::{Path, PathBuf};

use parquet::arrow::parquet_to_arrow_schema;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::DataScoutError;

use super::features::{
    describe_arrow_type, describe_feature, hub_features_from_metadata, HF_METADATA_KEY,
};
use super::SplitTable;

/// Read a split from its parquet shards.
pub fn read_parquet_shards(paths: &[PathBuf]) -> Result<SplitTable, DataScoutError> {
    let mut layout: Option<(Vec<String>, Vec<String>)> = None;
    let mut rows: Vec<Vec<Value>> = Vec::new();

    for path in paths {
        let file = fs::File::open(path).map_err(DataScoutError::Io)?;
        let reader =
            SerializedFileReader::new(file).map_err(|source| DataScoutError::ParquetRead {
                path: path.clone(),
                message: source.to_string(),
            })?;

        let (columns, features) = describe_columns(path, &reader)?;
        match layout.as_ref() {
            None => layout = Some((columns, features)),
            Some((expected, _)) if *expected != columns => {
                return Err(DataScoutError::ParquetRead {
                    path: path.clone(),
                    message: format!(
                        "shard columns [{}] differ from [{}]",
                        columns.join(", "),
                        expected.join(", ")
                    ),
                });
            }
            Some(_) => {}
        }

        let row_iter = reader
            .get_row_iter(None)
            .map_err(|source| DataScoutError::ParquetRead {
                path: path.clone(),
                message: source.to_string(),
            })?;

        let before = rows.len();
        for (idx, row_res) in row_iter.enumerate() {
            let row = row_res.map_err(|source| DataScoutError::ParquetRead {
                path: path.clone(),
                message: format!("row {}: {}", idx + 1, source),
            })?;
            rows.push(
                row.get_column_iter()
                    .map(|(_, field)| field_value(field))
                    .collect(),
            );
        }
        debug!(path = %path.display(), rows = rows.len() - before, "decoded shard");
    }

    let (columns, features) = layout.unwrap_or_default();
    Ok(SplitTable::new(columns, features, rows))
}

/// Decode one parquet field into a cell value.
///
/// Single and half precision floats keep the shortest decimal text that
/// reads back as the stored value, so `0.1f32` stays `0.1` instead of the
/// widened `0.10000000149011612`. Nested fields are walked so floats inside
/// lists, structs and maps get the same treatment.
fn field_value(field: &Field) -> Value {
    match field {
        Field::Float(value) => shortest_number(&value.to_string()),
        Field::Float16(value) => half_float_value(value.to_f32()),
        Field::Group(row) => Value::Object(
            row.get_column_iter()
                .map(|(name, field)| (name.clone(), field_value(field)))
                .collect::<Map<_, _>>(),
        ),
        Field::ListInternal(list) => Value::Array(list.elements().iter().map(field_value).collect()),
        Field::MapInternal(map) => Value::Object(
            map.entries()
                .iter()
                .map(|(key, value)| {
                    let key = match field_value(key) {
                        Value::String(text) => text,
                        other => other.to_string(),
                    };
                    (key, field_value(value))
                })
                .collect::<Map<_, _>>(),
        ),
        other => other.to_json_value(),
    }
}

/// Non-finite floats have no JSON number and become null.
fn shortest_number(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Shortest scientific rendering of a half float, found by widening the
/// digit count until the text rounds back to the same half value.
fn half_float_value(value: f32) -> Value {
    if !value.is_finite() {
        return Value::Null;
    }
    if value == 0.0 {
        return shortest_number(&value.to_string());
    }

    // Half floats carry 10 fraction bits; subnormals share the 2^-14 scale.
    let exponent = (value.abs().log2().floor() as i32).max(-14);
    let half_ulp = 2f32.powi(exponent - 11);
    for digits in 0..8 {
        let text = format!("{value:.digits$e}");
        match text.parse::<f32>() {
            Ok(candidate) if (candidate - value).abs() < half_ulp => return shortest_number(&text),
            _ => {}
        }
    }
    shortest_number(&value.to_string())
}

/// Top-level column names and their feature descriptions.
fn describe_columns(
    path: &Path,
    reader: &SerializedFileReader<fs::File>,
) -> Result<(Vec<String>, Vec<String>), DataScoutError> {
    let file_metadata = reader.metadata().file_metadata();
    let schema = parquet_to_arrow_schema(
        file_metadata.schema_descr(),
        file_metadata.key_value_metadata(),
    )
    .map_err(|source| DataScoutError::ParquetRead {
        path: path.to_path_buf(),
        message: format!("unsupported schema: {source}"),
    })?;

    let declared = schema
        .metadata()
        .get(HF_METADATA_KEY)
        .and_then(|raw| hub_features_from_metadata(raw));

    let mut columns = Vec::with_capacity(schema.fields().len());
    let mut features = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let feature = declared
            .as_ref()
            .and_then(|declared| declared.get(field.name()))
            .map(describe_feature)
            .unwrap_or_else(|| describe_arrow_type(field.data_type()));
        columns.push(field.name().clone());
        features.push(feature);
    }

    Ok((columns, features))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use serde_json::json;

    use super::*;
    use crate::table::cell_text;

    fn write_shard(path: &Path, texts: &[&str], labels: &[i64], hf_metadata: Option<&str>) {
        let mut metadata = HashMap::new();
        if let Some(raw) = hf_metadata {
            metadata.insert(HF_METADATA_KEY.to_string(), raw.to_string());
        }
        let schema = Arc::new(Schema::new_with_metadata(
            vec![
                Field::new("text", DataType::Utf8, true),
                Field::new("label", DataType::Int64, true),
            ],
            metadata,
        ));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(texts.to_vec())) as ArrayRef,
                Arc::new(Int64Array::from(labels.to_vec())) as ArrayRef,
            ],
        )
        .expect("batch");

        let file = fs::File::create(path).expect("create shard");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");
    }

    #[test]
    fn shards_are_concatenated_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let first = temp.path().join("train-00000-of-00002.parquet");
        let second = temp.path().join("train-00001-of-00002.parquet");
        write_shard(&first, &["a", "b"], &[0, 1], None);
        write_shard(&second, &["c"], &[1], None);

        let table = read_parquet_shards(&[first, second]).expect("read shards");
        assert_eq!(table.column_names(), ["text", "label"]);
        assert_eq!(table.num_rows(), 3);
        let texts: Vec<&Value> = table.column("text").expect("text").collect();
        assert_eq!(texts, vec![&json!("a"), &json!("b"), &json!("c")]);
    }

    #[test]
    fn declared_features_take_precedence_over_arrow_types() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("test-00000-of-00001.parquet");
        let hf = r#"{"info": {"features": {
            "text": {"dtype": "string", "_type": "Value"},
            "label": {"names": ["neg", "pos"], "_type": "ClassLabel"}
        }}}"#;
        write_shard(&path, &["x"], &[1], Some(hf));

        let table = read_parquet_shards(&[path]).expect("read shard");
        let schema: Vec<(&str, &str)> = table.schema().collect();
        assert_eq!(
            schema,
            vec![
                ("text", "Value(dtype='string', id=None)"),
                ("label", "ClassLabel(names=['neg', 'pos'], id=None)"),
            ]
        );
    }

    #[test]
    fn arrow_types_describe_undeclared_columns() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("data.parquet");
        write_shard(&path, &["x"], &[7], None);

        let table = read_parquet_shards(&[path]).expect("read shard");
        let schema: Vec<(&str, &str)> = table.schema().collect();
        assert_eq!(schema[1], ("label", "Value(dtype='int64', id=None)"));
    }

    fn write_float_shard(path: &Path, singles: &[f32], doubles: &[f64]) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("score", DataType::Float32, true),
            Field::new("weight", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float32Array::from(singles.to_vec())) as ArrayRef,
                Arc::new(Float64Array::from(doubles.to_vec())) as ArrayRef,
            ],
        )
        .expect("batch");

        let file = fs::File::create(path).expect("create shard");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");
    }

    #[test]
    fn single_precision_floats_keep_their_stored_digits() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("train-00000-of-00001.parquet");
        write_float_shard(&path, &[0.1, 2.5, 0.3], &[0.1, 2.5, 0.3]);

        let table = read_parquet_shards(&[path]).expect("read shard");
        let scores: Vec<String> = table.column("score").expect("score").map(cell_text).collect();
        let weights: Vec<String> = table.column("weight").expect("weight").map(cell_text).collect();
        assert_eq!(scores, ["0.1", "2.5", "0.3"]);
        assert_eq!(weights, ["0.1", "2.5", "0.3"]);
        assert_eq!(table.column("score").expect("score").next(), Some(&json!(0.1)));
    }

    #[test]
    fn half_floats_use_shortest_text() {
        // Nearest half float to 0.1.
        assert_eq!(half_float_value(0.099_975_586), json!(0.1));
        assert_eq!(half_float_value(65504.0), json!(65500.0));
        assert_eq!(half_float_value(-2.0), json!(-2.0));
        assert_eq!(half_float_value(0.0), json!(0.0));
        assert_eq!(half_float_value(f32::NAN), Value::Null);
    }

    #[test]
    fn garbage_file_is_a_parquet_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("broken.parquet");
        fs::write(&path, b"definitely not parquet").expect("write");

        let err = read_parquet_shards(&[path]).expect_err("should fail");
        assert!(matches!(err, DataScoutError::ParquetRead { .. }));
    }
}
