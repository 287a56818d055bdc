#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datascout::hub::{MemoryHub, Split};
use datascout::table::SplitTable;
use parquet::arrow::ArrowWriter;
use serde_json::json;

pub const TEXT_FEATURE: &str = "Value(dtype='string', id=None)";
pub const LABEL_FEATURE: &str = "ClassLabel(names=['neg', 'pos'], id=None)";

/// Hub metadata as written next to the imdb parquet conversion.
pub const IMDB_HF_METADATA: &str = r#"{"info": {"features": {
    "text": {"dtype": "string", "_type": "Value"},
    "label": {"names": ["neg", "pos"], "_type": "ClassLabel"}
}}}"#;

/// A `text`/`label` split with `rows` rows.
pub fn reviews(rows: usize) -> SplitTable {
    SplitTable::new(
        vec!["text".to_string(), "label".to_string()],
        vec![TEXT_FEATURE.to_string(), LABEL_FEATURE.to_string()],
        (0..rows)
            .map(|i| vec![json!(format!("review number {i}")), json!(i % 2)])
            .collect(),
    )
}

/// A hub serving an imdb-like dataset under both its ids.
pub fn imdb_hub(train_rows: usize, test_rows: usize) -> MemoryHub {
    MemoryHub::with_ids(["glue", "stanfordnlp/imdb", "squad"])
        .with_split("imdb", Split::Train, reviews(train_rows))
        .with_split("imdb", Split::Test, reviews(test_rows))
        .with_split("stanfordnlp/imdb", Split::Test, reviews(test_rows))
}

/// Write a `text`/`label` parquet shard the way the hub conversion does.
pub fn write_reviews_shard(path: &Path, texts: &[&str], labels: &[i64]) {
    let metadata = HashMap::from([("huggingface".to_string(), IMDB_HF_METADATA.to_string())]);
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
    .expect("record batch");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let file = fs::File::create(path).expect("create shard");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("arrow writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
}

/// Write a one-column `float32` shard without hub metadata.
pub fn write_score_shard(path: &Path, scores: &[f32]) {
    let schema = Arc::new(Schema::new(vec![Field::new("score", DataType::Float32, true)]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(Float32Array::from(scores.to_vec())) as ArrayRef],
    )
    .expect("record batch");

    let file = fs::File::create(path).expect("create shard");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("arrow writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
}
