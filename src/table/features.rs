//! Feature-type descriptions.
//!
//! Hub-written parquet files embed the dataset's declared features as JSON
//! under the `huggingface` metadata key. Those declarations are rendered in
//! the constructor notation the `datasets` library prints, for example
//! `ClassLabel(names=['neg', 'pos'], id=None)`. Files without that key fall
//! back to a `Value(...)` built from the Arrow data type.

use arrow::datatypes::{DataType, TimeUnit};
use serde_json::{Map, Value};

/// Parquet/Arrow schema metadata key holding the hub's dataset info.
pub const HF_METADATA_KEY: &str = "huggingface";

/// Argument default used when a known feature omits a field.
#[derive(Clone, Copy)]
enum Fallback {
    Required,
    NoneValue,
    Flag(bool),
    Int(i64),
}

impl Fallback {
    fn render(self) -> String {
        match self {
            Fallback::Required | Fallback::NoneValue => "None".to_string(),
            Fallback::Flag(true) => "True".to_string(),
            Fallback::Flag(false) => "False".to_string(),
            Fallback::Int(value) => value.to_string(),
        }
    }
}

fn known_fields(type_name: &str) -> Option<&'static [(&'static str, Fallback)]> {
    use Fallback::*;

    let fields: &'static [(&'static str, Fallback)] = match type_name {
        "Value" => &[("dtype", Required), ("id", NoneValue)],
        "ClassLabel" => &[("names", Required), ("id", NoneValue)],
        "Sequence" => &[("feature", Required), ("length", Int(-1)), ("id", NoneValue)],
        "Image" => &[("mode", NoneValue), ("decode", Flag(true)), ("id", NoneValue)],
        "Audio" => &[
            ("sampling_rate", NoneValue),
            ("mono", Flag(true)),
            ("decode", Flag(true)),
            ("id", NoneValue),
        ],
        "Translation" => &[("languages", Required), ("id", NoneValue)],
        _ => return None,
    };
    Some(fields)
}

/// Parse the `huggingface` metadata entry into its per-column features.
pub fn hub_features_from_metadata(raw: &str) -> Option<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    value
        .get("info")
        .and_then(|info| info.get("features"))
        .or_else(|| value.get("features"))?
        .as_object()
        .cloned()
}

/// Describe one declared feature.
pub fn describe_feature(feature: &Value) -> String {
    match feature {
        Value::Object(map) => match map.get("_type").and_then(Value::as_str) {
            Some(type_name) => describe_typed(type_name, map),
            None => format!(
                "{{{}}}",
                map.iter()
                    .map(|(key, value)| format!("{}: {}", quote(key), describe_feature(value)))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        Value::Array(items) => format!(
            "[{}]",
            items
                .iter()
                .map(describe_feature)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        other => python_repr(other),
    }
}

fn describe_typed(type_name: &str, map: &Map<String, Value>) -> String {
    let args: Vec<String> = match known_fields(type_name) {
        Some(fields) => fields
            .iter()
            .map(|(key, fallback)| {
                let rendered = map
                    .get(*key)
                    .map(describe_feature)
                    .unwrap_or_else(|| fallback.render());
                format!("{key}={rendered}")
            })
            .collect(),
        None => map
            .iter()
            .filter(|(key, _)| key.as_str() != "_type")
            .map(|(key, value)| format!("{key}={}", describe_feature(value)))
            .collect(),
    };

    format!("{type_name}({})", args.join(", "))
}

/// Describe a column that carries no hub feature declaration.
pub fn describe_arrow_type(data_type: &DataType) -> String {
    match data_type {
        DataType::List(field) | DataType::LargeList(field) => format!(
            "Sequence(feature={}, length=-1, id=None)",
            describe_arrow_type(field.data_type())
        ),
        DataType::FixedSizeList(field, length) => format!(
            "Sequence(feature={}, length={length}, id=None)",
            describe_arrow_type(field.data_type())
        ),
        DataType::Struct(fields) => format!(
            "{{{}}}",
            fields
                .iter()
                .map(|field| format!(
                    "{}: {}",
                    quote(field.name()),
                    describe_arrow_type(field.data_type())
                ))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        other => format!("Value(dtype={}, id=None)", quote(&arrow_dtype_name(other))),
    }
}

fn arrow_dtype_name(data_type: &DataType) -> String {
    let name = match data_type {
        DataType::Null => "null",
        DataType::Boolean => "bool",
        DataType::Int8 => "int8",
        DataType::Int16 => "int16",
        DataType::Int32 => "int32",
        DataType::Int64 => "int64",
        DataType::UInt8 => "uint8",
        DataType::UInt16 => "uint16",
        DataType::UInt32 => "uint32",
        DataType::UInt64 => "uint64",
        DataType::Float16 => "float16",
        DataType::Float32 => "float32",
        DataType::Float64 => "float64",
        DataType::Utf8 | DataType::Utf8View => "string",
        DataType::LargeUtf8 => "large_string",
        DataType::Binary | DataType::BinaryView => "binary",
        DataType::LargeBinary => "large_binary",
        DataType::Date32 => "date32",
        DataType::Date64 => "date64",
        DataType::Timestamp(unit, tz) => {
            let unit = match unit {
                TimeUnit::Second => "s",
                TimeUnit::Millisecond => "ms",
                TimeUnit::Microsecond => "us",
                TimeUnit::Nanosecond => "ns",
            };
            return match tz {
                Some(tz) => format!("timestamp[{unit}, tz={tz}]"),
                None => format!("timestamp[{unit}]"),
            };
        }
        other => return other.to_string().to_ascii_lowercase(),
    };
    name.to_string()
}

/// Render a JSON value in Python literal notation.
pub fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => quote(text),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(python_repr).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(key, value)| format!("{}: {}", quote(key), python_repr(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Quote a string the way Python's `repr` does.
fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}
