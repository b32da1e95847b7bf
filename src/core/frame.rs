//! Conversion between [`Dataset`] and a polars `DataFrame`.
//!
//! Columns are typed by looking at their non-null values. Columns holding
//! objects, arrays or mixed kinds are carried as compact JSON text (strings
//! keep their quotes); the returned [`FrameShape`] remembers which columns
//! were encoded so they can be decoded again on the way back.

use crate::core::dataset::{Dataset, Record};
use polars::prelude::*;
use serde_json::{Number, Value};
use std::collections::HashSet;

/// Side information produced when a dataset is lowered to a frame.
#[derive(Debug, Default, Clone)]
pub struct FrameShape {
    encoded: HashSet<String>,
    placeholder: bool,
}

/// Carries the row count of a dataset that has rows but no columns.
const PLACEHOLDER_COLUMN: &str = "__jsonl_viewer_row";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Bool,
    Int,
    UInt,
    Float,
    Str,
    Json,
}

fn kind_of(v: &Value) -> ColumnKind {
    match v {
        Value::Null => ColumnKind::Null,
        Value::Bool(_) => ColumnKind::Bool,
        Value::Number(n) if n.is_i64() => ColumnKind::Int,
        Value::Number(n) if n.is_u64() => ColumnKind::UInt,
        Value::Number(_) => ColumnKind::Float,
        Value::String(_) => ColumnKind::Str,
        Value::Array(_) | Value::Object(_) => ColumnKind::Json,
    }
}

fn merge_kind(a: ColumnKind, b: ColumnKind) -> ColumnKind {
    use ColumnKind::*;
    match (a, b) {
        (Null, k) | (k, Null) => k,
        (x, y) if x == y => x,
        (Int, Float) | (Float, Int) => Float,
        (Int, UInt) | (UInt, Int) => Json,
        _ => Json,
    }
}

/// Lower a dataset to a `DataFrame` with one column per dataset column.
pub fn to_frame(ds: &Dataset) -> PolarsResult<(DataFrame, FrameShape)> {
    let mut shape = FrameShape::default();
    let mut columns: Vec<Column> = Vec::with_capacity(ds.column_count());
    for name in ds.columns() {
        let cells: Vec<Option<&Value>> = ds
            .rows()
            .iter()
            .map(|r| r.get(name).filter(|v| !v.is_null()))
            .collect();
        let kind = cells
            .iter()
            .flatten()
            .map(|v| kind_of(v))
            .fold(ColumnKind::Null, merge_kind);
        let series = match kind {
            ColumnKind::Bool => {
                let vals: Vec<Option<bool>> = cells.iter().map(|c| c.and_then(Value::as_bool)).collect();
                Series::new(name.as_str().into(), vals)
            }
            ColumnKind::Int => {
                let vals: Vec<Option<i64>> = cells.iter().map(|c| c.and_then(Value::as_i64)).collect();
                Series::new(name.as_str().into(), vals)
            }
            ColumnKind::UInt => {
                let vals: Vec<Option<u64>> = cells.iter().map(|c| c.and_then(Value::as_u64)).collect();
                Series::new(name.as_str().into(), vals)
            }
            ColumnKind::Float => {
                let vals: Vec<Option<f64>> = cells.iter().map(|c| c.and_then(Value::as_f64)).collect();
                Series::new(name.as_str().into(), vals)
            }
            ColumnKind::Null | ColumnKind::Str => {
                let vals: Vec<Option<String>> = cells
                    .iter()
                    .map(|c| c.and_then(Value::as_str).map(str::to_string))
                    .collect();
                Series::new(name.as_str().into(), vals)
            }
            ColumnKind::Json => {
                shape.encoded.insert(name.clone());
                let vals: Vec<Option<String>> =
                    cells.iter().map(|c| c.map(Value::to_string)).collect();
                Series::new(name.as_str().into(), vals)
            }
        };
        columns.push(series.into_column());
    }
    if columns.is_empty() && !ds.is_empty() {
        shape.placeholder = true;
        let vals: Vec<Option<bool>> = vec![None; ds.row_count()];
        columns.push(Series::new(PLACEHOLDER_COLUMN.into(), vals).into_column());
    }
    let df = DataFrame::new(columns)?;
    Ok((df, shape))
}

/// Raise a `DataFrame` back into a dataset. Null cells become missing keys.
pub fn from_frame(df: &DataFrame, shape: &FrameShape) -> PolarsResult<Dataset> {
    let kept: Vec<&Column> = df
        .get_columns()
        .iter()
        .filter(|c| !(shape.placeholder && c.name().as_str() == PLACEHOLDER_COLUMN))
        .collect();
    let names: Vec<String> = kept.iter().map(|c| c.name().to_string()).collect();
    let mut rows: Vec<Record> = vec![Record::new(); df.height()];
    for (name, column) in names.iter().zip(kept) {
        let decode = shape.encoded.contains(name) && column.dtype() == &DataType::String;
        for (row_idx, row) in rows.iter_mut().enumerate() {
            let av = column.get(row_idx)?;
            let value = anyvalue_to_json(&av);
            let value = match value {
                Value::Null => continue,
                Value::String(s) if decode => decode_json_text(s),
                other => other,
            };
            row.insert(name.clone(), value);
        }
    }
    Ok(Dataset::new(names, rows))
}

/// Text produced by a query rather than by [`to_frame`] stays a string.
fn decode_json_text(s: String) -> Value {
    serde_json::from_str::<Value>(&s).unwrap_or(Value::String(s))
}

fn float_to_json(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Map a polars cell to JSON. Types without a JSON counterpart use their
/// display form.
pub fn anyvalue_to_json(av: &AnyValue<'_>) -> Value {
    match av {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => float_to_json(f64::from(*v)),
        AnyValue::Float64(v) => float_to_json(*v),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::List(series) => {
            Value::Array(series.iter().map(|inner| anyvalue_to_json(&inner)).collect())
        }
        other => Value::String(format!("{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dataset(lines: &[Value]) -> Dataset {
        Dataset::from_records(
            lines
                .iter()
                .map(|v| v.as_object().cloned().unwrap_or_default())
                .collect(),
        )
    }

    #[test]
    fn test_column_types_are_inferred() {
        let ds = dataset(&[
            json!({"i": 1, "f": 1, "s": "a", "b": true, "m": 1}),
            json!({"i": 2, "f": 2.5, "s": null, "b": false, "m": "x"}),
        ]);
        let (df, _) = to_frame(&ds).unwrap();
        assert_eq!(df.column("i").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("f").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("s").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("m").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_frame_round_trip_keeps_nested_values_and_missing_keys() {
        let ds = dataset(&[
            json!({"a": 1, "tags": ["x", "y"]}),
            json!({"a": 2, "meta": {"k": 1}}),
        ]);
        let (df, shape) = to_frame(&ds).unwrap();
        let back = from_frame(&df, &shape).unwrap();
        assert_eq!(back, ds);
    }

    fn round_trip(ds: &Dataset) -> Dataset {
        let (df, shape) = to_frame(ds).unwrap();
        from_frame(&df, &shape).unwrap()
    }

    #[test]
    fn test_mixed_number_and_string_column_keeps_each_type() {
        let ds = dataset(&[json!({"m": 1}), json!({"m": "x"}), json!({"m": 2.5})]);
        assert_eq!(round_trip(&ds), ds);
    }

    #[test]
    fn test_string_that_looks_like_json_stays_a_string() {
        let ds = dataset(&[json!({"t": [1]}), json!({"t": "[2]"}), json!({"t": "{\"k\":1}"})]);
        let back = round_trip(&ds);
        assert_eq!(back.rows()[1]["t"], json!("[2]"));
        assert_eq!(back, ds);
    }

    #[test]
    fn test_unsigned_values_above_i64_keep_precision() {
        let ds = dataset(&[json!({"u": u64::MAX}), json!({"u": 7u64 + i64::MAX as u64})]);
        let (df, _) = to_frame(&ds).unwrap();
        assert_eq!(df.column("u").unwrap().dtype(), &DataType::UInt64);
        assert_eq!(round_trip(&ds).rows()[0]["u"], json!(18446744073709551615u64));

        let mixed = dataset(&[json!({"u": u64::MAX}), json!({"u": -1})]);
        assert_eq!(round_trip(&mixed), mixed);
    }

    #[test]
    fn test_rows_without_columns_keep_their_count() {
        let ds = dataset(&[json!({}), json!({}), json!({})]);
        let (df, _) = to_frame(&ds).unwrap();
        assert_eq!(df.height(), 3);
        let back = round_trip(&ds);
        assert_eq!(back.row_count(), 3);
        assert!(back.columns().is_empty());
    }
}
