//! Line-delimited JSON parsing into a [`Dataset`].

use crate::core::{Dataset, EngineError, InputError, ParseError, Record};
use serde_json::Value;
use tracing::debug;

/// Parse newline-separated JSON objects. All-or-nothing: the first bad line
/// aborts the whole parse.
pub fn parse(raw_text: &str) -> Result<Dataset, EngineError> {
    if raw_text.trim().is_empty() {
        return Err(InputError::EmptyInput.into());
    }
    let mut records: Vec<Record> = Vec::new();
    for (idx, line) in raw_text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| ParseError {
            line: idx + 1,
            message: e.to_string(),
        })?;
        match value {
            Value::Object(map) => records.push(map),
            other => {
                return Err(ParseError {
                    line: idx + 1,
                    message: format!("expected a JSON object, found {}", json_kind(&other)),
                }
                .into());
            }
        }
    }
    let dataset = Dataset::from_records(records);
    debug!(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "parsed line-delimited JSON"
    );
    Ok(dataset)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
