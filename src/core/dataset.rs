use serde_json::Value;
use std::collections::HashSet;

/// One parsed JSON object, keys in the order they appeared on the line.
pub type Record = serde_json::Map<String, Value>;

/// Immutable in-memory table: ordered unique column names plus ordered rows.
///
/// A row's position is its only identity. Operations never mutate a dataset;
/// they build a new one, so snapshots can be shared freely behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    /// Build a dataset with an explicit column order.
    ///
    /// Duplicate names keep their first position.
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        let mut seen = HashSet::with_capacity(columns.len());
        let columns = columns
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        Self { columns, rows }
    }

    /// Build a dataset whose columns are the ordered union of the records' keys.
    pub fn from_records(rows: Vec<Record>) -> Self {
        let columns = union_columns(rows.iter());
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Raw cell value; `None` when the row lacks the key or is out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// The row aligned to `columns`, stringified the way the table shows it.
    pub fn display_row(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| display_value(self.value(row, c)))
            .collect()
    }
}

/// Ordered union of keys, each fixed at its first occurrence.
pub fn union_columns<'a>(rows: impl Iterator<Item = &'a Record>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Stringify a cell for display. Missing and null cells render empty.
pub fn display_value(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_from_records_orders_columns_by_first_occurrence() {
        let ds = Dataset::from_records(vec![
            record(json!({"b": 1, "a": 2})),
            record(json!({"c": 3, "a": 4})),
        ]);
        assert_eq!(ds.columns(), ["b", "a", "c"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.value(1, "b"), None);
    }

    #[test]
    fn test_new_drops_duplicate_columns() {
        let ds = Dataset::new(vec!["a".into(), "b".into(), "a".into()], vec![]);
        assert_eq!(ds.columns(), ["a", "b"]);
    }

    #[test]
    fn test_display_row() {
        let ds = Dataset::from_records(vec![record(
            json!({"s": "x", "n": 1.5, "b": true, "z": null, "o": {"k": [1, 2]}}),
        )]);
        assert_eq!(ds.display_row(0), vec!["x", "1.5", "true", "", r#"{"k":[1,2]}"#]);
    }
}
