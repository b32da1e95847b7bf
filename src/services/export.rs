//! Copy-out of a rectangular selection as line-delimited JSON.

use crate::core::{Dataset, Record};
use arboard::Clipboard;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, error};

/// Serialize the selected cells, one compact JSON object per line.
///
/// Rows come out in ascending row order and keys in ascending column order,
/// regardless of how the selection was made. Missing cells are written as
/// `null`; indices outside the dataset are skipped. An empty selection gives
/// an empty string.
pub fn export_selection(dataset: &Dataset, row_indices: &[usize], column_indices: &[usize]) -> String {
    let rows: BTreeSet<usize> = row_indices
        .iter()
        .copied()
        .filter(|&r| r < dataset.row_count())
        .collect();
    let headers: Vec<&String> = column_indices
        .iter()
        .copied()
        .collect::<BTreeSet<usize>>()
        .into_iter()
        .filter_map(|c| dataset.columns().get(c))
        .collect();
    if rows.is_empty() || headers.is_empty() {
        debug!("empty selection, nothing to export");
        return String::new();
    }

    let lines: Vec<String> = rows
        .into_iter()
        .map(|r| {
            let obj: Record = headers
                .iter()
                .map(|h| {
                    let v = dataset.value(r, h).cloned().unwrap_or(Value::Null);
                    ((*h).clone(), v)
                })
                .collect();
            Value::Object(obj).to_string()
        })
        .collect();
    lines.join("\n")
}

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    Clipboard::new()
        .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
        .inspect_err(|e| error!("Failed to copy to clipboard: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::parse;
    use pretty_assertions::assert_eq;

    fn sample() -> Dataset {
        parse("{\"a\":1,\"b\":\"x\"}\n{\"a\":2,\"c\":\"y\"}\n{\"a\":3,\"b\":\"z\",\"c\":[1]}\n").unwrap()
    }

    #[test]
    fn test_selection_is_sorted_by_row_and_column() {
        let text = export_selection(&sample(), &[2, 0], &[2, 0]);
        assert_eq!(text, "{\"a\":1,\"c\":null}\n{\"a\":3,\"c\":[1]}");
    }

    #[test]
    fn test_empty_selection_is_a_no_op() {
        assert_eq!(export_selection(&sample(), &[], &[0]), "");
        assert_eq!(export_selection(&sample(), &[0], &[]), "");
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let text = export_selection(&sample(), &[1, 9], &[1, 7]);
        assert_eq!(text, "{\"b\":null}");
    }

    #[test]
    fn test_export_parses_back_to_same_shape() {
        let ds = sample();
        let all_rows: Vec<usize> = (0..ds.row_count()).collect();
        let all_cols: Vec<usize> = (0..ds.column_count()).collect();
        let text = export_selection(&ds, &all_rows, &all_cols);
        let back = parse(&text).unwrap();
        assert_eq!(back.columns(), ds.columns());
        assert_eq!(back.row_count(), ds.row_count());
    }
}
