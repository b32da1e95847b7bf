//! Row-wise JMESPath transformations.
//!
//! Each row is handed to the expression as a JSON object. The expression
//! must produce an object (the new row) or null (drop the row).

mod functions;
mod runtime;

pub use functions::register_custom_functions;
pub use runtime::with_runtime;

use crate::core::{Dataset, Record, TransformError};
use serde_json::Value;

/// Create a new `Runtime` with built-in functions and our custom functions registered.
pub fn new_runtime() -> jmespath::Runtime {
    let mut rt = jmespath::Runtime::new();
    rt.register_builtin_functions();
    register_custom_functions(&mut rt);
    rt
}

/// Apply `query` to every row of `dataset`.
pub fn apply_rows(dataset: &Dataset, query: &str) -> Result<Dataset, TransformError> {
    if query.trim().is_empty() {
        return Err(TransformError::Empty);
    }
    with_runtime(|rt| {
        let expr = rt
            .compile(query)
            .map_err(|e| TransformError::Syntax(e.to_string()))?;
        let mut out: Vec<Record> = Vec::with_capacity(dataset.row_count());
        for (row_idx, row) in dataset.rows().iter().enumerate() {
            let var = jmespath::Variable::try_from(Value::Object(row.clone())).map_err(|e| {
                TransformError::Execution(format!("row {row_idx}: {e}"))
            })?;
            let result = expr
                .search(&var)
                .map_err(|e| TransformError::Execution(format!("row {row_idx}: {e}")))?;
            if result.is_null() {
                continue;
            }
            if !result.is_object() {
                return Err(TransformError::NotATable);
            }
            match serde_json::to_value(&*result) {
                Ok(Value::Object(map)) => out.push(map),
                Ok(_) => return Err(TransformError::NotATable),
                Err(e) => return Err(TransformError::Execution(format!("row {row_idx}: {e}"))),
            }
        }
        Ok(Dataset::from_records(out))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::parse;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Dataset {
        parse("{\"name\":\"a  b\",\"n\":1}\n{\"name\":\"c\",\"n\":5}\n").unwrap()
    }

    #[test]
    fn test_reshape_rows() {
        let ds = apply_rows(&sample(), "{label: squish(name), big: n > `2`}").unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.value(0, "label"), Some(&json!("a b")));
        assert_eq!(ds.value(1, "big"), Some(&json!(true)));
    }

    #[test]
    fn test_null_result_drops_row() {
        let ds = apply_rows(&sample(), "n > `2` && @ || null").unwrap();
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.value(0, "name"), Some(&json!("c")));
    }

    #[test]
    fn test_non_object_result_is_not_a_table() {
        assert_eq!(apply_rows(&sample(), "n"), Err(TransformError::NotATable));
    }

    #[test]
    fn test_bad_expression_is_a_syntax_error() {
        assert!(matches!(apply_rows(&sample(), "{a: "), Err(TransformError::Syntax(_))));
        assert_eq!(apply_rows(&sample(), "  "), Err(TransformError::Empty));
    }
}
