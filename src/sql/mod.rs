//! Sandboxed SQL dialect for transformations.
//!
//! A query sees exactly one table, `df`, plus the functions polars SQL ships
//! with and the UDFs registered here. [`guard::check`] rejects anything else
//! before the query reaches polars.

pub mod guard;

use polars::prelude::*;
use polars_lazy::frame::IntoLazy;
use polars_plan::dsl::GetOutput;
use polars_plan::dsl::udf::UserDefinedFunction;
use polars_sql::SQLContext;
use polars_sql::function_registry::FunctionRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// The only table name a transformation may reference.
pub const TABLE_NAME: &str = "df";

fn squish_impl(columns: &mut [Column]) -> PolarsResult<Option<Column>> {
    if columns.len() != 1 {
        return Err(PolarsError::ComputeError(
            "squish function expects exactly one argument".into(),
        ));
    }
    let s = columns[0].as_materialized_series();
    let s = if s.dtype() == &DataType::String { s } else { &s.cast(&DataType::String)? };
    let out: StringChunked = s
        .str()?
        .into_iter()
        .map(|opt| opt.map(|v| v.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect();
    Ok(Some(out.with_name(s.name().clone()).into_series().into_column()))
}

/// Register the application UDFs on a context.
pub fn register_all(ctx: &mut SQLContext) -> PolarsResult<()> {
    // squish(text) -> text with runs of whitespace collapsed
    let udf = UserDefinedFunction::new(
        "squish".into(),
        GetOutput::from_type(DataType::String),
        squish_impl,
    );
    ctx.registry_mut().register("squish", udf)?;
    Ok(())
}

// Registry that accepts UDFs at runtime
#[derive(Default)]
struct UdfRegistry {
    functions: HashMap<String, UserDefinedFunction>,
}

impl FunctionRegistry for UdfRegistry {
    fn register(&mut self, name: &str, fun: UserDefinedFunction) -> PolarsResult<()> {
        self.functions.insert(name.to_string(), fun);
        Ok(())
    }

    fn get_udf(&self, name: &str) -> PolarsResult<Option<UserDefinedFunction>> {
        Ok(self.functions.get(name).cloned())
    }

    fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

/// Create a SQLContext configured with a custom registry that supports registering UDFs.
pub fn new_sql_context() -> SQLContext {
    SQLContext::new().with_function_registry(Arc::new(UdfRegistry::default()))
}

/// Run an already-checked query against `frame` registered as `df`.
pub fn execute(frame: DataFrame, query: &str) -> PolarsResult<DataFrame> {
    let mut ctx = new_sql_context();
    register_all(&mut ctx)?;
    ctx.register(TABLE_NAME, frame.lazy());
    ctx.execute(query)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::anyvalue_to_json;

    #[test]
    fn test_execute_with_udf() {
        let df = df!("name" => ["  a   b ", "c"], "n" => [1i64, 2]).unwrap();
        let out = execute(df, "SELECT squish(name) AS name FROM df WHERE n = 1").unwrap();
        assert_eq!(out.height(), 1);
        let v = out.column("name").unwrap().get(0).unwrap();
        assert_eq!(anyvalue_to_json(&v), serde_json::json!("a b"));
    }
}
