//! Expression-driven transformations producing a new [`Dataset`].

use crate::core::frame::{from_frame, to_frame};
use crate::core::{Dataset, TransformError, TransformLanguage};
use crate::{jmes, sql};
use tracing::{debug, error};

/// Evaluate `expression` against `dataset`.
///
/// The input is never modified. On success the result's columns come from
/// the result itself, so expressions may add, drop, rename or reorder them.
pub fn transform(
    dataset: &Dataset,
    expression: &str,
    language: TransformLanguage,
) -> Result<Dataset, TransformError> {
    debug!(%language, expression, "applying transformation");
    let result = match language {
        TransformLanguage::Sql => transform_sql(dataset, expression),
        TransformLanguage::Jmes => jmes::apply_rows(dataset, expression),
    };
    match &result {
        Ok(ds) => debug!(rows = ds.row_count(), columns = ds.column_count(), "transformation applied"),
        Err(e) => error!("Error executing {language} expression: {e}"),
    }
    result
}

fn transform_sql(dataset: &Dataset, expression: &str) -> Result<Dataset, TransformError> {
    let query = sql::guard::check(expression)?;
    let (frame, shape) =
        to_frame(dataset).map_err(|e| TransformError::Execution(e.to_string()))?;
    let out = sql::execute(frame, &query).map_err(|e| TransformError::Execution(e.to_string()))?;
    from_frame(&out, &shape).map_err(|e| TransformError::Execution(e.to_string()))
}
