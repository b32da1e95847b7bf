//! Column subset views over a [`Dataset`].

use crate::core::{Dataset, Record, SelectionWarning};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Outcome of a projection: the new dataset plus any non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub dataset: Dataset,
    pub warnings: Vec<SelectionWarning>,
}

/// Restrict `dataset` to the requested columns.
///
/// The result keeps the dataset's own column order, whatever order the names
/// were requested in. Unknown names are dropped and reported. An empty
/// selection, or one where nothing valid remains, yields the full dataset
/// with [`SelectionWarning::NoSelectionFallback`].
pub fn project<S: AsRef<str>>(dataset: &Dataset, selected: &[S]) -> Projection {
    let mut warnings = Vec::new();

    let known: HashSet<&str> = dataset.columns().iter().map(String::as_str).collect();
    let mut seen_unknown = HashSet::new();
    let unknown: Vec<String> = selected
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !known.contains(name) && seen_unknown.insert(*name))
        .map(str::to_string)
        .collect();
    if !unknown.is_empty() {
        warn!(?unknown, "ignoring unknown columns in projection");
        warnings.push(SelectionWarning::UnknownColumns(unknown));
    }

    let wanted: HashSet<&str> = selected
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| known.contains(name))
        .collect();
    if wanted.is_empty() {
        warn!("no columns selected, keeping all columns");
        warnings.push(SelectionWarning::NoSelectionFallback);
        return Projection {
            dataset: dataset.clone(),
            warnings,
        };
    }

    let columns: Vec<String> = dataset
        .columns()
        .iter()
        .filter(|c| wanted.contains(c.as_str()))
        .cloned()
        .collect();
    let rows: Vec<Record> = dataset
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                .collect()
        })
        .collect();
    debug!(columns = ?columns, "projected dataset");
    Projection {
        dataset: Dataset::new(columns, rows),
        warnings,
    }
}
