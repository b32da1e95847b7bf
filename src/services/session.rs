//! The tabular session: original, current and checkpointed datasets plus the
//! paging state a viewer needs.

use crate::core::{
    Checkpoint, ConnectionParams, Dataset, EngineError, InputError, PageSize, Record,
    SelectionWarning, SourceType, TransformLanguage,
};
use crate::services::export::export_selection;
use crate::services::paginator::PageWindow;
use crate::services::parser::parse;
use crate::services::projector::project;
use crate::services::source::{RemoteSource, read_local_text};
use crate::services::transformer::transform;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One page of the current dataset, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub window: PageWindow,
}

impl PageView {
    /// Rows aligned to `columns` and stringified for display.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| crate::core::display_value(row.get(c)))
                    .collect()
            })
            .collect()
    }
}

/// Session state. Datasets are immutable values; every operation swaps the
/// `current` pointer instead of editing a table in place.
#[derive(Debug, Default)]
pub struct Session {
    original: Arc<Dataset>,
    current: Arc<Dataset>,
    checkpoint: Checkpoint,
    source: Option<SourceType>,
    page_size: PageSize,
    page_index: usize,
    pending_expression: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_page_size(PageSize::default())
    }

    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            page_size,
            page_index: 1,
            ..Default::default()
        }
    }

    /// Parse `raw_text` and make it the session's dataset.
    ///
    /// On failure nothing about the session changes.
    pub fn load(&mut self, raw_text: &str) -> Result<(), EngineError> {
        self.load_from(raw_text, SourceType::Inline)
    }

    pub fn load_local(&mut self, path: &Path) -> Result<(), EngineError> {
        let text = read_local_text(path)?;
        self.load_from(&text, SourceType::Local(path.to_path_buf()))
    }

    pub fn load_remote(
        &mut self,
        source: &dyn RemoteSource,
        params: &ConnectionParams,
        path: &str,
    ) -> Result<(), EngineError> {
        params.validate()?;
        if path.trim().is_empty() {
            return Err(InputError::MissingField("path").into());
        }
        let text = source.fetch_remote_text(params, path)?;
        self.load_from(
            &text,
            SourceType::Remote {
                host: params.hostname.clone(),
                path: path.to_string(),
            },
        )
    }

    /// Install text that was fetched elsewhere, e.g. by a background fetch.
    pub fn load_fetched(&mut self, raw_text: &str, source: SourceType) -> Result<(), EngineError> {
        self.load_from(raw_text, source)
    }

    fn load_from(&mut self, raw_text: &str, source: SourceType) -> Result<(), EngineError> {
        let dataset = Arc::new(parse(raw_text)?);
        info!(
            %source,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "dataset loaded"
        );
        self.original = dataset.clone();
        self.current = dataset;
        self.checkpoint.clear();
        self.source = Some(source);
        self.pending_expression = None;
        self.page_index = 1;
        Ok(())
    }

    /// Narrow the current dataset to `names`. Warnings are returned alongside
    /// the applied result.
    pub fn project<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<SelectionWarning> {
        self.checkpoint.store(self.current.clone());
        let projection = project(&self.current, names);
        self.replace_current(Arc::new(projection.dataset));
        projection.warnings
    }

    /// Apply an expression to the current dataset.
    ///
    /// The checkpoint is written before the attempt, so a failed
    /// transformation followed by [`Session::undo`] changes nothing.
    pub fn transform(&mut self, expression: &str, language: TransformLanguage) -> Result<(), EngineError> {
        self.checkpoint.store(self.current.clone());
        self.pending_expression = Some(expression.to_string());
        let next = transform(&self.current, expression, language)?;
        self.replace_current(Arc::new(next));
        Ok(())
    }

    /// Restore the dataset as it was right before the last projection or
    /// transformation. Repeating the call restores the same snapshot.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        let snapshot = self.checkpoint.undo()?;
        debug!("restoring checkpoint");
        self.pending_expression = None;
        self.replace_current(snapshot);
        Ok(())
    }

    /// Discard every projection and transformation.
    pub fn reset_to_original(&mut self) {
        debug!("resetting to original dataset");
        self.checkpoint.store(self.original.clone());
        self.pending_expression = None;
        self.replace_current(self.original.clone());
    }

    fn replace_current(&mut self, dataset: Arc<Dataset>) {
        self.current = dataset;
        self.page_index = 1;
    }

    /// Change rows per page, keeping the current page when it still exists.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page_index = self.window().page_index;
    }

    /// Move by `delta` pages, clamped to the available range.
    pub fn go_to_page(&mut self, delta: isize) -> usize {
        let requested = self.window().page_index.saturating_add_signed(delta);
        self.page_index =
            PageWindow::compute(self.current.row_count(), self.page_size, requested).page_index;
        self.page_index
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::compute(self.current.row_count(), self.page_size, self.page_index)
    }

    pub fn page(&self) -> PageView {
        let window = self.window();
        PageView {
            columns: self.current.columns().to_vec(),
            rows: self.current.rows()[window.start..window.end].to_vec(),
            window,
        }
    }

    /// Export a selection made on the current page. Indices are relative to
    /// the page window; positions outside it are ignored.
    pub fn export_selection(&self, rows: &[usize], columns: &[usize]) -> String {
        let window = self.window();
        let absolute: Vec<usize> = rows.iter().filter_map(|&r| window.absolute(r)).collect();
        if absolute.len() < rows.len() {
            warn!("ignoring selected rows outside the current page");
        }
        export_selection(&self.current, &absolute, columns)
    }

    pub fn original(&self) -> &Dataset {
        &self.original
    }

    pub fn current(&self) -> &Dataset {
        &self.current
    }

    pub fn columns(&self) -> &[String] {
        self.current.columns()
    }

    pub fn source(&self) -> Option<&SourceType> {
        self.source.as_ref()
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn has_checkpoint(&self) -> bool {
        self.checkpoint.is_set()
    }

    pub fn pending_expression(&self) -> Option<&str> {
        self.pending_expression.as_deref()
    }
}
