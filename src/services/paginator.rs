//! Page window arithmetic over a [`Dataset`].

use crate::core::{Dataset, PageSize, Record};

/// Total pages for `total_rows`; never less than one.
pub fn total_pages(total_rows: usize, page_size: PageSize) -> usize {
    total_rows.div_ceil(page_size.get()).max(1)
}

/// Clamp a requested 1-based page index into `[1, total_pages]`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// A derived row window. Holds `[start, end)` into the dataset's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_index: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn compute(total_rows: usize, page_size: PageSize, requested_page: usize) -> Self {
        let total_pages = total_pages(total_rows, page_size);
        let page_index = clamp_page(requested_page, total_pages);
        let start = ((page_index - 1) * page_size.get()).min(total_rows);
        let end = (start + page_size.get()).min(total_rows);
        Self {
            page_index,
            total_pages,
            total_rows,
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Absolute row index for a position inside the window.
    pub fn absolute(&self, relative: usize) -> Option<usize> {
        (relative < self.len()).then_some(self.start + relative)
    }
}

/// Rows for the requested page, the effective page index and the page count.
pub fn page(dataset: &Dataset, page_size: PageSize, requested_page: usize) -> (&[Record], usize, usize) {
    let window = PageWindow::compute(dataset.row_count(), page_size, requested_page);
    (
        &dataset.rows()[window.start..window.end],
        window.page_index,
        window.total_pages,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::parse;

    fn rows(n: usize) -> Dataset {
        let text: String = (0..n).map(|i| format!("{{\"i\":{i}}}\n")).collect();
        parse(&text).unwrap()
    }

    #[test]
    fn test_twenty_five_rows_make_three_pages() {
        let ds = rows(25);
        let (window, idx, total) = page(&ds, PageSize::Ten, 1);
        assert_eq!((window.len(), idx, total), (10, 1, 3));
        let (window, idx, total) = page(&ds, PageSize::Ten, 3);
        assert_eq!((window.len(), idx, total), (5, 3, 3));
    }

    #[test]
    fn test_out_of_range_requests_clamp() {
        let ds = rows(25);
        let (window, idx, _) = page(&ds, PageSize::Ten, 99);
        assert_eq!(idx, 3);
        assert_eq!(window[0].get("i"), Some(&serde_json::json!(20)));
        let (_, idx, _) = page(&ds, PageSize::Ten, 0);
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_empty_dataset_has_one_page() {
        let w = PageWindow::compute(0, PageSize::Five, 4);
        assert_eq!((w.page_index, w.total_pages, w.start, w.end), (1, 1, 0, 0));
        assert!(w.is_empty());
    }

    #[test]
    fn test_absolute_index() {
        let w = PageWindow::compute(12, PageSize::Five, 3);
        assert_eq!(w.absolute(0), Some(10));
        assert_eq!(w.absolute(1), Some(11));
        assert_eq!(w.absolute(2), None);
    }
}
