//! Page slicing over filtered results
//!
//! Pages are 1-indexed. None of these functions fail: out-of-range pages and
//! a zero page size yield an empty page rather than an error, and callers
//! clamp with [`Pager`].

use serde::Serialize;

/// Pagination metadata for a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub limit: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    /// "Page X of Y"
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }
}

/// A visible slice plus its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub visible: &'a [T],
    pub info: PageInfo,
}

impl<T> Page<'_, T> {
    pub fn total_pages(&self) -> usize {
        self.info.total_pages
    }
}

/// `ceil(total_items / page_size)`, zero for an empty list or a zero page size
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Calculate the slice bounds of `page`
///
/// Returns `None` when the page holds no items: page 0, a zero page size, or
/// a page past the end.
pub fn page_bounds(total_items: usize, page: usize, page_size: usize) -> Option<(usize, usize)> {
    if page == 0 || page_size == 0 {
        return None;
    }

    let start = (page - 1).checked_mul(page_size)?;
    if start >= total_items {
        return None;
    }

    let end = start.saturating_add(page_size).min(total_items);
    Some((start, end))
}

/// Slice `results` down to `current_page`
pub fn paginate<T>(results: &[T], page_size: usize, current_page: usize) -> Page<'_, T> {
    let total_items = results.len();
    let total_pages = total_pages(total_items, page_size);

    let visible = match page_bounds(total_items, current_page, page_size) {
        Some((start, end)) => &results[start..end],
        None => &results[0..0],
    };

    Page {
        visible,
        info: PageInfo {
            current_page,
            total_pages,
            total_items,
            limit: page_size,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
        },
    }
}

/// Page cursor kept alongside a filtered result.
///
/// The cursor does not own the results; navigation takes the current result
/// length so that it always clamps against the latest filter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Back to page 1. Called whenever the upstream result changes.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Advance one page; no-op on the last page. Returns whether it moved.
    pub fn next(&mut self, total_items: usize) -> bool {
        if self.current_page < total_pages(total_items, self.page_size) {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; no-op on the first page. Returns whether it moved.
    pub fn previous(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped to `1..=total_pages`
    pub fn go_to(&mut self, page: usize, total_items: usize) {
        let last = total_pages(total_items, self.page_size).max(1);
        self.current_page = page.clamp(1, last);
    }

    pub fn page<'a, T>(&self, results: &'a [T]) -> Page<'a, T> {
        paginate(results, self.page_size, self.current_page)
    }
}
