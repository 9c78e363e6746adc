//! Page arithmetic for task lists.
//!
//! Lists are shown a page at a time. [`page_window`] computes which page
//! numbers a pager shows: all of them when there are at most seven pages,
//! otherwise a compressed window around the current page with
//! [`PageItem::Ellipsis`] standing in for the gaps.

use std::fmt;

/// Default number of tasks per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Largest page count shown without compression.
const MAX_UNCOMPRESSED_PAGES: usize = 7;

/// One entry of a page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// A 1-based page number.
    Page(usize),
    /// A gap of one or more hidden pages.
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Ellipsis => write!(f, "\u{2026}"),
        }
    }
}

/// Number of pages needed for `total_items` at `page_size` per page.
///
/// A zero page size is treated as one.
#[must_use]
pub const fn total_pages(total_items: usize, page_size: usize) -> usize {
    let size = if page_size == 0 { 1 } else { page_size };
    total_items.div_ceil(size)
}

/// Page numbers to display for `current_page` out of `total_pages`.
#[must_use]
pub fn page_window(total_pages: usize, current_page: usize) -> Vec<PageItem> {
    if total_pages <= MAX_UNCOMPRESSED_PAGES {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let mut window = Vec::with_capacity(MAX_UNCOMPRESSED_PAGES);
    if current_page <= 4 {
        window.extend((1..=5).map(PageItem::Page));
        window.push(PageItem::Ellipsis);
        window.push(PageItem::Page(total_pages));
    } else if current_page >= total_pages - 3 {
        window.push(PageItem::Page(1));
        window.push(PageItem::Ellipsis);
        window.extend((total_pages - 4..=total_pages).map(PageItem::Page));
    } else {
        window.push(PageItem::Page(1));
        window.push(PageItem::Ellipsis);
        window.extend((current_page - 1..=current_page + 1).map(PageItem::Page));
        window.push(PageItem::Ellipsis);
        window.push(PageItem::Page(total_pages));
    }
    window
}

/// Pagination state for one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    total_items: usize,
    page_size: usize,
    current_page: usize,
}

impl Pager {
    /// Creates a pager on page 1.
    #[must_use]
    pub const fn new(total_items: usize, page_size: usize) -> Self {
        Self {
            total_items,
            page_size: if page_size == 0 { 1 } else { page_size },
            current_page: 1,
        }
    }

    /// Number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page window for the current page.
    #[must_use]
    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.total_pages(), self.current_page)
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Moves to `page`. Pages outside `1..=total_pages` are rejected and
    /// leave the pager unchanged.
    ///
    /// Returns `true` if the move was accepted.
    pub const fn go_to(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    /// Moves one page back if possible.
    pub const fn previous(&mut self) -> bool {
        self.has_previous() && self.go_to(self.current_page - 1)
    }

    /// Moves one page forward if possible.
    pub const fn next(&mut self) -> bool {
        self.has_next() && self.go_to(self.current_page + 1)
    }

    /// Updates the item count. If the current page no longer exists the
    /// pager returns to page 1.
    pub const fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        let last = self.total_pages();
        let last = if last == 0 { 1 } else { last };
        if self.current_page > last {
            self.current_page = 1;
        }
    }

    /// The items of the current page.
    #[must_use]
    pub fn page_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }
}
