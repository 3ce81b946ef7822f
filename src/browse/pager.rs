use crate::catalog::MovieList;

/// Requested page plus the last page count the server reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    total_pages: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 0,
        }
    }
}

impl Pager {
    pub fn at(page: u32) -> Self {
        Self {
            page: page.max(1),
            total_pages: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Records the page count once a response has landed. A failed list
    /// has no pages to move through, even with earlier data still cached.
    pub fn observe(&mut self, list: &MovieList) {
        if list.error.is_some() {
            self.total_pages = 0;
        } else if !list.is_loading {
            self.total_pages = list.total_pages;
        }
    }

    /// Paging is disabled until the current page has landed.
    pub fn is_live(&self) -> bool {
        self.total_pages > 0
    }

    pub fn has_prev(&self) -> bool {
        self.is_live() && self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// No-op on the last page; returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }
}

/// Pagination controls: the server's page number, buttons driven by the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PaginationView {
    /// `None` while loading, for an empty page, or when there is a single page.
    pub fn new(pager: &Pager, list: &MovieList) -> Option<Self> {
        if list.is_loading || list.movies.is_empty() || list.total_pages <= 1 {
            return None;
        }
        Some(Self {
            current_page: list.current_page,
            total_pages: list.total_pages,
            has_prev: pager.has_prev(),
            has_next: pager.page() < list.total_pages,
        })
    }
}
