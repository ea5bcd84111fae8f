//! Query state

use crate::provider::ListRequest;

/// The user-controlled inputs of a table: page, page size and search.
///
/// `pending_search` follows every keystroke; `committed_search` only changes
/// when the debounce window elapses. Changing the committed search or the
/// page size resets the page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page: usize,
    page_size: usize,
    committed_search: String,
    pending_search: String,
}

impl QueryState {
    /// Creates a query on page 1 with no search term.
    ///
    /// A page size of 0 is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            committed_search: String::new(),
            pending_search: String::new(),
        }
    }

    /// The current 1-based page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// The current page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The search term the data was fetched with.
    pub fn committed_search(&self) -> &str {
        &self.committed_search
    }

    /// The raw text in the search box.
    pub fn pending_search(&self) -> &str {
        &self.pending_search
    }

    /// Moves to `page` (clamped to 1). Returns `true` if the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        let page = page.max(1);
        let changed = self.page != page;
        self.page = page;
        changed
    }

    /// Changes the page size and resets to page 1.
    ///
    /// A size of 0 is rejected. Returns `true` if page or size changed.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if page_size == 0 {
            return false;
        }
        let changed = self.page_size != page_size || self.page != 1;
        self.page_size = page_size;
        self.page = 1;
        changed
    }

    /// Records a keystroke in the search box.
    pub fn set_pending_search(&mut self, text: impl Into<String>) {
        self.pending_search = text.into();
    }

    /// Commits a search term and resets to page 1.
    ///
    /// Returns `true` if the term or the page changed.
    pub fn commit_search(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let changed = self.committed_search != text || self.page != 1;
        self.committed_search = text;
        self.page = 1;
        changed
    }

    /// Builds the list request for `resource`.
    pub fn to_request(&self, resource: &str) -> ListRequest {
        ListRequest {
            resource: resource.to_string(),
            page: self.page,
            page_size: self.page_size,
            search: self.committed_search.clone(),
        }
    }
}
