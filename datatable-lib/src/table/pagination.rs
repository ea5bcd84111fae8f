//! Pagination controls

use super::config::PaginationConfig;
use super::query::QueryState;
use crate::response::PageMeta;

/// The derived state of the pagination bar.
///
/// Previous/next are enabled strictly from the server-reported
/// `hasPrevPage`/`hasNextPage` flags, never recomputed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    /// The current page.
    pub page: usize,
    /// Total pages reported by the server (at least 1).
    pub total_pages: usize,
    /// Total matching rows reported by the server.
    pub total: usize,
    /// The selected page size.
    pub page_size: usize,
    /// Choices offered by the page-size selector.
    pub page_size_options: Vec<usize>,
    /// Whether the previous-page button is enabled.
    pub prev_enabled: bool,
    /// Whether the next-page button is enabled.
    pub next_enabled: bool,
}

impl PaginationView {
    /// Derives the controls. Returns `None` when pagination is disabled or no
    /// metadata has been loaded yet.
    pub fn derive(
        config: &PaginationConfig,
        query: &QueryState,
        meta: Option<&PageMeta>,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let meta = meta?;

        Some(Self {
            page: query.page(),
            total_pages: meta.total_pages.max(1),
            total: meta.total,
            page_size: query.page_size(),
            page_size_options: config.page_size_options.clone(),
            prev_enabled: meta.has_prev_page,
            next_enabled: meta.has_next_page,
        })
    }

    /// The "Page x of y" label.
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}
