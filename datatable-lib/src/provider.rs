//! Data source traits
//!
//! The table never talks to HTTP directly. It asks a [`ListProvider`] for one
//! page of rows and a [`JsonProvider`] for per-row sub-data. [`ListClient`]
//! implements both against a real endpoint; tests plug in fakes.
//!
//! [`ListClient`]: crate::ListClient

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::response::PageResult;

/// The inputs of one list request.
///
/// Two requests are the same request if all four fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListRequest {
    /// Resource path relative to the provider's base URL (e.g. `/api/users`).
    pub resource: String,
    /// The 1-based page number.
    pub page: usize,
    /// Number of rows per page (`limit` on the wire).
    pub page_size: usize,
    /// The committed search term. Empty means no filter.
    pub search: String,
}

impl ListRequest {
    /// Creates a request for the first page with no search term.
    pub fn new(resource: impl Into<String>, page_size: usize) -> Self {
        Self {
            resource: resource.into(),
            page: 1,
            page_size,
            search: String::new(),
        }
    }

    /// Sets the page number.
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Sets the search term.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

/// A remote source of paginated, searchable rows.
#[async_trait]
pub trait ListProvider<R>: Send + Sync {
    /// Fetches one page of rows.
    async fn list(&self, request: &ListRequest) -> Result<PageResult<R>, Error>;
}

/// A remote source of raw JSON documents, used for on-demand row expansion.
#[async_trait]
pub trait JsonProvider: Send + Sync {
    /// Fetches the JSON body at `url`.
    ///
    /// `url` is either absolute or relative to the provider's base URL.
    async fn get_json(&self, url: &str) -> Result<Value, Error>;
}
