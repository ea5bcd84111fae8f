//! Wire envelope and paginated results

use serde::Deserialize;
use serde::Serialize;

/// The JSON envelope every list endpoint answers with.
///
/// Successful responses carry `data` and usually `meta`; failures carry
/// `success: false` and an `error` message.
///
/// ```
/// use datatable_lib::Envelope;
///
/// let json = r#"{"success": false, "error": "Failed to fetch users"}"#;
/// let envelope: Envelope<Vec<serde_json::Value>> = serde_json::from_str(json).unwrap();
/// assert!(!envelope.success);
/// assert_eq!(envelope.error.as_deref(), Some("Failed to fetch users"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    #[serde(default)]
    pub success: bool,
    /// The payload. Absent on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Pagination metadata for list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Creates a successful envelope.
    pub fn ok(data: T, meta: Option<PageMeta>) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta,
            error: None,
        }
    }

    /// Creates a failed envelope.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            meta: None,
            error: Some(error.into()),
        }
    }
}

/// Pagination metadata for one page of a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of matching items across all pages.
    pub total: usize,
    /// The 1-based page number.
    pub page: usize,
    /// The page size the server used.
    pub limit: usize,
    /// `ceil(total / limit)`.
    pub total_pages: usize,
    /// `page * limit < total`.
    pub has_next_page: bool,
    /// `page > 1`.
    pub has_prev_page: bool,
}

impl PageMeta {
    /// Computes metadata for `page` of a result set of `total` items.
    ///
    /// ```
    /// use datatable_lib::PageMeta;
    ///
    /// let meta = PageMeta::compute(15, 2, 10);
    /// assert_eq!(meta.total_pages, 2);
    /// assert!(!meta.has_next_page);
    /// assert!(meta.has_prev_page);
    /// ```
    pub fn compute(total: usize, page: usize, limit: usize) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next_page: page.saturating_mul(limit) < total,
            has_prev_page: page > 1,
        }
    }

    /// Returns `true` if this metadata agrees with [`PageMeta::compute`].
    ///
    /// The table always trusts the server's flags; this is only used to warn
    /// when the backend's arithmetic drifts from the formula.
    pub fn is_consistent(&self) -> bool {
        *self == Self::compute(self.total, self.page, self.limit)
    }

    /// Returns the range of item indices this page covers, clamped to `total`.
    pub fn item_range(&self) -> std::ops::Range<usize> {
        let start = self.page.saturating_sub(1).saturating_mul(self.limit).min(self.total);
        let end = start.saturating_add(self.limit).min(self.total);
        start..end
    }
}

/// One fetched page of rows plus its pagination metadata.
///
/// `meta` is optional on the wire; without it the table hides its pagination
/// controls.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<R> {
    /// The rows of this page, in server order.
    pub items: Vec<R>,
    /// Pagination metadata for this page.
    pub meta: Option<PageMeta>,
}

impl<R> PageResult<R> {
    /// Creates a new page result.
    pub fn new(items: Vec<R>, meta: PageMeta) -> Self {
        Self {
            items,
            meta: Some(meta),
        }
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
