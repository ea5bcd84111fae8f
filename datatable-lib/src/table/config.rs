//! Table configuration

use std::sync::Arc;
use std::time::Duration;

use super::column::Alignment;
use super::column::Column;
use super::expansion::ExpandableConfig;
use crate::model::Row;

/// Produces the action button labels for a row.
pub type ActionsFn<R> = Arc<dyn Fn(&R) -> Vec<String> + Send + Sync>;

/// Pagination settings.
///
/// # Example
///
/// ```
/// use datatable_lib::table::PaginationConfig;
///
/// let config = PaginationConfig::default()
///     .with_page_size(10)
///     .with_page_size_options([5, 10, 15, 20]);
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Whether the pagination controls are shown.
    ///
    /// Default: `true`
    pub enabled: bool,

    /// Initial page size.
    ///
    /// Default: 15
    pub page_size: usize,

    /// Choices offered by the page-size selector.
    ///
    /// Default: 5, 10, 15, 25
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: 15,
            page_size_options: vec![5, 10, 15, 25],
        }
    }
}

impl PaginationConfig {
    /// Creates a pagination config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with the controls hidden.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the initial page size.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the page-size choices.
    pub fn with_page_size_options(mut self, options: impl IntoIterator<Item = usize>) -> Self {
        self.page_size_options = options.into_iter().collect();
        self
    }
}

/// Search box settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Whether the search box is shown.
    ///
    /// Default: `false`
    pub enabled: bool,

    /// Placeholder text for the search box.
    pub placeholder: Option<String>,

    /// Quiet period before a search term is committed.
    ///
    /// Default: 300 ms
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            placeholder: None,
            debounce: Duration::from_millis(300),
        }
    }
}

impl SearchConfig {
    /// Creates an enabled search config with the default debounce.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Everything a [`DataTable`](super::DataTable) needs to know about its shape.
///
/// `R` is the row type and `S` the expanded sub-data type. Tables without
/// expansion can leave `S` as `()`.
pub struct TableConfig<R, S = ()> {
    /// Resource path of the list endpoint (e.g. `/api/users`).
    pub resource: String,
    /// Optional title shown above the table.
    pub title: Option<String>,
    /// Column descriptors, in display order.
    pub columns: Vec<Column<R>>,
    /// Row expansion settings. `None` disables expansion.
    pub expandable: Option<ExpandableConfig<R, S>>,
    /// Pagination settings.
    pub pagination: PaginationConfig,
    /// Search settings.
    pub search: SearchConfig,
    /// Action buttons per row. `None` hides the actions column.
    pub actions: Option<ActionsFn<R>>,
    /// Whether even rows are striped.
    pub striped: bool,
    /// Alignment for columns without an override.
    pub default_align: Alignment,
    /// Message shown when the result set is empty.
    pub empty_message: String,
    /// Number of skeleton rows shown while loading.
    pub loading_rows: usize,
}

impl<R: Row, S> TableConfig<R, S> {
    /// Creates a config for `resource` with the given columns and defaults
    /// for everything else.
    pub fn new(resource: impl Into<String>, columns: Vec<Column<R>>) -> Self {
        Self {
            resource: resource.into(),
            title: None,
            columns,
            expandable: None,
            pagination: PaginationConfig::default(),
            search: SearchConfig::default(),
            actions: None,
            striped: false,
            default_align: Alignment::Left,
            empty_message: "No data available".to_string(),
            loading_rows: 5,
        }
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enables row expansion.
    pub fn expandable(mut self, expandable: ExpandableConfig<R, S>) -> Self {
        self.expandable = Some(expandable);
        self
    }

    /// Sets the pagination config.
    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Sets the search config.
    pub fn search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Sets the per-row actions.
    pub fn actions<F>(mut self, actions: F) -> Self
    where
        F: Fn(&R) -> Vec<String> + Send + Sync + 'static,
    {
        self.actions = Some(Arc::new(actions));
        self
    }

    /// Enables or disables row striping.
    pub fn striped(mut self, striped: bool) -> Self {
        self.striped = striped;
        self
    }

    /// Sets the default column alignment.
    pub fn default_align(mut self, align: Alignment) -> Self {
        self.default_align = align;
        self
    }

    /// Sets the empty-state message.
    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    /// Sets the number of skeleton rows shown while loading.
    pub fn loading_rows(mut self, rows: usize) -> Self {
        self.loading_rows = rows;
        self
    }

    /// Returns the key identifying `row` for keying and expansion.
    ///
    /// Uses the expansion cache-key function if set, else the row's id field,
    /// else its index on the page.
    pub fn row_key(&self, row: &R, index: usize) -> String {
        if let Some(key) = self.expandable.as_ref().and_then(|e| e.cache_key_for(row)) {
            return key;
        }
        row.id().unwrap_or_else(|| index.to_string())
    }

    /// Returns the number of grid columns including toggle and actions.
    pub fn column_span(&self) -> usize {
        self.columns.len()
            + usize::from(self.expandable.is_some())
            + usize::from(self.actions.is_some())
    }
}
