//! Headless data table
//!
//! [`DataTable`] owns the state machine of one table: the query (page, page
//! size, search), the fetched page, the expansion cache and the search
//! debouncer. User inputs go in through its methods; [`DataTable::view`]
//! derives what to draw.
//!
//! # Example
//!
//! ```ignore
//! let client = ListClient::builder().url("http://127.0.0.1:3000").build()?;
//! let config = TableConfig::new("/api/users", columns)
//!     .search(SearchConfig::enabled().with_placeholder("Search users..."));
//!
//! let table: DataTable<Record> = DataTable::mount(config, Arc::new(client));
//! table.set_search_input("doe");
//! table.settled().await;
//!
//! let view = table.view();
//! ```

mod column;
mod config;
mod debounce;
mod expansion;
mod fetcher;
mod pagination;
mod query;
mod render;
mod revision;

#[cfg(test)]
mod testing;

pub use column::*;
pub use config::*;
pub use debounce::*;
pub use expansion::*;
pub use fetcher::*;
pub use pagination::*;
pub use query::*;
pub use render::*;
pub use revision::*;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::Weak;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::model::Row;
use crate::provider::JsonProvider;
use crate::provider::ListProvider;
use crate::response::PageMeta;

/// A mounted data table.
///
/// Cheap to clone; clones share the same state. Dropping the last handle
/// unmounts the table: pending debounce timers and in-flight fetches are
/// abandoned and no state is mutated afterwards.
pub struct DataTable<R, S = ()> {
    inner: Arc<TableInner<R, S>>,
}

impl<R, S> Clone for DataTable<R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct TableInner<R, S> {
    config: TableConfig<R, S>,
    provider: Arc<dyn ListProvider<R>>,
    sub_data: Option<Arc<dyn JsonProvider>>,
    query: Mutex<QueryState>,
    fetcher: TableFetcher<R>,
    expansion: ExpansionManager<S>,
    debouncer: SearchDebouncer,
    revision: Arc<Revision>,
    cancel: CancellationToken,
}

impl<R, S> Drop for TableInner<R, S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<R, S> DataTable<R, S>
where
    R: Row,
    S: Clone + Send + Sync + 'static,
{
    /// Mounts a table and issues the initial load.
    ///
    /// On-demand expansion needs a sub-data provider; see
    /// [`mount_with_sub_data`](Self::mount_with_sub_data). Must be called from
    /// within a tokio runtime.
    pub fn mount(config: TableConfig<R, S>, provider: Arc<dyn ListProvider<R>>) -> Self {
        Self::mount_inner(config, provider, None)
    }

    /// Mounts a table whose on-demand expansions fetch through `sub_data`.
    pub fn mount_with_sub_data(
        config: TableConfig<R, S>,
        provider: Arc<dyn ListProvider<R>>,
        sub_data: Arc<dyn JsonProvider>,
    ) -> Self {
        Self::mount_inner(config, provider, Some(sub_data))
    }

    fn mount_inner(
        config: TableConfig<R, S>,
        provider: Arc<dyn ListProvider<R>>,
        sub_data: Option<Arc<dyn JsonProvider>>,
    ) -> Self {
        let revision = Arc::new(Revision::new());
        let cancel = CancellationToken::new();
        let page_size = if config.pagination.enabled {
            config.pagination.page_size
        } else {
            PaginationConfig::default().page_size
        };

        let inner = Arc::new_cyclic(|weak: &Weak<TableInner<R, S>>| {
            let weak = weak.clone();
            let debouncer =
                SearchDebouncer::new(config.search.debounce, cancel.child_token(), move |text| {
                    if let Some(inner) = weak.upgrade() {
                        inner.commit_search(text);
                    }
                })
                .with_revision(revision.clone());

            TableInner {
                query: Mutex::new(QueryState::new(page_size)),
                fetcher: TableFetcher::new(revision.clone(), cancel.child_token()),
                expansion: ExpansionManager::new(revision.clone(), cancel.child_token()),
                debouncer,
                config,
                provider,
                sub_data,
                revision,
                cancel,
            }
        });

        log::debug!("mounted table for {}", inner.config.resource);
        inner.reload();
        Self { inner }
    }

    /// Returns the table's configuration.
    pub fn config(&self) -> &TableConfig<R, S> {
        &self.inner.config
    }

    /// Records search input. The term is committed once input has been quiet
    /// for the debounce window.
    pub fn set_search_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.lock_query().set_pending_search(text.clone());
        self.inner.revision.bump();
        self.inner.debouncer.input(text);
    }

    /// Jumps to `page` (raised to 1 if 0). Refetches if the page changed.
    pub fn set_page(&self, page: usize) {
        let changed = self.inner.lock_query().set_page(page);
        if changed {
            self.inner.reload();
        }
    }

    /// Goes to the next page if the server reported one.
    pub fn next_page(&self) {
        if !self.meta_flag(|meta| meta.has_next_page) {
            return;
        }
        let page = self.inner.lock_query().page();
        self.set_page(page + 1);
    }

    /// Goes to the previous page if the server reported one.
    pub fn prev_page(&self) {
        if !self.meta_flag(|meta| meta.has_prev_page) {
            return;
        }
        let page = self.inner.lock_query().page();
        self.set_page(page.saturating_sub(1));
    }

    /// Changes the page size and returns to page 1. A size of 0 is ignored.
    pub fn set_page_size(&self, page_size: usize) {
        let changed = self.inner.lock_query().set_page_size(page_size);
        if changed {
            self.inner.reload();
        }
    }

    /// Toggles the row with key `key` on the current page.
    ///
    /// The first expansion of an on-demand row starts its sub-data fetch.
    /// Returns the new expanded state, or `None` if the table has no
    /// expansion, the row is not on the current page, or the row's condition
    /// rules it out.
    pub fn toggle_row(&self, key: &str) -> Option<bool> {
        let config = &self.inner.config;
        let expandable = config.expandable.as_ref()?;

        let row = self.inner.fetcher.with_state(|state| {
            state
                .data
                .iter()
                .enumerate()
                .find(|(index, row)| config.row_key(row, *index) == key)
                .map(|(_, row)| row.clone())
        });
        let Some(row) = row else {
            log::debug!("no row with key {} on the current page", key);
            return None;
        };
        if !expandable.can_expand(&row) {
            return None;
        }

        let expanded = self.inner.expansion.toggle(key);
        if expanded && let ExpansionSource::OnDemand { url, transform } = expandable.source() {
            match &self.inner.sub_data {
                Some(provider) => {
                    self.inner.expansion.ensure_loaded(
                        key,
                        url(&row),
                        provider.clone(),
                        transform.clone(),
                        expandable.retry(),
                    );
                }
                None => {
                    if self.inner.expansion.state(key).is_none() {
                        log::warn!("row {} expanded without a sub-data provider", key);
                        self.inner
                            .expansion
                            .fail(key, "No sub-data provider configured");
                    }
                }
            }
        }
        Some(expanded)
    }

    /// Reissues the current request.
    pub fn refetch(&self) -> Option<JoinHandle<()>> {
        self.inner.fetcher.refetch(self.inner.provider.clone())
    }

    /// Returns a copy of the query state.
    pub fn query(&self) -> QueryState {
        self.inner.lock_query().clone()
    }

    /// Returns a copy of the fetch state.
    pub fn state(&self) -> FetchState<R> {
        self.inner.fetcher.snapshot()
    }

    /// Returns the expansion entry for `key`.
    pub fn expansion_entry(&self, key: &str) -> ExpansionEntry<S> {
        self.inner.expansion.entry(key)
    }

    /// Derives the current view.
    pub fn view(&self) -> TableView<S> {
        let query = self.query();
        let fetch = self.inner.fetcher.snapshot();
        render_table(&self.inner.config, &query, &fetch, &self.inner.expansion)
    }

    /// Returns a receiver notified whenever the table's state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Returns `true` when no fetch, sub-data fetch or debounce timer is
    /// pending.
    pub fn is_idle(&self) -> bool {
        // A commit marks the fetcher loading before the debouncer clears, so
        // the debouncer is read first.
        !self.inner.debouncer.is_pending()
            && !self.inner.fetcher.is_loading()
            && !self.inner.expansion.any_loading()
    }

    /// Waits until the table is idle.
    pub async fn settled(&self) {
        let mut changes = self.subscribe();
        while !self.is_idle() {
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    fn meta_flag(&self, flag: impl FnOnce(&PageMeta) -> bool) -> bool {
        self.inner
            .fetcher
            .with_state(|state| state.meta.as_ref().is_some_and(flag))
    }
}

impl<R, S> TableInner<R, S>
where
    R: Row,
    S: Clone + Send + Sync + 'static,
{
    fn lock_query(&self) -> std::sync::MutexGuard<'_, QueryState> {
        self.query.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reload(&self) -> JoinHandle<()> {
        let request = self.lock_query().to_request(&self.config.resource);
        self.fetcher.load(self.provider.clone(), request)
    }

    fn commit_search(&self, text: String) {
        let changed = self.lock_query().commit_search(text);
        if changed {
            self.reload();
        }
        self.revision.bump();
    }
}
