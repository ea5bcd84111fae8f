//! Table data fetcher

use std::sync::Arc;
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::revision::Revision;
use crate::provider::ListProvider;
use crate::provider::ListRequest;
use crate::response::PageMeta;

/// The fetch lifecycle of the current page.
#[derive(Debug, Clone)]
pub struct FetchState<R> {
    /// Rows of the last successfully loaded page.
    pub data: Vec<R>,
    /// Whether a request is in flight.
    pub is_loading: bool,
    /// Message of the last failed request.
    pub error: Option<String>,
    /// Pagination metadata of the current page. Cleared when a load fails.
    pub meta: Option<PageMeta>,
}

impl<R> Default for FetchState<R> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            is_loading: false,
            error: None,
            meta: None,
        }
    }
}

struct FetcherInner<R> {
    state: FetchState<R>,
    /// Sequence number of the latest issued request.
    sequence: u64,
    last_request: Option<ListRequest>,
}

/// Owns the fetch lifecycle for one table.
///
/// Each [`load`](TableFetcher::load) supersedes the previous one: responses
/// are tagged with the sequence number of their request and applied only if
/// no newer request has been issued since. The sequence is bumped and checked
/// under the same lock, so a stale response can never land after a newer
/// request started.
pub struct TableFetcher<R> {
    inner: Arc<Mutex<FetcherInner<R>>>,
    revision: Arc<Revision>,
    cancel: CancellationToken,
}

impl<R: Clone + Send + 'static> TableFetcher<R> {
    /// Creates an idle fetcher. Spawned requests stop when `cancel` fires.
    pub fn new(revision: Arc<Revision>, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FetcherInner {
                state: FetchState::default(),
                sequence: 0,
                last_request: None,
            })),
            revision,
            cancel,
        }
    }

    /// Issues `request`, superseding any request still in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&self, provider: Arc<dyn ListProvider<R>>, request: ListRequest) -> JoinHandle<()> {
        let sequence = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.sequence += 1;
            inner.state.is_loading = true;
            inner.state.error = None;
            inner.last_request = Some(request.clone());
            inner.sequence
        };
        self.revision.bump();

        log::debug!(
            "loading {} page={} limit={} search={:?} (#{})",
            request.resource,
            request.page,
            request.page_size,
            request.search,
            sequence
        );

        let inner = self.inner.clone();
        let revision = self.revision.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                result = provider.list(&request) => result,
            };

            {
                let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
                if inner.sequence != sequence {
                    log::debug!(
                        "discarding stale response #{} (latest #{})",
                        sequence,
                        inner.sequence
                    );
                    return;
                }

                let state = &mut inner.state;
                match result {
                    Ok(page) => {
                        state.data = page.items;
                        state.meta = page.meta;
                        state.error = None;
                    }
                    Err(e) => {
                        log::warn!("failed to load {}: {}", request.resource, e);
                        state.data.clear();
                        state.meta = None;
                        state.error = Some(e.to_string());
                    }
                }
                state.is_loading = false;
            }
            revision.bump();
        })
    }

    /// Reissues the last request, if any.
    pub fn refetch(&self, provider: Arc<dyn ListProvider<R>>) -> Option<JoinHandle<()>> {
        let request = self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_request
            .clone()?;
        Some(self.load(provider, request))
    }

    /// Returns a copy of the current fetch state.
    pub fn snapshot(&self) -> FetchState<R> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state
            .clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn with_state<T>(&self, f: impl FnOnce(&FetchState<R>) -> T) -> T {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&inner.state)
    }

    /// Returns `true` while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.with_state(|state| state.is_loading)
    }

    /// Returns the last issued request.
    pub fn last_request(&self) -> Option<ListRequest> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_request
            .clone()
    }
}
