//! Row expansion
//!
//! Expanded rows show a nested region with sub-data. Sub-data is either
//! already embedded in the row ([`ExpansionSource::Preloaded`]) or fetched the
//! first time a row is opened ([`ExpansionSource::OnDemand`]) and cached per
//! key for the lifetime of the table. Collapsing never evicts the cache.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::revision::Revision;
use crate::model::Row;
use crate::provider::JsonProvider;

/// Decides per row whether it can expand at all.
pub type RowPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Derives the cache key for a row.
pub type CacheKeyFn<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Extracts embedded sub-data from a row.
pub type ExtractFn<R, S> = Arc<dyn Fn(&R) -> Option<S> + Send + Sync>;

/// Builds the sub-data URL for a row.
pub type UrlFn<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Maps a raw JSON response to sub-data.
pub type TransformFn<S> = Arc<dyn Fn(Value) -> Result<S, String> + Send + Sync>;

/// Where a row's sub-data comes from.
pub enum ExpansionSource<R, S> {
    /// Sub-data is already present on the row. Toggling only affects visibility.
    Preloaded(ExtractFn<R, S>),
    /// Sub-data is fetched from a row-derived URL on first expansion.
    OnDemand {
        url: UrlFn<R>,
        transform: TransformFn<S>,
    },
}

impl<R, S> Clone for ExpansionSource<R, S> {
    fn clone(&self) -> Self {
        match self {
            Self::Preloaded(extract) => Self::Preloaded(extract.clone()),
            Self::OnDemand { url, transform } => Self::OnDemand {
                url: url.clone(),
                transform: transform.clone(),
            },
        }
    }
}

/// What happens when a row whose on-demand fetch failed is expanded again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Show the cached error again without refetching.
    #[default]
    ReplayError,
    /// Drop the cached error and fetch again.
    RetryOnExpand,
}

/// Row expansion settings.
///
/// # Example
///
/// ```ignore
/// let expandable =
///     ExpandableConfig::on_demand(|user: &User| format!("/api/users/{}/tasks", user.id))
///         .condition(|user| user.total_tasks > 0)
///         .cache_key(|user| format!("user-{}-tasks", user.id));
/// ```
pub struct ExpandableConfig<R, S> {
    condition: Option<RowPredicate<R>>,
    source: ExpansionSource<R, S>,
    cache_key: Option<CacheKeyFn<R>>,
    retry: RetryPolicy,
}

impl<R: Row, S: Send + Sync + 'static> ExpandableConfig<R, S> {
    /// Expansion that shows sub-data already embedded in the row.
    pub fn preloaded<F>(extract: F) -> Self
    where
        F: Fn(&R) -> Option<S> + Send + Sync + 'static,
    {
        Self {
            condition: None,
            source: ExpansionSource::Preloaded(Arc::new(extract)),
            cache_key: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Expansion that fetches sub-data from `url(row)` on first expansion.
    ///
    /// The response is deserialized into `S`; use
    /// [`transform`](Self::transform) to map it differently.
    pub fn on_demand<F>(url: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
        S: DeserializeOwned,
    {
        Self {
            condition: None,
            source: ExpansionSource::OnDemand {
                url: Arc::new(url),
                transform: Arc::new(|value: Value| -> Result<S, String> {
                    serde_json::from_value(value).map_err(|e| e.to_string())
                }),
            },
            cache_key: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the predicate deciding which rows can expand.
    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Sets the cache-key function. Defaults to the row's id field.
    pub fn cache_key<F>(mut self, cache_key: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.cache_key = Some(Arc::new(cache_key));
        self
    }

    /// Sets the response transform for on-demand expansion.
    ///
    /// Has no effect on preloaded expansion.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Result<S, String> + Send + Sync + 'static,
    {
        if let ExpansionSource::OnDemand { transform: current, .. } = &mut self.source {
            *current = Arc::new(transform);
        }
        self
    }

    /// Sets the retry policy for failed on-demand fetches.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl<R, S> ExpandableConfig<R, S> {
    /// Returns `true` if `row` passes the expansion predicate.
    pub fn can_expand(&self, row: &R) -> bool {
        self.condition.as_ref().is_none_or(|condition| condition(row))
    }

    /// Returns the custom cache key for `row`, if a key function is set.
    pub fn cache_key_for(&self, row: &R) -> Option<String> {
        self.cache_key.as_ref().map(|key| key(row))
    }

    /// Returns the sub-data source.
    pub fn source(&self) -> &ExpansionSource<R, S> {
        &self.source
    }

    /// Returns the retry policy.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns `true` if sub-data is fetched on demand.
    pub fn is_on_demand(&self) -> bool {
        matches!(self.source, ExpansionSource::OnDemand { .. })
    }
}

/// The cached fetch state of one key.
#[derive(Debug, Clone, PartialEq)]
pub enum SubDataState<S> {
    /// A fetch is in flight.
    Loading,
    /// Sub-data was fetched.
    Ready(S),
    /// The fetch failed with this message.
    Failed(String),
}

/// Expansion state of one key, as seen by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionEntry<S> {
    pub expanded: bool,
    pub sub_data: Option<S>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Tracks expanded rows and the per-key sub-data cache.
///
/// The cache is owned here and mutated only by fetches this manager starts;
/// the renderer reads it through [`entry`](ExpansionManager::entry).
pub struct ExpansionManager<S> {
    expanded: Mutex<HashSet<String>>,
    store: Arc<DashMap<String, SubDataState<S>>>,
    revision: Arc<Revision>,
    cancel: CancellationToken,
}

impl<S: Clone + Send + Sync + 'static> ExpansionManager<S> {
    /// Creates a manager. Fetches stop when `cancel` fires.
    pub fn new(revision: Arc<Revision>, cancel: CancellationToken) -> Self {
        Self {
            expanded: Mutex::new(HashSet::new()),
            store: Arc::new(DashMap::new()),
            revision,
            cancel,
        }
    }

    /// Flips `key` in the expanded set. Returns the new state.
    pub fn toggle(&self, key: &str) -> bool {
        let expanded = {
            let mut set = self.expanded.lock().unwrap_or_else(|e| e.into_inner());
            if set.remove(key) {
                false
            } else {
                set.insert(key.to_string());
                true
            }
        };
        self.revision.bump();
        expanded
    }

    /// Returns `true` if `key` is expanded.
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    /// Starts the fetch for `key` unless it is cached or already in flight.
    ///
    /// A cached failure is only refetched under [`RetryPolicy::RetryOnExpand`].
    /// Returns the handle of the spawned fetch, if one was started. Must be
    /// called from within a tokio runtime.
    pub fn ensure_loaded(
        &self,
        key: &str,
        url: String,
        provider: Arc<dyn JsonProvider>,
        transform: TransformFn<S>,
        retry: RetryPolicy,
    ) -> Option<JoinHandle<()>> {
        let start = match self.store.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(SubDataState::Loading);
                true
            }
            Entry::Occupied(mut occupied) => {
                let retry_failed = retry == RetryPolicy::RetryOnExpand
                    && matches!(occupied.get(), SubDataState::Failed(_));
                if retry_failed {
                    occupied.insert(SubDataState::Loading);
                }
                retry_failed
            }
        };

        if !start {
            log::debug!("sub-data for {} already cached or in flight", key);
            return None;
        }
        self.revision.bump();
        log::debug!("fetching sub-data for {} from {}", key, url);

        let key = key.to_string();
        let store = self.store.clone();
        let revision = self.revision.clone();
        let cancel = self.cancel.clone();

        Some(tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                result = provider.get_json(&url) => result,
            };

            let state = match result.map_err(|e| e.to_string()).and_then(|value| transform(value)) {
                Ok(sub_data) => SubDataState::Ready(sub_data),
                Err(message) => {
                    log::warn!("sub-data fetch for {} failed: {}", key, message);
                    SubDataState::Failed(message)
                }
            };
            store.insert(key, state);
            revision.bump();
        }))
    }

    /// Records a failure for `key` without fetching.
    pub fn fail(&self, key: &str, message: impl Into<String>) {
        self.store
            .insert(key.to_string(), SubDataState::Failed(message.into()));
        self.revision.bump();
    }

    /// Returns the cached state for `key`.
    pub fn state(&self, key: &str) -> Option<SubDataState<S>> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the expansion entry for `key`.
    pub fn entry(&self, key: &str) -> ExpansionEntry<S> {
        let expanded = self.is_expanded(key);
        match self.state(key) {
            None => ExpansionEntry {
                expanded,
                sub_data: None,
                loading: false,
                error: None,
            },
            Some(SubDataState::Loading) => ExpansionEntry {
                expanded,
                sub_data: None,
                loading: true,
                error: None,
            },
            Some(SubDataState::Ready(sub_data)) => ExpansionEntry {
                expanded,
                sub_data: Some(sub_data),
                loading: false,
                error: None,
            },
            Some(SubDataState::Failed(error)) => ExpansionEntry {
                expanded,
                sub_data: None,
                loading: false,
                error: Some(error),
            },
        }
    }

    /// Returns `true` if any fetch is in flight.
    pub fn any_loading(&self) -> bool {
        self.store
            .iter()
            .any(|entry| matches!(entry.value(), SubDataState::Loading))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::model::Record;
    use crate::table::testing::FakeJson;

    type Tasks = Vec<Value>;

    fn manager() -> ExpansionManager<Tasks> {
        ExpansionManager::new(Arc::new(Revision::new()), CancellationToken::new())
    }

    fn identity() -> TransformFn<Tasks> {
        Arc::new(|value: Value| -> Result<Tasks, String> {
            serde_json::from_value(value).map_err(|e| e.to_string())
        })
    }

    /// Loads `/users/{key}/tasks` for `key`.
    fn load(
        manager: &ExpansionManager<Tasks>,
        key: &str,
        provider: &Arc<FakeJson>,
        retry: RetryPolicy,
    ) -> Option<JoinHandle<()>> {
        let url = format!("/users/{}/tasks", key);
        manager.ensure_loaded(key, url, provider.clone(), identity(), retry)
    }

    #[test]
    fn test_toggle_flips_membership() {
        let manager = manager();
        assert!(manager.toggle("1"));
        assert!(manager.is_expanded("1"));
        assert!(!manager.toggle("1"));
        assert!(!manager.is_expanded("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_fetch_per_key() {
        let provider = Arc::new(FakeJson::new().ok(
            "/users/1/tasks",
            Duration::from_millis(100),
            json!([{"id": 1}]),
        ));
        let manager = manager();

        let first = load(&manager, "1", &provider, RetryPolicy::default());
        let second = load(&manager, "1", &provider, RetryPolicy::default());
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(manager.entry("1").loading);

        first.unwrap().await.unwrap();
        assert!(load(&manager, "1", &provider, RetryPolicy::default()).is_none());

        assert_eq!(provider.calls_for("/users/1/tasks"), 1);
        assert_eq!(manager.entry("1").sub_data, Some(vec![json!({"id": 1})]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_fetch_independently() {
        let provider = Arc::new(
            FakeJson::new()
                .ok("/users/1/tasks", Duration::from_secs(5), json!([{"id": 1}]))
                .ok("/users/2/tasks", Duration::from_millis(50), json!([{"id": 2}])),
        );
        let manager = manager();

        let slow = load(&manager, "1", &provider, RetryPolicy::default()).unwrap();
        let fast = load(&manager, "2", &provider, RetryPolicy::default()).unwrap();

        fast.await.unwrap();
        assert_eq!(manager.entry("2").sub_data, Some(vec![json!({"id": 2})]));
        assert!(manager.entry("1").loading);

        slow.await.unwrap();
        assert_eq!(manager.entry("1").sub_data, Some(vec![json!({"id": 1})]));
        assert_eq!(manager.entry("2").sub_data, Some(vec![json!({"id": 2})]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_replayed() {
        let provider = Arc::new(FakeJson::new().fail(
            "/users/3/tasks",
            Duration::from_millis(10),
            "Failed to fetch tasks",
        ));
        let manager = manager();

        load(&manager, "3", &provider, RetryPolicy::ReplayError)
            .unwrap()
            .await
            .unwrap();
        assert!(load(&manager, "3", &provider, RetryPolicy::ReplayError).is_none());

        let entry = manager.entry("3");
        assert_eq!(entry.error.as_deref(), Some("HTTP 500: Failed to fetch tasks"));
        assert_eq!(provider.calls_for("/users/3/tasks"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_retried_when_configured() {
        let provider = Arc::new(FakeJson::new().fail(
            "/users/3/tasks",
            Duration::from_millis(10),
            "Failed to fetch tasks",
        ));
        let manager = manager();

        for _ in 0..2 {
            load(&manager, "3", &provider, RetryPolicy::RetryOnExpand)
                .unwrap()
                .await
                .unwrap();
        }
        assert_eq!(provider.calls_for("/users/3/tasks"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transform_error_is_recorded() {
        let provider = Arc::new(FakeJson::new().ok(
            "/users/4/tasks",
            Duration::from_millis(10),
            json!({"not": "a list"}),
        ));
        let manager = manager();

        load(&manager, "4", &provider, RetryPolicy::default())
            .unwrap()
            .await
            .unwrap();
        assert!(manager.entry("4").error.is_some());
    }

    #[test]
    fn test_condition_and_cache_key() {
        let config: ExpandableConfig<Record, Tasks> = ExpandableConfig::on_demand(|row: &Record| {
            format!("/users/{}/tasks", row.get_i64("id").unwrap_or(0))
        })
        .condition(|row| row.get_i64("totalTasks").unwrap_or(0) > 0)
        .cache_key(|row| format!("user-{}-tasks", row.get_i64("id").unwrap_or(0)));

        let empty = Record::new().set("id", 1).set("totalTasks", 0);
        let busy = Record::new().set("id", 2).set("totalTasks", 3);

        assert!(config.is_on_demand());
        assert!(!config.can_expand(&empty));
        assert!(config.can_expand(&busy));
        assert_eq!(config.cache_key_for(&busy).as_deref(), Some("user-2-tasks"));
    }
}
