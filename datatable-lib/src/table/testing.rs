//! In-memory providers for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::error::Error;
use crate::model::Record;
use crate::provider::JsonProvider;
use crate::provider::ListProvider;
use crate::provider::ListRequest;
use crate::response::PageMeta;
use crate::response::PageResult;

const NAMES: &[&str] = &[
    "Jane Doe",
    "John Smith",
    "Alice Johnson",
    "Bob Doe",
    "Carol White",
    "David Brown",
    "Eve Davis",
    "Frank Miller",
    "Grace Lee",
    "Henry Wilson",
];

/// A user list that filters and paginates like the mock server.
pub(crate) struct FakeUsers {
    users: Vec<Record>,
    delays: Vec<(String, Duration)>,
    default_delay: Duration,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ListRequest>>,
}

impl FakeUsers {
    /// `count` users; user `i` has `i % 4` tasks, so the first user has none.
    pub(crate) fn sample(count: usize) -> Self {
        let users = (0..count)
            .map(|i| {
                let name = NAMES[i % NAMES.len()];
                let first = name.split(' ').next().unwrap_or(name).to_lowercase();
                let username = format!("{}{}", first, i + 1);
                Record::new()
                    .set("id", i as u64 + 1)
                    .set("name", name)
                    .set("email", format!("{}@example.com", username))
                    .set("username", username)
                    .set("totalTasks", (i % 4) as u64)
            })
            .collect();

        Self {
            users,
            delays: Vec::new(),
            default_delay: Duration::from_millis(10),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests searching for exactly `search` take `delay`.
    pub(crate) fn delay_for(mut self, search: &str, delay: Duration) -> Self {
        self.delays.push((search.to_string(), delay));
        self
    }

    /// Makes subsequent requests fail with an envelope error.
    pub(crate) fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListProvider<Record> for FakeUsers {
    async fn list(&self, request: &ListRequest) -> Result<PageResult<Record>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let delay = self
            .delays
            .iter()
            .find(|(search, _)| *search == request.search)
            .map(|(_, delay)| *delay)
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(ApiError::Envelope(message).into());
        }

        let needle = request.search.to_lowercase();
        let matching: Vec<Record> = self
            .users
            .iter()
            .filter(|user| {
                needle.is_empty()
                    || ["name", "email", "username"].iter().any(|key| {
                        user.get_str(key)
                            .is_some_and(|value| value.to_lowercase().contains(&needle))
                    })
            })
            .cloned()
            .collect();

        let meta = PageMeta::compute(matching.len(), request.page, request.page_size);
        let items = matching[meta.item_range()].to_vec();
        Ok(PageResult::new(items, meta))
    }
}

/// Canned JSON responses keyed by URL.
#[derive(Default)]
pub(crate) struct FakeJson {
    responses: HashMap<String, (Duration, Result<Value, String>)>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeJson {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ok(mut self, url: &str, delay: Duration, value: Value) -> Self {
        self.responses.insert(url.to_string(), (delay, Ok(value)));
        self
    }

    /// `url` answers with a 500 carrying `message`.
    pub(crate) fn fail(mut self, url: &str, delay: Duration, message: &str) -> Self {
        self.responses
            .insert(url.to_string(), (delay, Err(message.to_string())));
        self
    }

    pub(crate) fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl JsonProvider for FakeJson {
    async fn get_json(&self, url: &str) -> Result<Value, Error> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let Some((delay, result)) = self.responses.get(url).cloned() else {
            return Err(ApiError::http(404, "User not found").into());
        };
        tokio::time::sleep(delay).await;
        result.map_err(|message| ApiError::http(500, message).into())
    }
}
