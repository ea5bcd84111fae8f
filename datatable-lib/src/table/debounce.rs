//! Search debouncer

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::revision::Revision;

/// Called with the final text once input has been quiet for the delay.
pub type CommitFn = Arc<dyn Fn(String) + Send + Sync>;

struct Pending {
    generation: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct Timer {
    generation: u64,
    pending: Option<Pending>,
}

impl Timer {
    fn is_current(&self, generation: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
    }
}

/// Trailing-edge debouncer for search input.
///
/// Every [`input`](SearchDebouncer::input) restarts the timer; when it
/// elapses without further input the callback receives the last text. There
/// is no leading edge and no max-wait cap.
///
/// The debouncer stays pending until the callback has returned, so anything
/// the callback starts is visible before [`is_pending`](Self::is_pending)
/// turns false.
///
/// Dropping the debouncer cancels the pending timer, so no callback can fire
/// after teardown.
pub struct SearchDebouncer {
    delay: Duration,
    on_commit: CommitFn,
    timer: Arc<Mutex<Timer>>,
    parent: CancellationToken,
    revision: Option<Arc<Revision>>,
}

impl SearchDebouncer {
    /// Creates a debouncer. Timers also stop when `parent` is cancelled.
    pub fn new<F>(delay: Duration, parent: CancellationToken, on_commit: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            delay,
            on_commit: Arc::new(on_commit),
            timer: Arc::new(Mutex::new(Timer::default())),
            parent,
            revision: None,
        }
    }

    /// Bumps `revision` once a commit has finished.
    pub fn with_revision(mut self, revision: Arc<Revision>) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Returns the debounce window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records new input and restarts the timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn input(&self, text: impl Into<String>) {
        let text = text.into();
        let token = self.parent.child_token();

        let (generation, previous) = {
            let mut timer = self.lock_timer();
            timer.generation += 1;
            let generation = timer.generation;
            let previous = timer.pending.replace(Pending {
                generation,
                token: token.clone(),
            });
            (generation, previous)
        };
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        let delay = self.delay;
        let timer = self.timer.clone();
        let on_commit = self.on_commit.clone();
        let revision = self.revision.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            if !timer.lock().unwrap_or_else(|e| e.into_inner()).is_current(generation) {
                return;
            }

            log::debug!("committing search {:?}", text);
            on_commit(text);

            {
                let mut timer = timer.lock().unwrap_or_else(|e| e.into_inner());
                if timer.is_current(generation) {
                    timer.pending = None;
                }
            }
            if let Some(revision) = revision {
                revision.bump();
            }
        });
    }

    /// Returns `true` while a timer is running or its commit is in progress.
    pub fn is_pending(&self) -> bool {
        self.lock_timer().pending.is_some()
    }

    /// Cancels the pending timer, if any.
    pub fn cancel(&self) {
        let pending = self.lock_timer().pending.take();
        if let Some(pending) = pending {
            pending.token.cancel();
        }
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Timer> {
        self.timer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + Sync + 'static) {
        let commits = Arc::new(Mutex::new(Vec::new()));
        let sink = commits.clone();
        (commits, move |text| sink.lock().unwrap().push(text))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_commit_once() {
        let (commits, on_commit) = recorder();
        let debouncer =
            SearchDebouncer::new(Duration::from_millis(300), CancellationToken::new(), on_commit);

        for text in ["d", "do", "doe"] {
            debouncer.input(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(commits.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(*commits.lock().unwrap(), ["doe"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_quiet_period_commits() {
        let (commits, on_commit) = recorder();
        let debouncer =
            SearchDebouncer::new(Duration::from_millis(300), CancellationToken::new(), on_commit);

        debouncer.input("jane");
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.input("john");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*commits.lock().unwrap(), ["jane", "john"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_until_commit_returns() {
        let seen = Arc::new(Mutex::new(None));
        let timer: Arc<Mutex<Option<Arc<Mutex<Timer>>>>> = Arc::new(Mutex::new(None));
        let (sink, shared_timer) = (seen.clone(), timer.clone());
        let revision = Arc::new(Revision::new());
        let debouncer = SearchDebouncer::new(
            Duration::from_millis(300),
            CancellationToken::new(),
            move |_text| {
                let timer = shared_timer.lock().unwrap().clone();
                let pending = timer.is_some_and(|timer| timer.lock().unwrap().pending.is_some());
                *sink.lock().unwrap() = Some(pending);
            },
        )
        .with_revision(revision.clone());
        *timer.lock().unwrap() = Some(debouncer.timer.clone());
        let changes = revision.subscribe();

        debouncer.input("doe");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*seen.lock().unwrap(), Some(true));
        assert!(!debouncer.is_pending());
        assert!(changes.has_changed().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_inputs_commit_once() {
        let (commits, on_commit) = recorder();
        let debouncer = Arc::new(SearchDebouncer::new(
            Duration::from_millis(20),
            CancellationToken::new(),
            on_commit,
        ));

        let inputs: Vec<_> = (0..8)
            .map(|i| {
                let debouncer = debouncer.clone();
                tokio::spawn(async move { debouncer.input(format!("term{}", i)) })
            })
            .collect();
        for input in inputs {
            input.await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(commits.lock().unwrap().len(), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (commits, on_commit) = recorder();
        let debouncer =
            SearchDebouncer::new(Duration::from_millis(300), CancellationToken::new(), on_commit);

        debouncer.input("doe");
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(commits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_stops_timer() {
        let (commits, on_commit) = recorder();
        let parent = CancellationToken::new();
        let debouncer = SearchDebouncer::new(Duration::from_millis(300), parent.clone(), on_commit);

        debouncer.input("doe");
        parent.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(commits.lock().unwrap().is_empty());
    }
}
