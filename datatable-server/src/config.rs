//! Server configuration

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Settings of the mock API server.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datatable_server::ServerConfig;
///
/// let config = ServerConfig::default()
///     .with_latency(Duration::ZERO)
///     .with_failing_tasks([3, 7]);
/// assert!(config.fails_tasks_for(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    ///
    /// Default: `127.0.0.1:3000`
    pub addr: SocketAddr,

    /// Simulated latency of `/api/users`.
    ///
    /// Default: 300ms
    pub users_latency: Duration,

    /// Simulated latency of `/api/users/with-tasks`.
    ///
    /// Default: 500ms
    pub embedded_latency: Duration,

    /// Simulated latency of `/api/users/{id}/tasks`.
    ///
    /// Default: 200ms
    pub tasks_latency: Duration,

    /// Number of generated users.
    ///
    /// Default: 30
    pub dataset_size: usize,

    /// Seed of the dataset generator. The same seed always yields the same
    /// users and tasks.
    ///
    /// Default: 42
    pub seed: u64,

    /// User ids whose tasks endpoint answers with a 500.
    pub failing_task_ids: BTreeSet<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            users_latency: Duration::from_millis(300),
            embedded_latency: Duration::from_millis(500),
            tasks_latency: Duration::from_millis(200),
            dataset_size: 30,
            seed: 42,
            failing_task_ids: BTreeSet::new(),
        }
    }
}

impl ServerConfig {
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Sets the same latency for every endpoint.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.users_latency = latency;
        self.embedded_latency = latency;
        self.tasks_latency = latency;
        self
    }

    pub fn with_users_latency(mut self, latency: Duration) -> Self {
        self.users_latency = latency;
        self
    }

    pub fn with_embedded_latency(mut self, latency: Duration) -> Self {
        self.embedded_latency = latency;
        self
    }

    pub fn with_tasks_latency(mut self, latency: Duration) -> Self {
        self.tasks_latency = latency;
        self
    }

    pub fn with_dataset_size(mut self, size: usize) -> Self {
        self.dataset_size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Makes the tasks endpoint fail for these user ids.
    pub fn with_failing_tasks(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.failing_task_ids.extend(ids);
        self
    }

    /// Returns `true` if the tasks endpoint of `user_id` is set to fail.
    pub fn fails_tasks_for(&self, user_id: u64) -> bool {
        self.failing_task_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.users_latency, Duration::from_millis(300));
        assert_eq!(config.embedded_latency, Duration::from_millis(500));
        assert_eq!(config.dataset_size, 30);
        assert!(!config.fails_tasks_for(1));
    }

    #[test]
    fn test_with_latency_sets_all() {
        let config = ServerConfig::default().with_latency(Duration::from_millis(5));
        assert_eq!(config.users_latency, Duration::from_millis(5));
        assert_eq!(config.embedded_latency, Duration::from_millis(5));
        assert_eq!(config.tasks_latency, Duration::from_millis(5));
    }
}
