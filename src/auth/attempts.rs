use crate::error::AppError;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Counter-with-expiry of failed admin authentications, keyed by client identity.
///
/// The in-memory store suits a single instance; a multi-instance deployment plugs in a
/// shared implementation.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Fails with [`AppError::TooManyAttempts`] while the client is locked out.
    async fn check(&self, client: &str) -> Result<(), AppError>;
    /// Records one failure and returns the failure count of the current window.
    async fn record_failure(&self, client: &str) -> u32;
    async fn clear(&self, client: &str);
}

#[derive(Debug, Clone)]
struct AttemptWindow {
    failures: u32,
    started_at: Instant,
}

impl AttemptWindow {
    fn is_expired(&self, window: Duration) -> bool {
        self.started_at.elapsed() >= window
    }
}

/// LRU-bounded attempt store; the least recently seen clients are evicted first.
pub struct InMemoryAttemptStore {
    entries: RwLock<LruCache<String, AttemptWindow>>,
    max_attempts: u32,
    window: Duration,
}

impl InMemoryAttemptStore {
    pub fn new(max_attempts: u32, window: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            max_attempts,
            window,
        }
    }

    pub async fn tracked_clients(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    #[instrument(skip(self))]
    async fn check(&self, client: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get(client) else {
            return Ok(());
        };

        if entry.is_expired(self.window) {
            debug!("Attempt window expired for {client}");
            entries.pop(client);
            return Ok(());
        }

        if entry.failures >= self.max_attempts {
            let remaining = self.window.saturating_sub(entry.started_at.elapsed());
            warn!(
                "Client {} locked out after {} failed attempts",
                client, entry.failures
            );
            return Err(AppError::TooManyAttempts {
                retry_after_seconds: remaining.as_secs().max(1),
            });
        }

        Ok(())
    }

    async fn record_failure(&self, client: &str) -> u32 {
        let mut entries = self.entries.write().await;
        let failures = match entries.get_mut(client) {
            Some(entry) if !entry.is_expired(self.window) => {
                entry.failures += 1;
                entry.failures
            }
            _ => {
                entries.put(
                    client.to_string(),
                    AttemptWindow {
                        failures: 1,
                        started_at: Instant::now(),
                    },
                );
                1
            }
        };
        debug!("Failed admin authentication from {client} ({failures} in window)");
        failures
    }

    async fn clear(&self, client: &str) {
        self.entries.write().await.pop(client);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locks_out_after_max_attempts() {
        let store = InMemoryAttemptStore::new(3, Duration::from_secs(60), 16);

        for expected in 1..=3 {
            assert!(store.check("10.0.0.1").await.is_ok());
            assert_eq!(store.record_failure("10.0.0.1").await, expected);
        }

        let err = store.check("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::TooManyAttempts { .. }));
        assert_eq!(err.status_code(), 429);

        // Other clients are unaffected.
        assert!(store.check("10.0.0.2").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_expiry_resets_counter() {
        let store = InMemoryAttemptStore::new(1, Duration::from_millis(50), 16);
        store.record_failure("client").await;
        assert!(store.check("client").await.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(store.check("client").await.is_ok());
        assert_eq!(store.record_failure("client").await, 1);
    }

    #[tokio::test]
    async fn test_clear_forgets_client() {
        let store = InMemoryAttemptStore::new(1, Duration::from_secs(60), 16);
        store.record_failure("client").await;
        store.clear("client").await;
        assert!(store.check("client").await.is_ok());
        assert_eq!(store.tracked_clients().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let store = InMemoryAttemptStore::new(1, Duration::from_secs(60), 2);
        store.record_failure("a").await;
        store.record_failure("b").await;
        store.record_failure("c").await;

        assert_eq!(store.tracked_clients().await, 2);
        assert!(store.check("a").await.is_ok());
        assert!(store.check("c").await.is_err());
    }
}
