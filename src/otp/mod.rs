//! Short-lived login challenges and password reset tokens.

pub mod mailer;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

pub use mailer::{MailError, OtpMailer, RecordingMailer, TracingMailer};

/// Key-value storage whose entries expire.
///
/// Expired entries read as absent even before a sweep removes them.
#[async_trait]
pub trait TtlStore: Send + Sync {
    async fn put(&self, key: &str, value: String, ttl: Duration);

    async fn get(&self, key: &str) -> Option<String>;

    /// Overwrite a live entry's value, keeping its expiry. Returns false when
    /// the key is absent or expired.
    async fn replace(&self, key: &str, value: String) -> bool;

    async fn delete(&self, key: &str) -> bool;

    /// Drop expired entries, returning how many were removed
    async fn sweep_expired(&self) -> usize;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local TTL store
#[derive(Default)]
pub struct MemoryTtlStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    async fn replace(&self, key: &str, value: String) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                entry.value = value;
                true
            }
            _ => false,
        }
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

/// Periodically sweep a TTL store until the task is aborted
pub fn spawn_sweeper(store: Arc<dyn TtlStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired().await;
            if removed > 0 {
                debug!(removed, "Swept expired OTP entries");
            }
        }
    })
}
