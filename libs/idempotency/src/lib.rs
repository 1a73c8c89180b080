//! In-process deduplication of Messenger webhook deliveries.
//!
//! Facebook redelivers a webhook whenever it does not receive a 2xx in time,
//! so every messaging event is fingerprinted and remembered for a short
//! window. Events seen again inside that window are dropped.

use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    sync::Arc,
    time::Duration as StdDuration,
};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, warn};

/// Fingerprint of one inbound messaging event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdKey(String);

impl IdKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IdKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contract implemented by idempotency stores.
#[async_trait]
pub trait IdemStore: Send + Sync {
    /// Attempts to register `key` with the provided TTL. Returns `Ok(true)` when the
    /// key was absent or expired (the caller should continue processing),
    /// `Ok(false)` for a duplicate, or an error when the store was unavailable.
    async fn put_if_absent(&self, key: &str, ttl_s: u64) -> Result<bool>;

    /// Drops every entry that expired at or before `now`; returns how many went.
    async fn purge_expired(&self, now: OffsetDateTime) -> usize;

    /// Forgets `key` so the next delivery is processed again.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Shared trait object wrapper.
pub type SharedIdemStore = Arc<dyn IdemStore>;

#[derive(Clone, Default)]
pub struct InMemoryIdemStore {
    inner: Arc<RwLock<HashMap<String, OffsetDateTime>>>,
}

impl InMemoryIdemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl IdemStore for InMemoryIdemStore {
    async fn put_if_absent(&self, key: &str, ttl_s: u64) -> Result<bool> {
        let ttl = Duration::seconds(ttl_s as i64);
        let now = OffsetDateTime::now_utc();
        let mut guard = self.inner.write().await;
        match guard.get(key) {
            Some(exp) if *exp > now => Ok(false),
            _ => {
                guard.insert(key.to_string(), now + ttl);
                Ok(true)
            }
        }
    }

    async fn purge_expired(&self, now: OffsetDateTime) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, expires| *expires > now);
        before - guard.len()
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.write().await.remove(key);
        Ok(())
    }
}

/// Configuration derived at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            sweep_interval_secs: 60,
        }
    }
}

impl IdempotencyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `DEDUP_TTL_SECS` and `DEDUP_SWEEP_SECS` through `lookup`.
    /// Unparseable values keep the default; zero is raised to one second.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|raw| raw.trim().parse::<u64>().ok());
        let mut cfg = Self::default();
        if let Some(ttl) = parse("DEDUP_TTL_SECS") {
            cfg.ttl_secs = ttl.max(1);
        }
        if let Some(sweep) = parse("DEDUP_SWEEP_SECS") {
            cfg.sweep_interval_secs = sweep.max(1);
        }
        cfg
    }
}

/// Guard used by the webhook to drop redelivered events.
#[derive(Clone)]
pub struct IdempotencyGuard {
    ttl_secs: u64,
    store: SharedIdemStore,
}

impl IdempotencyGuard {
    pub fn new(store: SharedIdemStore, ttl_secs: u64) -> Self {
        Self {
            store,
            ttl_secs: ttl_secs.max(1),
        }
    }

    pub fn in_memory(ttl_secs: u64) -> Self {
        Self::new(Arc::new(InMemoryIdemStore::new()), ttl_secs)
    }

    pub fn store(&self) -> SharedIdemStore {
        self.store.clone()
    }

    /// Returns `Ok(true)` when the caller should proceed (first sighting).
    pub async fn should_process(&self, key: &IdKey) -> Result<bool> {
        let inserted = self.store.put_if_absent(key.as_str(), self.ttl_secs).await?;
        if !inserted {
            warn!(event_id = %key, "duplicate event dropped");
            metrics::counter!("webhook_duplicates_total").increment(1);
        }
        Ok(inserted)
    }

    /// Releases keys of a batch that failed, so a redelivery is not
    /// mistaken for a duplicate.
    pub async fn release(&self, keys: &[IdKey]) {
        for key in keys {
            if let Err(err) = self.store.remove(key.as_str()).await {
                warn!(event_id = %key, error = %err, "failed to release dedup key");
            }
        }
    }
}

/// Periodically removes expired fingerprints. The task only ever deletes
/// entries and runs until the runtime shuts down or the handle is aborted.
pub fn spawn_sweeper(store: SharedIdemStore, every: StdDuration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.purge_expired(OffsetDateTime::now_utc()).await;
            if removed > 0 {
                debug!(removed, "expired dedup entries swept");
            }
        }
    })
}
