//! Keyed stale-while-revalidate cache.
//!
//! Each key holds the last good data, the last error and the time of the
//! last successful read. Readers always get the current snapshot right away;
//! fresh reads happen behind them. Per key there is at most one read in
//! flight: whoever holds the key's in-flight guard is the only writer of
//! that entry.
//!
//! # Example
//!
//! ```
//! use persona_swr::{LoadOptions, SwrCache};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache: SwrCache<String> = SwrCache::new();
//!
//! let first = cache.load(
//!     "/greeting",
//!     || async { Ok("fresh".to_string()) },
//!     LoadOptions::with_fallback("stale".to_string()),
//! );
//! assert_eq!(first.data.as_deref().map(String::as_str), Some("stale"));
//!
//! let settled = cache.settled("/greeting").await;
//! assert_eq!(settled.data.as_deref().map(String::as_str), Some("fresh"));
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use persona_core::FetchError;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

// ============================================================================
// Types
// ============================================================================

/// Options for [`SwrCache::load`].
#[derive(Debug, Clone)]
pub struct LoadOptions<T> {
    /// Data to show until the first read completes.
    pub fallback_data: Option<T>,
}

impl<T> Default for LoadOptions<T> {
    fn default() -> Self {
        Self {
            fallback_data: None,
        }
    }
}

impl<T> LoadOptions<T> {
    /// Options carrying fallback data.
    pub fn with_fallback(data: T) -> Self {
        Self {
            fallback_data: Some(data),
        }
    }

    /// Options carrying optional fallback data.
    pub fn fallback(data: Option<T>) -> Self {
        Self {
            fallback_data: data,
        }
    }
}

/// What a reader sees for a key.
#[derive(Debug)]
pub struct LoadResult<T> {
    /// Most recent good data, if any was ever available.
    pub data: Option<Arc<T>>,
    /// Error from the most recent read, cleared by the next success.
    pub error: Option<FetchError>,
    /// When `data` was last replaced by a successful read or mutation.
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Clone for LoadResult<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            last_updated: self.last_updated,
        }
    }
}

impl<T> Default for LoadResult<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            last_updated: None,
        }
    }
}

struct Entry<T> {
    snapshot: RwLock<LoadResult<T>>,
    in_flight: Arc<Mutex<()>>,
}

impl<T> Entry<T> {
    fn new() -> Self {
        Self {
            snapshot: RwLock::new(LoadResult::default()),
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    fn result(&self) -> LoadResult<T> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn seed(&self, data: T) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        if snapshot.data.is_none() {
            snapshot.data = Some(Arc::new(data));
        }
    }

    fn store(&self, data: T) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        snapshot.data = Some(Arc::new(data));
        snapshot.error = None;
        snapshot.last_updated = Some(Utc::now());
    }

    fn fail(&self, error: FetchError) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        snapshot.error = Some(error);
    }

    /// Claims the in-flight guard, or `None` if a read is already running.
    fn begin(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.in_flight).try_lock_owned().ok()
    }
}

// ============================================================================
// SwrCache
// ============================================================================

/// Stale-while-revalidate cache keyed by request key.
pub struct SwrCache<T> {
    entries: RwLock<HashMap<String, Arc<Entry<T>>>>,
}

impl<T> Default for SwrCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> std::fmt::Debug for SwrCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwrCache")
            .field("keys", &self.keys())
            .finish()
    }
}

impl<T> SwrCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys that have been loaded or mutated, sorted.
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Current snapshot for `key` without triggering a read.
    pub fn snapshot(&self, key: &str) -> LoadResult<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|e| e.result()).unwrap_or_default()
    }

    /// Replaces the data for `key` locally, without a read.
    pub fn mutate(&self, key: &str, data: T) {
        self.entry(key).store(data);
    }

    /// Waits for any in-flight read on `key` to settle, then returns the
    /// snapshot.
    pub async fn settled(&self, key: &str) -> LoadResult<T> {
        let entry = self.entry(key);
        let _settled = entry.in_flight.lock().await;
        entry.result()
    }

    fn entry(&self, key: &str) -> Arc<Entry<T>> {
        if let Some(entry) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Entry::new())),
        )
    }
}

impl<T: Send + Sync + 'static> SwrCache<T> {
    /// Returns the current data for `key` and revalidates in the background.
    ///
    /// `fallback_data` seeds the entry when it holds no data yet. The read
    /// is spawned on the current Tokio runtime unless one is already in
    /// flight for `key`, in which case `fetcher` is dropped unused.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn load<F, Fut>(&self, key: &str, fetcher: F, options: LoadOptions<T>) -> LoadResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let entry = self.entry(key);
        if let Some(fallback) = options.fallback_data {
            entry.seed(fallback);
        }

        let current = entry.result();
        match entry.begin() {
            Some(guard) => {
                tokio::spawn(run_read(Arc::clone(&entry), guard, key.to_string(), fetcher));
            }
            None => debug!(key, "revalidation already in flight"),
        }
        current
    }

    /// Reads `key` now and returns the settled snapshot.
    ///
    /// If a read is already in flight, no second read is issued: this waits
    /// for the running one and returns its outcome.
    pub async fn revalidate<F, Fut>(&self, key: &str, fetcher: F) -> LoadResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let entry = self.entry(key);
        match entry.begin() {
            Some(guard) => run_read(entry, guard, key.to_string(), fetcher).await,
            None => {
                debug!(key, "joining in-flight revalidation");
                let _settled = entry.in_flight.lock().await;
                entry.result()
            }
        }
    }
}

async fn run_read<T, F, Fut>(
    entry: Arc<Entry<T>>,
    guard: OwnedMutexGuard<()>,
    key: String,
    fetcher: F,
) -> LoadResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    match fetcher().await {
        Ok(data) => {
            debug!(key = %key, "revalidation succeeded");
            entry.store(data);
        }
        Err(err) => {
            warn!(key = %key, error = %err, "revalidation failed; keeping previous data");
            entry.fail(err);
        }
    }
    drop(guard);
    entry.result()
}

// ============================================================================
// Tests
// ============================================================================
