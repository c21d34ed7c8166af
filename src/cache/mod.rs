//! Explicit query cache with tag-based invalidation.
//!
//! Entries are stored as JSON values keyed by [`QueryKey`] and expire after a
//! fixed window. Mutating an entity type invalidates every query tagged with it.
//! Concurrent fetches of the same key share one in-flight result, so only the
//! first caller reaches the network and every waiter sees its outcome, error
//! included. Clearing the cache starts a new generation; fetches that began
//! before the clear return to their callers but are not stored.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ApiError;
use crate::models::{Category, StudentFilter};

/// Entity types that queries depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityTag {
    Users,
    Departments,
    Students,
    Sessions,
}

/// Identity of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    CurrentUser,
    Users,
    Departments,
    Department(i64),
    Students(StudentFilter),
    Student(i64),
    EligibleStudents {
        department_id: i64,
        category: Category,
    },
    Sessions,
}

impl QueryKey {
    /// Entity types whose mutation makes this query stale.
    pub fn tags(&self) -> &'static [EntityTag] {
        match self {
            QueryKey::CurrentUser | QueryKey::Users => &[EntityTag::Users],
            QueryKey::Departments | QueryKey::Department(_) => &[EntityTag::Departments],
            QueryKey::Students(_) | QueryKey::Student(_) | QueryKey::EligibleStudents { .. } => {
                &[EntityTag::Students]
            }
            QueryKey::Sessions => &[EntityTag::Sessions],
        }
    }

    pub fn has_tag(&self, tag: EntityTag) -> bool {
        self.tags().contains(&tag)
    }
}

/// Notification delivered to subscribers of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(QueryKey),
    Invalidated(QueryKey),
}

/// Handle returned by [`QueryCache::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// Outcome of one network attempt, shared by every caller waiting on the key.
type Shared = Arc<tokio::sync::OnceCell<Result<serde_json::Value, ApiError>>>;

struct Entry {
    value: serde_json::Value,
    stored_at: Instant,
}

#[derive(Default)]
struct Subscribers {
    by_key: HashMap<QueryKey, Vec<(SubscriptionId, Callback)>>,
}

/// Query cache shared by the repository and its callers.
pub struct QueryCache {
    ttl: Duration,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    in_flight: Mutex<HashMap<QueryKey, Shared>>,
    subscribers: Mutex<Subscribers>,
    next_subscription: AtomicU64,
    generation: AtomicU64,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(Subscribers::default()),
            next_subscription: AtomicU64::new(1),
            generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value for `key`, if present and not expired.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = lock(&self.entries);
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a value and notify the key's subscribers.
    pub fn insert<T: Serialize>(&self, key: QueryKey, value: &T) -> Result<(), ApiError> {
        let value = serde_json::to_value(value)?;
        lock(&self.entries).insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
        self.notify(CacheEvent::Updated(key));
        Ok(())
    }

    /// Return the fresh cached value or run `fetcher` once and cache its result.
    ///
    /// Callers that arrive while a fetch for the same key is running wait for it
    /// and receive a clone of its result. Errors are shared with those waiters
    /// but never cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let generation = self.generation.load(Ordering::SeqCst);
        let shared = {
            let mut in_flight = lock(&self.in_flight);
            // Checked under the in-flight lock: a settled fetch stores its value
            // before it leaves the map.
            if let Some(hit) = self.get(&key) {
                return Ok(hit);
            }
            Arc::clone(in_flight.entry(key).or_default())
        };

        let settled = shared
            .get_or_init(|| async move {
                tracing::debug!("Cache miss for {:?}", key);
                let value = fetcher()
                    .await
                    .and_then(|value| serde_json::to_value(&value).map_err(ApiError::from));
                if let Ok(value) = &value {
                    self.store(key, value.clone(), generation);
                }
                value
            })
            .await
            .clone();
        self.settle(&key, &shared);

        Ok(serde_json::from_value(settled?)?)
    }

    /// Store a fetched value unless the cache was cleared since the fetch began.
    fn store(&self, key: QueryKey, value: serde_json::Value, generation: u64) {
        {
            let mut entries = lock(&self.entries);
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding {:?} fetched before the cache was cleared", key);
                return;
            }
            entries.insert(
                key,
                Entry {
                    value,
                    stored_at: Instant::now(),
                },
            );
        }
        self.notify(CacheEvent::Updated(key));
    }

    /// Forget the in-flight fetch for `key` if it is still `shared`.
    fn settle(&self, key: &QueryKey, shared: &Shared) {
        let mut in_flight = lock(&self.in_flight);
        if in_flight
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, shared))
        {
            in_flight.remove(key);
        }
    }

    /// Drop every entry tagged with `tag`. Returns how many entries were dropped.
    pub fn invalidate(&self, tag: EntityTag) -> usize {
        let dropped: Vec<QueryKey> = {
            let mut entries = lock(&self.entries);
            let keys: Vec<QueryKey> = entries
                .keys()
                .filter(|key| key.has_tag(tag))
                .copied()
                .collect();
            for key in &keys {
                entries.remove(key);
            }
            keys
        };

        tracing::debug!("Invalidated {} cached queries tagged {:?}", dropped.len(), tag);
        for key in &dropped {
            self.notify(CacheEvent::Invalidated(*key));
        }
        dropped.len()
    }

    /// Drop a single entry.
    pub fn invalidate_key(&self, key: &QueryKey) -> bool {
        let removed = lock(&self.entries).remove(key).is_some();
        if removed {
            self.notify(CacheEvent::Invalidated(*key));
        }
        removed
    }

    /// Drop everything, e.g. on logout. Subscribers are kept and told about
    /// every dropped entry. Fetches still running will not store their results.
    pub fn clear(&self) {
        let cleared: Vec<QueryKey> = {
            let mut entries = lock(&self.entries);
            self.generation.fetch_add(1, Ordering::SeqCst);
            entries.drain().map(|(key, _)| key).collect()
        };
        lock(&self.in_flight).clear();

        tracing::debug!("Cleared {} cached queries", cleared.len());
        for key in &cleared {
            self.notify(CacheEvent::Invalidated(*key));
        }
    }

    /// Register `callback` for updates and invalidations of `key`.
    pub fn subscribe<F>(&self, key: QueryKey, callback: F) -> SubscriptionId
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.subscribers)
            .by_key
            .entry(key)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let mut found = false;
        for callbacks in subscribers.by_key.values_mut() {
            let before = callbacks.len();
            callbacks.retain(|(existing, _)| *existing != id);
            found |= callbacks.len() != before;
        }
        subscribers.by_key.retain(|_, callbacks| !callbacks.is_empty());
        found
    }

    fn notify(&self, event: CacheEvent) {
        let key = match event {
            CacheEvent::Updated(key) | CacheEvent::Invalidated(key) => key,
        };
        // Callbacks run outside the lock so they may call back into the cache.
        let callbacks: Vec<Callback> = lock(&self.subscribers)
            .by_key
            .get(&key)
            .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(&event);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
