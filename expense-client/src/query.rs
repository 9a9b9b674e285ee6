use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use tracing::debug;

use crate::api::ApiError;

type SharedFetch<V> = Shared<LocalBoxFuture<'static, Result<V, ApiError>>>;

struct Entry<V> {
    /// Bumped on every invalidation.
    generation: u64,
    data: Option<V>,
    error: Option<ApiError>,
    stale: bool,
    in_flight: Option<(u64, SharedFetch<V>)>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Entry {
            generation: 0,
            data: None,
            error: None,
            stale: false,
            in_flight: None,
        }
    }
}

/// Snapshot of a cached query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryState<V> {
    pub data: Option<V>,
    pub error: Option<ApiError>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

/// Caches remote results by key.
///
/// Concurrent fetches of the same key share a single request. Invalidating a key marks its data
/// stale and detaches any request in flight, so a result that was requested before the
/// invalidation is handed to its callers but never stored as fresh.
pub struct QueryCache<K, V> {
    entries: RefCell<HashMap<K, Entry<V>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + 'static,
{
    pub fn new() -> QueryCache<K, V> {
        QueryCache {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Returns fresh cached data, joins the request in flight for `key`, or starts a new request
    /// with `fetch`.
    pub async fn fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + 'static,
    {
        let joined = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries.entry(key.clone()).or_default();
            if !entry.stale {
                if let Some(data) = &entry.data {
                    return Ok(data.clone());
                }
            }
            match &entry.in_flight {
                Some((generation, shared)) if *generation == entry.generation => {
                    Some((*generation, shared.clone()))
                }
                _ => None,
            }
        };

        let (generation, shared) = match joined {
            Some(joined) => {
                debug!("Joining request in flight");
                joined
            }
            None => {
                let shared = fetch().boxed_local().shared();
                let mut entries = self.entries.borrow_mut();
                let entry = entries.entry(key.clone()).or_default();
                entry.in_flight = Some((entry.generation, shared.clone()));
                (entry.generation, shared)
            }
        };

        let result = shared.await;

        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.get_mut(&key) {
            if entry.generation == generation {
                entry.in_flight = None;
                match &result {
                    Ok(data) => {
                        entry.data = Some(data.clone());
                        entry.error = None;
                        entry.stale = false;
                    }
                    Err(e) => entry.error = Some(e.clone()),
                }
            } else {
                debug!("Discarding result of a request made before invalidation");
            }
        }
        result
    }

    /// Marks every key matching `predicate` stale. The next fetch of those keys goes to the
    /// backend.
    pub fn invalidate<P>(&self, predicate: P)
    where
        P: Fn(&K) -> bool,
    {
        let mut entries = self.entries.borrow_mut();
        for (_, entry) in entries.iter_mut().filter(|(key, _)| predicate(*key)) {
            entry.generation += 1;
            entry.stale = true;
            entry.in_flight = None;
        }
    }

    pub fn invalidate_all(&self) {
        self.invalidate(|_| true)
    }

    pub fn state(&self, key: &K) -> QueryState<V> {
        let entries = self.entries.borrow();
        match entries.get(key) {
            Some(entry) => QueryState {
                data: entry.data.clone(),
                error: entry.error.clone(),
                is_fetching: entry.in_flight.is_some(),
                is_stale: entry.stale || entry.data.is_none(),
            },
            None => QueryState {
                data: None,
                error: None,
                is_fetching: false,
                is_stale: true,
            },
        }
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + 'static,
{
    fn default() -> Self {
        QueryCache::new()
    }
}
