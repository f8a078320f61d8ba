use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::fingerprint::Fingerprint;

/// Bounded, thread-safe memo cache keyed by [`Fingerprint`].
///
/// Capacity is fixed so long-lived processes cannot grow the table without
/// bound. Lookups are single-flight: concurrent requests for the same key
/// run the producer once, while different keys proceed in parallel.
pub struct MemoCache<V> {
    inner: Mutex<LruCache<Fingerprint, V>>,
    in_flight: Mutex<HashMap<Fingerprint, Arc<Mutex<()>>>>,
}

impl<V: Clone> MemoCache<V> {
    /// A zero capacity is treated as a request to cache a single entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &Fingerprint) -> Option<V> {
        let hit = lock(&self.inner).get(key).cloned();
        if hit.is_some() {
            tracing::debug!(hi = key.hi, lo = key.lo, "memo cache hit");
        }
        hit
    }

    pub fn insert(&self, key: Fingerprint, value: V) {
        lock(&self.inner).put(key, value);
    }

    /// Return the cached value for `key` or run `produce` to fill it.
    ///
    /// Failures are never cached: a waiter that finds no value after the
    /// producing thread errored runs the producer itself.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: Fingerprint,
        produce: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }

        let flight = lock(&self.in_flight)
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _running = lock(&flight);

        // Another thread may have filled the entry while we waited.
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }

        let result = produce();
        if let Ok(value) = &result {
            self.insert(key, value.clone());
        }
        lock(&self.in_flight).remove(&key);
        result
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::FingerprintBuilder;

    fn key(n: u64) -> Fingerprint {
        let mut fp = FingerprintBuilder::new();
        fp.write_u64(n);
        fp.finish()
    }

    #[test]
    fn cache_returns_inserted_value() {
        let cache = MemoCache::new(4);
        cache.insert(key(1), "one".to_string());
        assert_eq!(cache.get(&key(1)).as_deref(), Some("one"));
        assert_eq!(cache.get(&key(2)), None);
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let cache = MemoCache::new(2);
        cache.insert(key(1), 1u32);
        cache.insert(key(2), 2u32);
        // Touch key 1 so key 2 becomes the eviction candidate.
        assert_eq!(cache.get(&key(1)), Some(1));
        cache.insert(key(3), 3u32);
        assert_eq!(cache.get(&key(2)), None);
        assert_eq!(cache.get(&key(1)), Some(1));
        assert_eq!(cache.get(&key(3)), Some(3));
    }

    #[test]
    fn zero_capacity_still_holds_one_entry() {
        let cache = MemoCache::new(0);
        cache.insert(key(1), 1u32);
        assert_eq!(cache.get(&key(1)), Some(1));
        cache.insert(key(2), 2u32);
        assert_eq!(cache.get(&key(1)), None);
    }

    #[test]
    fn producer_runs_once_for_repeated_lookups() {
        let cache = MemoCache::new(4);
        let mut runs = 0u32;
        for _ in 0..3 {
            let v: Result<u32, ()> = cache.get_or_try_insert_with(key(7), || {
                runs += 1;
                Ok(7)
            });
            assert_eq!(v, Ok(7));
        }
        assert_eq!(runs, 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache: MemoCache<u32> = MemoCache::new(4);
        let err: Result<u32, &str> = cache.get_or_try_insert_with(key(9), || Err("boom"));
        assert_eq!(err, Err("boom"));
        let ok: Result<u32, &str> = cache.get_or_try_insert_with(key(9), || Ok(9));
        assert_eq!(ok, Ok(9));
    }

    #[test]
    fn concurrent_lookups_for_one_key_coalesce() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let cache: Arc<MemoCache<u32>> = Arc::new(MemoCache::new(4));
        let runs = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let runs = Arc::clone(&runs);
                std::thread::spawn(move || {
                    let v: Result<u32, ()> = cache.get_or_try_insert_with(key(1), || {
                        runs.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        Ok(1)
                    });
                    assert_eq!(v, Ok(1));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
