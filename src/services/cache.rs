// src/services/cache.rs
use log::debug;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as SlotLock;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

type Slot<V> = Arc<SlotLock<Option<Entry<V>>>>;

/// Process-wide memo table with a fixed time-to-live.
///
/// Each key owns its own async lock, so concurrent callers for the same key
/// wait on one in-flight producer instead of all hitting the upstream.
/// Producer errors are returned to the caller and never stored.
pub struct TtlCache<K, V> {
    ttl: Duration,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.clone()).or_default().clone()
    }

    fn is_fresh(&self, entry: &Entry<V>) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    pub async fn get_or_compute<F, Fut, E>(&self, key: K, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;

        if let Some(hit) = entry.as_ref().filter(|e| self.is_fresh(e)) {
            debug!("cache hit for {:?}", key);
            return Ok(hit.value.clone());
        }

        debug!("cache miss for {:?}", key);
        let value = producer().await?;
        *entry = Some(Entry {
            value: value.clone(),
            stored_at: Instant::now(),
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_producer(
        calls: &AtomicUsize,
        value: u32,
    ) -> impl Future<Output = Result<u32, String>> + '_ {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(value)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_within_ttl_is_served_from_cache() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute("AAPL", || counting_producer(&calls, 1))
            .await
            .unwrap();
        let second = cache
            .get_or_compute("AAPL", || counting_producer(&calls, 2))
            .await
            .unwrap();

        assert_eq!((first, second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_recomputed() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        cache
            .get_or_compute("GC=F", || counting_producer(&calls, 1))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(3599)).await;
        let cached = cache
            .get_or_compute("GC=F", || counting_producer(&calls, 2))
            .await
            .unwrap();
        assert_eq!(cached, 1);

        tokio::time::advance(Duration::from_secs(2)).await;

        let refreshed = cache
            .get_or_compute("GC=F", || counting_producer(&calls, 2))
            .await
            .unwrap();
        assert_eq!(refreshed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_keys_do_not_share_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let a = cache
            .get_or_compute(("AAPL", 5), || counting_producer(&calls, 5))
            .await
            .unwrap();
        let b = cache
            .get_or_compute(("AAPL", 90), || counting_producer(&calls, 90))
            .await
            .unwrap();
        assert_eq!((a, b), (5, 90));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));

        let err = cache
            .get_or_compute("MSFT", || async { Err::<u32, _>("offline".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "offline");

        let ok = cache
            .get_or_compute("MSFT", || async { Ok::<_, String>(7) })
            .await
            .unwrap();
        assert_eq!(ok, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_inflight_fetch() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            cache.get_or_compute("NVDA", || counting_producer(&calls, 1)),
            cache.get_or_compute("NVDA", || counting_producer(&calls, 2)),
        );

        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
