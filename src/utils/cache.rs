use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

/// Source of "now" for cache expiry.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: StdMutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: StdMutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

/// Single-value cache with a fixed time-to-live and stale fallback.
///
/// A value younger than the TTL is served as-is. Once it expires the next
/// caller refetches; if that fetch fails, the expired value is served instead
/// of the error. Only a cache that has never been filled surfaces fetch
/// errors. The lock is held across the fetch, so concurrent misses share one
/// upstream request.
#[derive(Debug, Clone)]
pub struct TimedCache<T> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: Arc<Mutex<Option<Entry<T>>>>,
}

impl<T: Clone> TimedCache<T> {
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            entry: Arc::new(Mutex::new(None)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.entry.lock().await;
        let now = self.clock.now();

        if let Some(entry) = slot.as_ref() {
            if now - entry.fetched_at < self.ttl {
                debug!("{} cache hit", self.name);
                return Ok(entry.value.clone());
            }
        }

        match fetch().await {
            Ok(value) => {
                *slot = Some(Entry {
                    value: value.clone(),
                    fetched_at: self.clock.now(),
                });
                Ok(value)
            }
            Err(e) => match slot.as_ref() {
                Some(stale) => {
                    warn!(
                        "{} refresh failed, serving copy from {}: {}",
                        self.name, stale.fetched_at, e
                    );
                    Ok(stale.value.clone())
                }
                None => Err(e),
            },
        }
    }

    /// Cached value regardless of age.
    pub async fn peek(&self) -> Option<T> {
        self.entry.lock().await.as_ref().map(|e| e.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn setup(ttl_secs: i64) -> (Arc<ManualClock>, TimedCache<String>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));
        let cache = TimedCache::new("test", Duration::seconds(ttl_secs), clock.clone());
        (clock, cache)
    }

    #[tokio::test]
    async fn test_fetches_once_within_ttl() {
        let (clock, cache) = setup(60);
        let counter = AtomicU32::new(0);
        let fetches = &counter;

        for _ in 0..5 {
            let value = cache
                .get_or_fetch(|| async move {
                    let n = fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("v{}", n))
                })
                .await;
            assert_eq!(assert_ok!(value), "v0");
            clock.advance(Duration::seconds(10));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetches_at_ttl_boundary() {
        let (clock, cache) = setup(60);
        assert_ok!(cache.get_or_fetch(|| async { Ok("first".to_string()) }).await);
        clock.advance(Duration::seconds(60));
        let value = cache.get_or_fetch(|| async { Ok("second".to_string()) }).await;
        assert_eq!(assert_ok!(value), "second");
    }

    #[test_log::test(tokio::test)]
    async fn test_serves_stale_on_failure() {
        let (clock, cache) = setup(60);
        assert_ok!(cache.get_or_fetch(|| async { Ok("good".to_string()) }).await);
        clock.advance(Duration::hours(3));
        let value = cache
            .get_or_fetch(|| async { Err(Error::NetworkError("down".into())) })
            .await;
        assert_eq!(assert_ok!(value), "good");

        // The stale copy keeps its original age, so the next call retries.
        let value = cache.get_or_fetch(|| async { Ok("fresh".to_string()) }).await;
        assert_eq!(assert_ok!(value), "fresh");
    }

    #[tokio::test]
    async fn test_empty_cache_propagates_failure() {
        let (_, cache) = setup(60);
        let result = cache
            .get_or_fetch(|| async { Err(Error::NetworkError("down".into())) })
            .await;
        assert!(matches!(assert_err!(result), Error::NetworkError(_)));
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let (_, cache) = setup(60);
        let counter = AtomicU32::new(0);
        let fetches = &counter;
        let fetch = || async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok("shared".to_string())
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch(fetch),
            cache.get_or_fetch(fetch),
            cache.get_or_fetch(fetch)
        );
        assert_eq!(assert_ok!(a), "shared");
        assert_eq!(assert_ok!(b), "shared");
        assert_eq!(assert_ok!(c), "shared");
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}
