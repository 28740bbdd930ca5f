//! Response caching keyed by a request fingerprint.
//!
//! Caching is opt-in per client. The cache holds decoupled copies of
//! responses (status, headers, buffered body), never anything tied to a
//! live connection. Growth is bounded by [`CacheConfig::capacity`] with
//! least-recently-used eviction, and entries may expire after
//! [`CacheConfig::ttl`].

use crate::{query::Query, Response};
use http::Method;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

const DEFAULT_CAPACITY: usize = 1024;

/// Configuration for the response cache.
///
/// # Examples
///
/// ```
/// use blackbeard::cache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::builder()
///     .capacity(256)
///     .ttl(Duration::from_secs(60))
///     .build();
///
/// assert!(!config.cache_failures);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of stored responses. Defaults to 1024.
    pub capacity: NonZeroUsize,

    /// How long an entry stays valid. `None` keeps entries until evicted.
    pub ttl: Option<Duration>,

    /// Whether responses outside the 200-399 range are stored.
    ///
    /// Defaults to `false`.
    pub cache_failures: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ttl: None,
            cache_failures: false,
        }
    }
}

impl CacheConfig {
    /// Creates a new builder for configuring the cache.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }
}

/// Builder for [`CacheConfig`].
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Sets the maximum number of entries. Zero is treated as one.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Sets the time-to-live of every entry.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    /// Sets whether non-success responses are stored.
    pub fn cache_failures(mut self, cache_failures: bool) -> Self {
        self.config.cache_failures = cache_failures;
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Deterministic byte key for a call.
///
/// The JSON forms of method and path, the length-prefixed body identity and
/// the JSON form of the query are concatenated in that order.
pub fn fingerprint(method: &Method, path: &str, body: &[u8], query: Option<&Query>) -> Vec<u8> {
    let mut key = Vec::with_capacity(path.len() + body.len() + 40);

    key.extend(serde_json::to_vec(method.as_str()).unwrap_or_default());
    key.extend(serde_json::to_vec(path).unwrap_or_default());
    key.extend_from_slice(&(body.len() as u64).to_be_bytes());
    key.extend_from_slice(body);
    key.extend(serde_json::to_vec(&query).unwrap_or_default());

    key
}

struct Entry {
    response: Response,
    stored_at: Instant,
}

/// In-memory store of responses by fingerprint.
///
/// Lookups and stores are each atomic. Two identical calls racing on a miss
/// may both reach the network; the later store wins.
pub struct ResponseCache {
    config: CacheConfig,
    entries: Mutex<LruCache<Vec<u8>, Entry>>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity)),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the stored response for `key`, dropping it if it expired.
    pub fn lookup(&self, key: &[u8]) -> Option<Response> {
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => self
                .config
                .ttl
                .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl),
        };

        if expired {
            entries.pop(key);
            return None;
        }

        entries.get(key).map(|entry| entry.response.clone().into_cached())
    }

    /// Stores `response` under `key`, overwriting any previous entry.
    ///
    /// Returns `false` when the response was rejected by the
    /// [`cache_failures`](CacheConfig::cache_failures) setting.
    pub fn store(&self, key: Vec<u8>, response: &Response) -> bool {
        if !self.config.cache_failures && !response.is_success_range() {
            return false;
        }

        self.entries.lock().put(
            key,
            Entry {
                response: response.clone(),
                stored_at: Instant::now(),
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};

    fn response(status: u16, body: &'static str) -> Response {
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::from_static(body.as_bytes()),
            Duration::from_millis(5),
        )
    }

    fn key(path: &str) -> Vec<u8> {
        fingerprint(&Method::GET, path, b"null", None)
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let query = Query::from([("b", "2"), ("a", "1")]);
        let first = fingerprint(&Method::POST, "/posts", br#"{"x":1}"#, Some(&query));
        let second = fingerprint(&Method::POST, "/posts", br#"{"x":1}"#, Some(&query));
        assert_eq!(first, second);
    }

    #[test]
    fn test_fingerprint_distinguishes_every_component() {
        let base = fingerprint(&Method::GET, "/a", b"null", None);

        assert_ne!(base, fingerprint(&Method::DELETE, "/a", b"null", None));
        assert_ne!(base, fingerprint(&Method::GET, "/b", b"null", None));
        assert_ne!(base, fingerprint(&Method::GET, "/a", b"{}", None));
        assert_ne!(base, fingerprint(&Method::GET, "/a", b"null", Some(&Query::from([("p", "1")]))));
    }

    #[test]
    fn test_store_then_lookup() {
        let cache = ResponseCache::new(CacheConfig::default());
        assert!(cache.lookup(&key("/a")).is_none());

        assert!(cache.store(key("/a"), &response(200, "{}")));
        let hit = cache.lookup(&key("/a")).unwrap();

        assert_eq!(hit.status(), StatusCode::OK);
        assert_eq!(hit.body(), &Bytes::from_static(b"{}"));
        assert!(hit.from_cache());
    }

    #[test]
    fn test_store_overwrites() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.store(key("/a"), &response(200, "first"));
        cache.store(key("/a"), &response(201, "second"));

        let hit = cache.lookup(&key("/a")).unwrap();
        assert_eq!(hit.text(), "second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failures_not_stored_by_default() {
        let cache = ResponseCache::new(CacheConfig::default());
        assert!(!cache.store(key("/a"), &response(500, "boom")));
        assert!(cache.is_empty());

        let cache = ResponseCache::new(CacheConfig::builder().cache_failures(true).build());
        assert!(cache.store(key("/a"), &response(500, "boom")));
        assert_eq!(cache.lookup(&key("/a")).unwrap().status().as_u16(), 500);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = ResponseCache::new(CacheConfig::builder().capacity(2).build());
        cache.store(key("/a"), &response(200, "a"));
        cache.store(key("/b"), &response(200, "b"));
        cache.lookup(&key("/a"));
        cache.store(key("/c"), &response(200, "c"));

        assert!(cache.lookup(&key("/a")).is_some());
        assert!(cache.lookup(&key("/b")).is_none());
        assert!(cache.lookup(&key("/c")).is_some());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = ResponseCache::new(CacheConfig::builder().ttl(Duration::ZERO).build());
        cache.store(key("/a"), &response(200, "a"));

        assert!(cache.lookup(&key("/a")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.store(key("/a"), &response(200, "a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
