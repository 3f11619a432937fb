//! Conversation cache keyed by (query, response mode).

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::time::{Duration, Instant};

use tracing::debug;

use docqa_core::{CacheConfig, ResponseMode, Result};

/// Derive the cache key for a query in a response mode.
///
/// Case and surrounding whitespace of the query do not matter.
pub fn cache_key(query: &str, mode: ResponseMode) -> String {
    let raw = format!("{}_{}", query.trim(), mode.as_str()).to_lowercase();
    blake3::hash(raw.as_bytes()).to_hex().to_string()
}

/// Bounds applied to the cache. The default is unbounded with no expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum number of entries; the oldest insertions are evicted first.
    pub max_entries: Option<usize>,

    /// Maximum entry age.
    pub ttl: Option<Duration>,
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            max_entries: config.max_entries,
            ttl: config.ttl(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Memoized responses for one session.
///
/// Only ever cleared wholesale; see [`ResponseCache::clear`].
#[derive(Debug, Clone)]
pub struct ResponseCache<V = String> {
    entries: HashMap<String, CacheEntry<V>>,
    order: VecDeque<String>,
    policy: CachePolicy,
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a live entry, dropping it if it has expired.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => self.is_expired(entry),
            None => return None,
        };

        if expired {
            debug!("Cache entry expired: {}", key.get(..12).unwrap_or(key));
            self.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value, evicting the oldest entries beyond the size bound.
    pub fn insert(&mut self, key: String, value: V) {
        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );

        if let Some(max) = self.policy.max_entries {
            while self.entries.len() > max {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
            }
        }
    }

    /// Return the cached value for `key`, or run `compute` and cache its result.
    ///
    /// On a hit `compute` is never called. Errors are returned and not cached.
    pub async fn get_or_compute<F, Fut>(&mut self, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!("Clearing {} cached responses", self.entries.len());
        }
        self.entries.clear();
        self.order.clear();
    }

    fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        self.policy
            .ttl
            .map_or(false, |ttl| entry.inserted_at.elapsed() >= ttl)
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::DocQaError;
    use std::cell::Cell;

    #[test]
    fn test_key_ignores_case_and_whitespace() {
        assert_eq!(
            cache_key("  What is X? ", ResponseMode::Detailed),
            cache_key("what is x?", ResponseMode::Detailed)
        );
        assert_ne!(
            cache_key("What is X?", ResponseMode::Detailed),
            cache_key("What is X?", ResponseMode::Concise)
        );
        assert_eq!(cache_key("q", ResponseMode::Concise).len(), 64);
    }

    #[tokio::test]
    async fn test_compute_runs_once_per_key() {
        let mut cache: ResponseCache = ResponseCache::default();
        let counter = Cell::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.set(calls.get() + 1);
            Ok("X is a letter.".to_string())
        };

        let key = cache_key("What is X?", ResponseMode::Detailed);
        let first = cache.get_or_compute(&key, compute).await.unwrap();
        let second = cache.get_or_compute(&key, compute).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);

        let concise = cache_key("What is X?", ResponseMode::Concise);
        cache.get_or_compute(&concise, compute).await.unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let mut cache: ResponseCache = ResponseCache::default();
        let key = cache_key("q", ResponseMode::Detailed);

        let result = cache
            .get_or_compute(&key, || async { Err(DocQaError::generation("down")) })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());

        let value = cache
            .get_or_compute(&key, || async { Ok("up".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "up");
    }

    #[test]
    fn test_clear_is_wholesale() {
        let mut cache: ResponseCache = ResponseCache::default();
        cache.insert("a".to_string(), "1".to_string());
        cache.insert("b".to_string(), "2".to_string());

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_max_entries_evicts_oldest() {
        let mut cache = ResponseCache::new(CachePolicy {
            max_entries: Some(2),
            ttl: None,
        });
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_reinsert_refreshes_position() {
        let mut cache = ResponseCache::new(CachePolicy {
            max_entries: Some(2),
            ttl: None,
        });
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("a".to_string(), 10);
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.get("a"), Some(10));
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let mut cache = ResponseCache::new(CachePolicy {
            max_entries: None,
            ttl: Some(Duration::ZERO),
        });
        cache.insert("a".to_string(), 1);

        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_policy_from_config() {
        let config = CacheConfig {
            max_entries: Some(5),
            ttl_secs: Some(60),
        };
        let policy = CachePolicy::from(&config);
        assert_eq!(policy.max_entries, Some(5));
        assert_eq!(policy.ttl, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_expiry_logs_non_ascii_key() {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut cache = ResponseCache::new(CachePolicy {
                max_entries: None,
                ttl: Some(Duration::ZERO),
            });
            cache.insert("aéééééééé".to_string(), 1);

            assert!(cache.get("aéééééééé").is_none());
            assert!(cache.is_empty());
        });
    }
}
