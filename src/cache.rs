//! TTL-bounded signing-key cache layered over a base key provider.

// std
use std::collections::HashMap;
// crates.io
use async_trait::async_trait;
use jsonwebtoken::jwk::Jwk;
use tokio::sync::RwLock;
// self
use crate::{_prelude::*, config::VerifierConfig, keychain::KeyProvider};

/// Cached key set together with its freshness and eviction deadlines.
#[derive(Clone, Debug)]
struct CacheEntry {
	keys: Vec<Jwk>,
	/// Deadline after which the entry no longer serves lookups.
	fresh_until: Instant,
	/// Deadline after which the entry is physically removed.
	evict_after: Instant,
}

/// Key provider that caches per-key-ID lookups in front of a base provider.
///
/// Entries serve lookups only within the freshness window; expired entries linger until twice
/// that window has passed and are swept lazily on insert. Empty lookup results are never
/// cached, so the next lookup retries the base provider. Concurrent misses for the same key ID
/// may fetch redundantly; results are idempotent and the last writer wins.
pub struct KeychainCache {
	entries: RwLock<HashMap<String, CacheEntry>>,
	base: Arc<dyn KeyProvider>,
	ttl: Duration,
	eviction: Duration,
}
impl KeychainCache {
	/// Wrap `base` with a cache sized from the configured keychain TTL.
	pub fn new(config: &VerifierConfig, base: Arc<dyn KeyProvider>) -> Self {
		Self::with_ttl(Duration::from_secs(config.keychain_ttl * 60), base)
	}

	/// Wrap `base` with a cache whose freshness window is `ttl`.
	///
	/// The eviction window is twice the freshness window.
	pub fn with_ttl(ttl: Duration, base: Arc<dyn KeyProvider>) -> Self {
		Self { entries: RwLock::new(HashMap::new()), base, ttl, eviction: ttl * 2 }
	}

	#[cfg(test)]
	async fn entry_count(&self) -> usize {
		self.entries.read().await.len()
	}
}
#[async_trait]
impl KeyProvider for KeychainCache {
	async fn key(&self, kid: &str) -> Result<Vec<Jwk>> {
		{
			let entries = self.entries.read().await;

			if let Some(entry) = entries.get(kid)
				&& Instant::now() < entry.fresh_until
			{
				tracing::debug!(kid, "keychain cache hit");

				return Ok(entry.keys.clone());
			}
		}

		let keys = self.base.key(kid).await?;

		if keys.is_empty() {
			tracing::debug!(kid, "base keychain returned no keys; skipping cache insert");

			return Ok(keys);
		}

		let now = Instant::now();
		let mut entries = self.entries.write().await;

		entries.retain(|_, entry| now < entry.evict_after);
		entries.insert(kid.to_owned(), CacheEntry {
			keys: keys.clone(),
			fresh_until: now + self.ttl,
			evict_after: now + self.eviction,
		});

		tracing::debug!(kid, count = keys.len(), "keychain cache populated");

		Ok(keys)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	struct CountingKeychain {
		calls: AtomicUsize,
		keys: Vec<Jwk>,
	}
	impl CountingKeychain {
		fn new(keys: Vec<Jwk>) -> Arc<Self> {
			Arc::new(Self { calls: AtomicUsize::new(0), keys })
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	#[async_trait]
	impl KeyProvider for CountingKeychain {
		async fn key(&self, _kid: &str) -> Result<Vec<Jwk>> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Ok(self.keys.clone())
		}
	}

	struct OfflineKeychain {
		calls: AtomicUsize,
	}
	#[async_trait]
	impl KeyProvider for OfflineKeychain {
		async fn key(&self, _kid: &str) -> Result<Vec<Jwk>> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Err(Error::Security("base keychain offline".into()))
		}
	}

	fn sample_keys(kid: &str) -> Vec<Jwk> {
		let key = serde_json::from_value(serde_json::json!({
			"kty": "RSA",
			"alg": "RS256",
			"use": "sig",
			"kid": kid,
			"n": "AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyAhIiMkJSYnKCkqKywtLi8wMTIzNDU2Nzg5Ojs8PT4_QEFCQ0RFRkdISUpLTE1OT1BRUlNUVVZXWFlaW1xdXl9gYWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXp7fH1-f4A",
			"e": "AQAB"
		}))
		.expect("jwk");

		vec![key]
	}

	#[tokio::test]
	async fn serves_cached_keys_within_ttl() {
		let base = CountingKeychain::new(sample_keys("k1"));
		let cache = KeychainCache::with_ttl(Duration::from_secs(60), base.clone());

		let first = cache.key("k1").await.expect("first lookup");
		let second = cache.key("k1").await.expect("second lookup");

		assert_eq!(first.len(), 1);
		assert_eq!(second.len(), 1);
		assert_eq!(base.calls(), 1);
	}

	#[tokio::test]
	async fn empty_results_are_not_cached() {
		let base = CountingKeychain::new(Vec::new());
		let cache = KeychainCache::with_ttl(Duration::from_secs(60), base.clone());

		assert!(cache.key("k1").await.expect("first lookup").is_empty());
		assert!(cache.key("k1").await.expect("second lookup").is_empty());
		assert_eq!(base.calls(), 2);
		assert_eq!(cache.entry_count().await, 0);
	}

	#[tokio::test]
	async fn errors_pass_through_and_cache_nothing() {
		let base = Arc::new(OfflineKeychain { calls: AtomicUsize::new(0) });
		let cache = KeychainCache::with_ttl(Duration::from_secs(60), base.clone());

		for _ in 0..2 {
			let err = cache.key("k1").await.expect_err("base is offline");

			assert!(matches!(err, Error::Security(_)), "unexpected error: {err:?}");
		}

		assert_eq!(base.calls.load(Ordering::SeqCst), 2);
		assert_eq!(cache.entry_count().await, 0);
	}

	#[tokio::test(start_paused = true)]
	async fn expired_entries_hit_the_base_again() {
		let base = CountingKeychain::new(sample_keys("k1"));
		let cache = KeychainCache::with_ttl(Duration::from_secs(60), base.clone());

		cache.key("k1").await.expect("initial lookup");
		cache.key("k1").await.expect("cached lookup");
		assert_eq!(base.calls(), 1);

		tokio::time::advance(Duration::from_secs(61)).await;

		cache.key("k1").await.expect("expired lookup");
		assert_eq!(base.calls(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn entries_past_the_eviction_window_are_swept() {
		let base = CountingKeychain::new(sample_keys("k1"));
		let cache = KeychainCache::with_ttl(Duration::from_secs(60), base.clone());

		cache.key("stale").await.expect("seed entry");
		assert_eq!(cache.entry_count().await, 1);

		tokio::time::advance(Duration::from_secs(121)).await;

		cache.key("fresh").await.expect("trigger sweep");
		assert_eq!(cache.entry_count().await, 1);
	}

	#[tokio::test]
	async fn concurrent_lookups_converge() {
		let base = CountingKeychain::new(sample_keys("k1"));
		let cache = Arc::new(KeychainCache::with_ttl(Duration::from_secs(60), base.clone()));
		let tasks: Vec<_> = (0..8)
			.map(|_| {
				let cache = cache.clone();

				tokio::spawn(async move { cache.key("k1").await })
			})
			.collect();

		for task in tasks {
			let keys = task.await.expect("join").expect("lookup");

			assert_eq!(keys.len(), 1);
		}

		let calls = base.calls();

		assert!((1..=8).contains(&calls), "unexpected call count: {calls}");
	}
}
