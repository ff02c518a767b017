//! Key lookup contract and a fixed in-memory implementation.

// std
use std::collections::HashMap;
// crates.io
use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
// self
use crate::_prelude::*;

/// Capability to look up signing keys by key ID.
///
/// Terminal key sources (JWKS endpoints, files, secret stores) and
/// [`KeychainCache`](crate::cache::KeychainCache) all implement this contract, so a cache can
/// stack transparently in front of any source.
#[async_trait]
pub trait KeyProvider: Send + Sync {
	/// Return every signing key known for `kid`, in source order.
	///
	/// An empty result means the source holds no key under that ID; that is not an error at
	/// this layer.
	async fn key(&self, kid: &str) -> Result<Vec<Jwk>>;
}

/// Fixed in-memory key provider for file-based key material and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticKeychain {
	keys: HashMap<String, Vec<Jwk>>,
}
impl StaticKeychain {
	/// Create an empty keychain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Index every key of `set` by its key ID.
	///
	/// Keys without a key ID are grouped under the empty string, matching lookups for tokens
	/// whose header carries no `kid`.
	pub fn from_jwk_set(set: JwkSet) -> Self {
		let mut keys = HashMap::<String, Vec<Jwk>>::new();

		for key in set.keys {
			let kid = key.common.key_id.clone().unwrap_or_default();

			keys.entry(kid).or_default().push(key);
		}

		Self { keys }
	}

	/// Register a key under `kid`, appending to any keys already held there.
	pub fn insert(&mut self, kid: impl Into<String>, key: Jwk) {
		self.keys.entry(kid.into()).or_default().push(key);
	}
}
#[async_trait]
impl KeyProvider for StaticKeychain {
	async fn key(&self, kid: &str) -> Result<Vec<Jwk>> {
		Ok(self.keys.get(kid).cloned().unwrap_or_default())
	}
}
