//! Remote JWKS endpoint key provider.

// crates.io
use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use reqwest::{Client, redirect::Policy};
use url::Url;
// self
use crate::{_prelude::*, keychain::KeyProvider};

/// Default timeout applied to each JWKS fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Key provider backed by a remote JWKS endpoint.
///
/// Every lookup fetches the full JWKS document and selects the keys matching the requested key
/// ID; layer a [`KeychainCache`](crate::cache::KeychainCache) in front to bound fetch
/// frequency.
#[derive(Clone, Debug)]
pub struct RemoteKeychain {
	url: Url,
	client: Client,
	require_https: bool,
	fetch_timeout: Duration,
}
impl RemoteKeychain {
	/// Build a provider for the given JWKS endpoint with a default HTTP client.
	pub fn new(url: impl AsRef<str>) -> Result<Self> {
		let client = Client::builder()
			.redirect(Policy::limited(10))
			.user_agent(format!("idtoken-verify/{}", env!("CARGO_PKG_VERSION")))
			.connect_timeout(Duration::from_secs(5))
			.build()?;

		Self::with_client(url, client)
	}

	/// Build a provider using the supplied HTTP client (primarily for tests).
	pub fn with_client(url: impl AsRef<str>, client: Client) -> Result<Self> {
		Ok(Self {
			url: Url::parse(url.as_ref())?,
			client,
			require_https: true,
			fetch_timeout: DEFAULT_FETCH_TIMEOUT,
		})
	}

	/// Set HTTPS requirement to the desired value.
	pub fn with_require_https(mut self, require_https: bool) -> Self {
		self.require_https = require_https;

		self
	}

	/// Override the per-fetch timeout.
	pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
		self.fetch_timeout = timeout;

		self
	}

	async fn fetch_jwks(&self) -> Result<JwkSet> {
		if self.require_https {
			enforce_https(&self.url)?;
		}

		let start = Instant::now();
		let response = self
			.client
			.get(self.url.clone())
			.header("accept", "application/json")
			.timeout(self.fetch_timeout)
			.send()
			.await?;
		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.ok();

			return Err(Error::HttpStatus { status, url: self.url.clone(), body });
		}

		let bytes = response.bytes().await?;
		let jwks = serde_json::from_slice::<JwkSet>(&bytes)?;

		tracing::debug!(
			url = %self.url,
			status = %status,
			elapsed = ?start.elapsed(),
			"jwks fetch complete"
		);

		Ok(jwks)
	}
}
#[async_trait]
impl KeyProvider for RemoteKeychain {
	async fn key(&self, kid: &str) -> Result<Vec<Jwk>> {
		let jwks = self.fetch_jwks().await?;
		let keys = jwks
			.keys
			.into_iter()
			.filter(|key| key.common.key_id.as_deref().unwrap_or_default() == kid)
			.collect();

		Ok(keys)
	}
}

/// Ensure the provided URL uses HTTPS.
fn enforce_https(url: &Url) -> Result<()> {
	if url.scheme() == "https" {
		Ok(())
	} else {
		Err(Error::Security(format!("JWKS URL {url} must use HTTPS.")))
	}
}
