//! ID token verification pipeline.

// crates.io
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use url::Url;
// self
use crate::{
	_prelude::*,
	cache::KeychainCache,
	claims::{Claims, Expected},
	config::VerifierConfig,
	keychain::KeyProvider,
};

/// Segment count of a compact JWS, carrying exactly one signature.
const COMPACT_JWS_SEGMENTS: usize = 3;

/// Verifies OIDC ID tokens against a pinned issuer and audience.
///
/// Each call runs the same linear pipeline and aborts on the first failing step: token shape,
/// header decoding, key resolution, signature verification, issuer policy, standard claims.
/// The verifier holds no mutable state, so a single instance serves concurrent callers.
///
/// Expiry and not-before checks compare against a clock snapshot taken once at construction,
/// not the current time of each call. Long-lived deployments should re-create the verifier
/// periodically to bound the skew.
pub struct IdTokenVerifier {
	config: VerifierConfig,
	keychain: Arc<dyn KeyProvider>,
	issuer: Url,
	init_time: DateTime<Utc>,
}
impl std::fmt::Debug for IdTokenVerifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IdTokenVerifier")
			.field("config", &self.config)
			.field("issuer", &self.issuer)
			.field("init_time", &self.init_time)
			.finish_non_exhaustive()
	}
}
impl IdTokenVerifier {
	/// Build a verifier that resolves signing keys through the supplied keychain.
	pub fn new(config: VerifierConfig, keychain: Arc<dyn KeyProvider>) -> Result<Self> {
		config.validate()?;

		let issuer = Url::parse(&config.issuer)?;

		Ok(Self { config, keychain, issuer, init_time: Utc::now() })
	}

	/// Build a verifier with a [`KeychainCache`] stacked in front of `base`.
	pub fn with_cached_keychain(
		config: VerifierConfig,
		base: Arc<dyn KeyProvider>,
	) -> Result<Self> {
		let cache = Arc::new(KeychainCache::new(&config, base));

		Self::new(config, cache)
	}

	/// Verify `token` and return its claims.
	///
	/// Returns either the full validated claims or exactly one error describing the first
	/// failing pipeline step; partial claims are never returned.
	#[tracing::instrument(skip_all)]
	pub async fn get_verified_claims(&self, token: &str) -> Result<Claims> {
		let claims = self.claims_of(token).await?;

		self.verify_issuer(&claims)?;
		claims.validate(&Expected {
			time: self.init_time,
			audience: self.config.audience.clone(),
		})?;

		Ok(claims)
	}

	/// Decode the token, resolve its signing key, and verify the signature.
	async fn claims_of(&self, token: &str) -> Result<Claims> {
		if token.split('.').count() != COMPACT_JWS_SEGMENTS {
			return Err(Error::UnsupportedTokenShape);
		}

		let header = decode_header(token)?;
		// A missing kid resolves as the empty string; sources index kid-less keys there.
		let kid = header.kid.unwrap_or_default();
		let keys = self.keychain.key(&kid).await?;
		let Some(key) = keys.first() else {
			return Err(Error::NoMatchingKey { kid });
		};
		let decoding_key = DecodingKey::from_jwk(key)?;
		let mut validation = Validation::new(header.alg);

		// Standard claims are checked later in the pipeline, against the construction-time
		// clock snapshot; only the signature is verified here.
		validation.validate_exp = false;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();

		let data = decode::<Claims>(token, &decoding_key, &validation)?;

		tracing::debug!(kid, "signature verified");

		Ok(data.claims)
	}

	/// Compare the token issuer against the configured issuer by normalized URL form.
	fn verify_issuer(&self, claims: &Claims) -> Result<()> {
		let token_issuer = Url::parse(claims.issuer.as_deref().unwrap_or_default())?;

		if self.issuer.as_str() != token_issuer.as_str() {
			return Err(Error::IssuerMismatch {
				expected: self.issuer.to_string(),
				found: token_issuer.to_string(),
			});
		}

		Ok(())
	}
}
