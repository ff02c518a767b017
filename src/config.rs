//! Verifier configuration.

// crates.io
use serde::{Deserialize, Serialize};
// self
use crate::_prelude::*;

/// Default keychain TTL in minutes.
pub const DEFAULT_KEYCHAIN_TTL_MINUTES: u64 = 5;

/// Configuration for [`IdTokenVerifier`](crate::verifier::IdTokenVerifier).
///
/// Immutable for the lifetime of the verifier it constructs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifierConfig {
	/// Trusted issuer URL tokens must originate from.
	pub issuer: String,
	/// Audience value every accepted token must carry.
	pub audience: String,
	/// Freshness window for cached signing keys, in minutes.
	///
	/// Cached entries are physically retained for twice this window before eviction.
	#[serde(default = "default_keychain_ttl")]
	pub keychain_ttl: u64,
}
impl VerifierConfig {
	/// Construct a configuration with the default keychain TTL.
	pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
		Self {
			issuer: issuer.into(),
			audience: audience.into(),
			keychain_ttl: DEFAULT_KEYCHAIN_TTL_MINUTES,
		}
	}

	/// Set the keychain TTL to the desired number of minutes.
	pub fn with_keychain_ttl(mut self, minutes: u64) -> Self {
		self.keychain_ttl = minutes;

		self
	}

	/// Validate the configuration against the documented constraints.
	pub fn validate(&self) -> Result<()> {
		if self.issuer.is_empty() {
			return Err(Error::Validation { field: "issuer", reason: "Must not be empty.".into() });
		}
		if self.audience.is_empty() {
			return Err(Error::Validation {
				field: "audience",
				reason: "Must not be empty.".into(),
			});
		}
		if self.keychain_ttl == 0 {
			return Err(Error::Validation {
				field: "keychain_ttl",
				reason: "Must be at least 1 minute.".into(),
			});
		}

		Ok(())
	}
}

fn default_keychain_ttl() -> u64 {
	DEFAULT_KEYCHAIN_TTL_MINUTES
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn validate_accepts_complete_configuration() {
		let config = VerifierConfig::new("https://issuer.example", "svc-a").with_keychain_ttl(10);

		config.validate().expect("valid configuration");
	}

	#[test]
	fn validate_rejects_empty_fields_and_zero_ttl() {
		let no_issuer = VerifierConfig::new("", "svc-a");
		let no_audience = VerifierConfig::new("https://issuer.example", "");
		let zero_ttl = VerifierConfig::new("https://issuer.example", "svc-a").with_keychain_ttl(0);

		for config in [no_issuer, no_audience, zero_ttl] {
			assert!(matches!(config.validate(), Err(Error::Validation { .. })));
		}
	}

	#[test]
	fn deserializes_with_default_ttl() {
		let config: VerifierConfig = serde_json::from_value(serde_json::json!({
			"issuer": "https://issuer.example",
			"audience": "svc-a"
		}))
		.expect("config");

		assert_eq!(config.keychain_ttl, DEFAULT_KEYCHAIN_TTL_MINUTES);
	}
}
