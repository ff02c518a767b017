//! Standard JWT claims and their validation against expected reference values.

// crates.io
use chrono::serde::ts_seconds_option;
use serde::{Deserialize, Serialize};
// self
use crate::_prelude::*;

/// Leeway tolerated when comparing time-based claims, in seconds.
const VALIDATION_LEEWAY_SECS: i64 = 60;

/// Audience claim accepting both the string and array forms permitted by RFC 7519.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
	/// Single audience value.
	One(String),
	/// Multiple audience values.
	Many(Vec<String>),
}
impl Audience {
	/// Whether the claim includes the given audience value.
	pub fn contains(&self, value: &str) -> bool {
		match self {
			Audience::One(aud) => aud == value,
			Audience::Many(auds) => auds.iter().any(|aud| aud == value),
		}
	}
}

/// Standard claims extracted from a verified token.
///
/// Every field is optional on the wire; which ones are enforced is decided by
/// [`Claims::validate`] and the verifier's issuer policy.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
	/// Issuer the token originates from.
	#[serde(default, rename = "iss", skip_serializing_if = "Option::is_none")]
	pub issuer: Option<String>,
	/// Subject the token was issued for.
	#[serde(default, rename = "sub", skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
	/// Audience(s) the token is intended for.
	#[serde(default, rename = "aud", skip_serializing_if = "Option::is_none")]
	pub audience: Option<Audience>,
	/// Expiry timestamp.
	#[serde(
		default,
		rename = "exp",
		with = "ts_seconds_option",
		skip_serializing_if = "Option::is_none"
	)]
	pub expires_at: Option<DateTime<Utc>>,
	/// Not-before timestamp.
	#[serde(
		default,
		rename = "nbf",
		with = "ts_seconds_option",
		skip_serializing_if = "Option::is_none"
	)]
	pub not_before: Option<DateTime<Utc>>,
	/// Issued-at timestamp.
	#[serde(
		default,
		rename = "iat",
		with = "ts_seconds_option",
		skip_serializing_if = "Option::is_none"
	)]
	pub issued_at: Option<DateTime<Utc>>,
	/// Token identifier.
	#[serde(default, rename = "jti", skip_serializing_if = "Option::is_none")]
	pub token_id: Option<String>,
}
impl Claims {
	/// Validate audience and time-based claims against `expected`.
	///
	/// Time checks run with a fixed one-minute leeway. Absent time claims are not enforced; an
	/// absent audience claim always fails the audience check.
	pub fn validate(&self, expected: &Expected) -> Result<()> {
		match &self.audience {
			Some(audience) if audience.contains(&expected.audience) => {},
			_ => return Err(Error::AudienceMismatch { expected: expected.audience.clone() }),
		}

		let leeway = TimeDelta::seconds(VALIDATION_LEEWAY_SECS);

		if let Some(not_before) = self.not_before
			&& expected.time + leeway < not_before
		{
			return Err(Error::NotYetValid);
		}
		if let Some(expires_at) = self.expires_at
			&& expected.time - leeway > expires_at
		{
			return Err(Error::Expired);
		}

		Ok(())
	}
}

/// Reference values a set of claims is validated against.
#[derive(Clone, Debug)]
pub struct Expected {
	/// Fixed point in time used for expiry and not-before checks.
	pub time: DateTime<Utc>,
	/// Audience value the token must include.
	pub audience: String,
}
