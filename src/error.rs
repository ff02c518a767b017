//! Crate-wide error types and `Result` alias.

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the ID token verification crate.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Jsonwebtoken(#[from] jsonwebtoken::errors::Error),
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	Serde(#[from] serde_json::Error),
	#[error(transparent)]
	Url(#[from] url::ParseError),

	#[error("Audience mismatch: token does not include audience '{expected}'.")]
	AudienceMismatch { expected: String },
	#[error("Token is expired.")]
	Expired,
	#[error("Upstream HTTP status {status} from {url}: {body:?}")]
	HttpStatus { status: reqwest::StatusCode, url: url::Url, body: Option<String> },
	#[error("Issuer mismatch: expected '{expected}', token carries '{found}'.")]
	IssuerMismatch { expected: String, found: String },
	#[error("No signing keys found for key ID '{kid}'.")]
	NoMatchingKey { kid: String },
	#[error("Token is not valid yet.")]
	NotYetValid,
	#[error("Security violation: {0}")]
	Security(String),
	#[error("Multi-signature tokens are not supported or headers information is missing.")]
	UnsupportedTokenShape,
	#[error("Validation failed for {field}: {reason}")]
	Validation { field: &'static str, reason: String },
}
