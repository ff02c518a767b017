//! Issuer-pinned OIDC ID token verification with TTL-bounded signing-key caching — built for
//! modern Rust identity systems.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod claims;
pub mod http;
pub mod keychain;
pub mod verifier;

mod config;
mod error;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use chrono::{DateTime, TimeDelta, Utc};
	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}

pub use crate::{
	config::VerifierConfig,
	error::{Error, Result},
};
