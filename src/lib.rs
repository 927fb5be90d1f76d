//! credmatch - password resolution for deployment automation
//!
//! Given whatever is known about a deployment target (host, account, user),
//! credmatch searches the stored server entries and returns the password of
//! the one whose own attributes overlap the most. Build and deploy tooling
//! can then run unattended without hard-coding passwords.

pub mod config;
pub mod crypto;
pub mod entry;
pub mod matching;
pub mod profile;
pub mod resolve;
pub mod settings;
pub mod store;

pub use entry::CredentialEntry;
pub use matching::{MatchEngine, MatchObserver, MatchResult};
pub use profile::AttributeProfile;
pub use resolve::{CredentialResolver, Resolution, ResolveMode, ResolveRequest};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Core error types for credmatch
#[derive(Error, Debug)]
pub enum CredmatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] settings::SettingsError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
}

/// A password held in memory
///
/// The value is redacted from `Debug` output and zeroized on drop.
#[derive(Debug, Clone)]
pub struct Secret(SecretString);

impl Secret {
    /// Create a new secret from a string
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Expose the secret value
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
