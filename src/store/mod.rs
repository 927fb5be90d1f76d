//! Credential stores producing decrypted candidates
//!
//! A store hands the resolver the full list of stored entries with their
//! secrets already decrypted, in the store's own order.

mod memory;
mod settings;

pub use memory::MemoryStore;
pub use settings::{SettingsDecrypter, SettingsStore};

use crate::crypto::CryptoError;
use crate::entry::CredentialEntry;
use crate::settings::SettingsError;
use async_trait::async_trait;
use thiserror::Error;

/// Store-related errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Decryption error: {0}")]
    Decryption(#[from] CryptoError),

    #[error("Server '{0}' has an encrypted password but no master password was provided")]
    MissingMasterPassword(String),

    #[error("Server '{0}' has an encrypted password but the settings define no salt")]
    MissingSalt(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// Source of decrypted credential candidates
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// List every stored entry with its secret decrypted
    async fn list_decrypted_candidates(&self) -> Result<Vec<CredentialEntry>, StoreError>;
}
