//! AES-256-GCM password encryption with Argon2 key derivation

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use thiserror::Error;

use crate::Secret;

/// Cryptographic errors
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Invalid key length")]
    InvalidKeyLength,

    #[error("Invalid encrypted password: {0}")]
    InvalidFormat(String),
}

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const SALT_SIZE: usize = 16;

/// Master key derived from the master password
pub struct MasterKey {
    key: SecretBox<[u8; KEY_SIZE]>,
}

impl MasterKey {
    /// Create a master key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength);
        }
        let mut key_array = [0u8; KEY_SIZE];
        key_array.copy_from_slice(bytes);
        Ok(Self {
            key: SecretBox::new(Box::new(key_array)),
        })
    }

    fn cipher(&self) -> Result<Aes256Gcm, CryptoError> {
        Aes256Gcm::new_from_slice(self.key.expose_secret().as_slice())
            .map_err(|_| CryptoError::InvalidKeyLength)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// An encrypted password as stored in the settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPassword {
    /// Base64-encoded nonce
    pub nonce: String,
    /// Base64-encoded ciphertext
    pub ciphertext: String,
}

impl EncryptedPassword {
    /// Render as `{nonce:ciphertext}`
    pub fn encode(&self) -> String {
        format!("{{{}:{}}}", self.nonce, self.ciphertext)
    }

    /// Parse the `{nonce:ciphertext}` form
    pub fn decode(s: &str) -> Result<Self, CryptoError> {
        let inner = s
            .trim()
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| CryptoError::InvalidFormat("expected {nonce:ciphertext}".to_string()))?;

        match inner.split_once(':') {
            Some((nonce, ciphertext)) if !nonce.is_empty() && !ciphertext.is_empty() => Ok(Self {
                nonce: nonce.to_string(),
                ciphertext: ciphertext.to_string(),
            }),
            _ => Err(CryptoError::InvalidFormat(
                "expected {nonce:ciphertext}".to_string(),
            )),
        }
    }
}

/// True if a stored password value is in encrypted form
pub fn is_encrypted(value: &str) -> bool {
    let value = value.trim();
    value.len() > 2 && value.starts_with('{') && value.ends_with('}')
}

/// Derive a master key from the master password using Argon2
pub fn derive_key(password: &SecretString, salt: &[u8]) -> Result<MasterKey, CryptoError> {
    let salt_string = SaltString::encode_b64(salt)
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt_string)
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

    let output = hash
        .hash
        .ok_or_else(|| CryptoError::KeyDerivationFailed("No hash output".to_string()))?;

    MasterKey::from_bytes(&output.as_bytes()[..KEY_SIZE])
}

/// Generate a random salt for key derivation
pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Encrypt a password for storage in the settings file
pub fn encrypt_password(
    password: &Secret,
    key: &MasterKey,
) -> Result<EncryptedPassword, CryptoError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = key
        .cipher()?
        .encrypt(Nonce::from_slice(&nonce_bytes), password.expose().as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(EncryptedPassword {
        nonce: STANDARD.encode(nonce_bytes),
        ciphertext: STANDARD.encode(ciphertext),
    })
}

/// Decrypt a stored password
pub fn decrypt_password(
    encrypted: &EncryptedPassword,
    key: &MasterKey,
) -> Result<Secret, CryptoError> {
    let nonce_bytes = STANDARD
        .decode(&encrypted.nonce)
        .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid nonce: {}", e)))?;

    if nonce_bytes.len() != NONCE_SIZE {
        return Err(CryptoError::DecryptionFailed(format!(
            "Invalid nonce length: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }

    let ciphertext = STANDARD
        .decode(&encrypted.ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid ciphertext: {}", e)))?;

    let plaintext = key
        .cipher()?
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| {
            CryptoError::DecryptionFailed("invalid master password or corrupted value".to_string())
        })?;

    String::from_utf8(plaintext)
        .map(Secret::new)
        .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid UTF-8: {}", e)))
}
