//! Password encryption for the settings store
//!
//! Server passwords may be stored encrypted as `{nonce:ciphertext}` using
//! AES-256-GCM with a master key derived from the master password by Argon2.

mod encrypt;

pub use encrypt::{
    decrypt_password, derive_key, encrypt_password, generate_salt, is_encrypted, CryptoError,
    EncryptedPassword, MasterKey,
};
