//! Store backed by the settings file

use super::{CredentialStore, StoreError};
use crate::crypto::{
    decrypt_password, derive_key, is_encrypted, CryptoError, EncryptedPassword, MasterKey,
};
use crate::entry::CredentialEntry;
use crate::settings::{ServerSettings, Settings};
use crate::Secret;
use async_trait::async_trait;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decrypts server passwords with the master key
#[derive(Debug)]
pub struct SettingsDecrypter {
    key: MasterKey,
}

impl SettingsDecrypter {
    /// Derive the master key from the master password and the settings salt
    pub fn new(master_password: &SecretString, salt: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            key: derive_key(master_password, salt)?,
        })
    }

    pub fn key(&self) -> &MasterKey {
        &self.key
    }

    /// Decrypt a stored password. Values not in encrypted form are returned as is.
    pub fn decrypt(&self, value: &Secret) -> Result<Secret, CryptoError> {
        if !is_encrypted(value.expose()) {
            return Ok(value.clone());
        }

        let encrypted = EncryptedPassword::decode(value.expose())?;
        decrypt_password(&encrypted, &self.key)
    }
}

/// Credential store reading servers from a settings file on every call
pub struct SettingsStore {
    /// Path to the settings file
    path: PathBuf,
    /// Master password for encrypted server passwords
    master_password: Option<SecretString>,
}

impl SettingsStore {
    pub fn new(path: impl AsRef<Path>, master_password: Option<SecretString>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            master_password,
        }
    }

    /// Build a decrypter if any server password is encrypted
    fn decrypter_for(&self, settings: &Settings) -> Result<Option<SettingsDecrypter>, StoreError> {
        let Some(server) = settings.first_encrypted() else {
            return Ok(None);
        };

        let master_password = self
            .master_password
            .as_ref()
            .ok_or_else(|| StoreError::MissingMasterPassword(server.id.clone()))?;
        let salt = settings
            .salt
            .as_deref()
            .ok_or_else(|| StoreError::MissingSalt(server.id.clone()))?;

        Ok(Some(SettingsDecrypter::new(master_password, salt)?))
    }

    fn to_entry(
        server: &ServerSettings,
        decrypter: Option<&SettingsDecrypter>,
    ) -> Result<CredentialEntry, StoreError> {
        let secret = match (&server.password, decrypter) {
            (Some(password), Some(decrypter)) => Some(decrypter.decrypt(password)?),
            (password, _) => password.clone(),
        };

        Ok(CredentialEntry {
            id: server.id.clone(),
            profile: server.profile(),
            secret,
        })
    }
}

#[async_trait]
impl CredentialStore for SettingsStore {
    async fn list_decrypted_candidates(&self) -> Result<Vec<CredentialEntry>, StoreError> {
        let settings = Settings::load(&self.path).await?;
        debug!(path = %self.path.display(), servers = settings.servers.len(), "Loaded settings");

        let decrypter = self.decrypter_for(&settings)?;

        settings
            .servers
            .iter()
            .map(|server| Self::to_entry(server, decrypter.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt_password, generate_salt};
    use crate::settings::SettingsError;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use tempfile::tempdir;
    use tokio::fs;

    fn encrypted(password: &str, master: &str, salt: &[u8]) -> String {
        let decrypter = SettingsDecrypter::new(&SecretString::from(master), salt).unwrap();
        encrypt_password(&Secret::new(password), decrypter.key())
            .unwrap()
            .encode()
    }

    async fn write_settings(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("settings.toml");
        fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_decrypts_encrypted_and_keeps_plain_passwords() {
        let dir = tempdir().unwrap();
        let salt = generate_salt();
        let content = format!(
            r#"
[security]
salt = "{}"

[[servers]]
id = "encrypted"
password = "{}"
[servers.configuration]
host = "h1"

[[servers]]
id = "plain"
password = "plain-pass"
[servers.configuration]
host = "h2"

[[servers]]
id = "bare"
"#,
            STANDARD.encode(&salt),
            encrypted("secret-pass", "master", &salt)
        );
        let path = write_settings(dir.path(), &content).await;

        let store = SettingsStore::new(&path, Some(SecretString::from("master")));
        let entries = store.list_decrypted_candidates().await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].secret.as_ref().unwrap().expose(), "secret-pass");
        assert_eq!(entries[0].profile.as_ref().unwrap().host(), Some("h1"));
        assert_eq!(entries[1].secret.as_ref().unwrap().expose(), "plain-pass");
        assert!(entries[2].secret.is_none());
        assert!(entries[2].profile.is_none());
    }

    #[tokio::test]
    async fn test_plain_settings_need_no_master_password() {
        let dir = tempdir().unwrap();
        let path = write_settings(
            dir.path(),
            "[[servers]]\nid = \"s1\"\npassword = \"p1\"\n[servers.configuration]\nuser = \"u1\"\n",
        )
        .await;

        let store = SettingsStore::new(&path, None);
        let entries = store.list_decrypted_candidates().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].secret.as_ref().unwrap().expose(), "p1");
    }

    #[tokio::test]
    async fn test_encrypted_password_without_master_password_fails() {
        let dir = tempdir().unwrap();
        let salt = generate_salt();
        let content = format!(
            "[security]\nsalt = \"{}\"\n[[servers]]\nid = \"s1\"\npassword = \"{}\"\n",
            STANDARD.encode(&salt),
            encrypted("p", "master", &salt)
        );
        let path = write_settings(dir.path(), &content).await;

        let result = SettingsStore::new(&path, None).list_decrypted_candidates().await;
        assert!(matches!(result, Err(StoreError::MissingMasterPassword(id)) if id == "s1"));
    }

    #[tokio::test]
    async fn test_wrong_master_password_fails() {
        let dir = tempdir().unwrap();
        let salt = generate_salt();
        let content = format!(
            "[security]\nsalt = \"{}\"\n[[servers]]\nid = \"s1\"\npassword = \"{}\"\n",
            STANDARD.encode(&salt),
            encrypted("p", "master", &salt)
        );
        let path = write_settings(dir.path(), &content).await;

        let store = SettingsStore::new(&path, Some(SecretString::from("wrong")));
        let result = store.list_decrypted_candidates().await;
        assert!(matches!(result, Err(StoreError::Decryption(_))));
    }

    #[tokio::test]
    async fn test_missing_salt_fails() {
        let dir = tempdir().unwrap();
        let path = write_settings(
            dir.path(),
            "[[servers]]\nid = \"s1\"\npassword = \"{bm9uY2U=:Y2lwaGVy}\"\n",
        )
        .await;

        let store = SettingsStore::new(&path, Some(SecretString::from("master")));
        let result = store.list_decrypted_candidates().await;
        assert!(matches!(result, Err(StoreError::MissingSalt(_))));
    }

    #[tokio::test]
    async fn test_missing_settings_file_fails() {
        let dir = tempdir().unwrap();
        let missing = SettingsStore::new(dir.path().join("missing.toml"), None);
        let result = missing.list_decrypted_candidates().await;
        assert!(matches!(result, Err(StoreError::Settings(SettingsError::NotFound(_)))));

        let path = write_settings(dir.path(), "").await;
        let entries = SettingsStore::new(&path, None)
            .list_decrypted_candidates()
            .await
            .unwrap();
        assert!(entries.is_empty());
    }
}
