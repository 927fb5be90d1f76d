//! The settings store holding server entries
//!
//! Servers are declared in a TOML file. Each may carry a password (plain or
//! encrypted) and a `configuration` table describing the deployment target
//! it belongs to:
//!
//! ```toml
//! [security]
//! salt = "c2FsdHNhbHRzYWx0c2FsdA=="
//!
//! [[servers]]
//! id = "cloud-01"
//! password = "{nonce:ciphertext}"
//!
//! [servers.configuration]
//! host = "https://deploy.example.com"
//! account = "myaccount"
//! user = "myuser"
//! ```

mod types;

pub use types::*;

use crate::crypto::is_encrypted;
use crate::profile::{AttributeProfile, KEY_ACCOUNT, KEY_HOST, KEY_USER};
use crate::Secret;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Settings-related errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read settings: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Parsed settings file
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Salt for master key derivation
    pub salt: Option<Vec<u8>>,
    /// Servers in file order
    pub servers: Vec<ServerSettings>,
}

/// A single server entry
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub id: String,
    /// Stored password, possibly still encrypted
    pub password: Option<Secret>,
    /// The server's configuration block
    pub configuration: Option<toml::Table>,
}

impl ServerSettings {
    /// Attributes of this server, or `None` without a configuration block
    pub fn profile(&self) -> Option<AttributeProfile> {
        self.configuration.as_ref().map(profile_from_configuration)
    }
}

/// Extract the attribute profile from a configuration block.
///
/// The children `host`, `account` and `user` map to the slots of the same
/// name. A missing child, or one that is not a string, leaves the slot
/// absent. Other children are ignored.
pub fn profile_from_configuration(configuration: &toml::Table) -> AttributeProfile {
    let child = |name: &str| {
        configuration
            .get(name)
            .and_then(toml::Value::as_str)
            .map(String::from)
    };

    AttributeProfile::new(child(KEY_HOST), child(KEY_ACCOUNT), child(KEY_USER))
}

impl Settings {
    /// Load settings from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse settings from a string
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let raw: RawSettings =
            toml::from_str(content).map_err(|e| SettingsError::Parse(e.to_string()))?;

        raw.try_into()
    }

    /// First server whose password is stored encrypted
    pub fn first_encrypted(&self) -> Option<&ServerSettings> {
        self.servers.iter().find(|s| {
            s.password
                .as_ref()
                .is_some_and(|p| is_encrypted(p.expose()))
        })
    }

    /// Contents of a new settings file with the given salt and no servers
    pub fn template(salt: &[u8]) -> String {
        format!(
            r#"# credmatch settings

[security]
salt = "{}"

# [[servers]]
# id = "cloud-01"
# password = "{{...}}"   # output of `credmatch encrypt`
#
# [servers.configuration]
# host = "https://deploy.example.com"
# account = "myaccount"
# user = "myuser"
"#,
            STANDARD.encode(salt)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml = r#"
[security]
salt = "c2FsdHNhbHRzYWx0c2FsdA=="

[[servers]]
id = "cloud-01"
password = "{bm9uY2U=:Y2lwaGVy}"

[servers.configuration]
host = "https://deploy.example.com"
account = "myaccount"
user = "myuser"

[[servers]]
id = "no-config"
password = "plain"

[[servers]]
id = "no-password"

[servers.configuration]
user = "someone"
"#;

        let settings = Settings::parse(toml).unwrap();
        assert_eq!(settings.salt.as_deref(), Some(&b"saltsaltsaltsalt"[..]));
        assert_eq!(settings.servers.len(), 3);

        let ids: Vec<_> = settings.servers.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["cloud-01", "no-config", "no-password"]);

        let profile = settings.servers[0].profile().unwrap();
        assert_eq!(profile.host(), Some("https://deploy.example.com"));
        assert_eq!(profile.account(), Some("myaccount"));
        assert_eq!(profile.user(), Some("myuser"));

        assert!(settings.servers[1].profile().is_none());
        assert_eq!(settings.servers[1].password.as_ref().unwrap().expose(), "plain");
        assert!(settings.servers[2].password.is_none());
    }

    #[test]
    fn test_first_encrypted() {
        let settings = Settings::parse(
            r#"
[[servers]]
id = "plain"
password = "p"

[[servers]]
id = "enc"
password = "{bm9uY2U=:Y2lwaGVy}"
"#,
        )
        .unwrap();
        assert_eq!(settings.first_encrypted().map(|s| s.id.as_str()), Some("enc"));
        assert!(Settings::default().first_encrypted().is_none());
    }

    #[test]
    fn test_minimal_settings() {
        let settings = Settings::parse("").unwrap();
        assert!(settings.salt.is_none());
        assert!(settings.servers.is_empty());
    }

    #[test]
    fn test_invalid_salt_rejected() {
        let result = Settings::parse("[security]\nsalt = \"not base64!!\"\n");
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_profile_extraction_ignores_missing_and_non_string_children() {
        let configuration: toml::Table = toml::from_str(
            r#"
host = "h1"
account = 42
extra = "ignored"
"#,
        )
        .unwrap();

        let profile = profile_from_configuration(&configuration);
        assert_eq!(profile.host(), Some("h1"));
        assert_eq!(profile.account(), None);
        assert_eq!(profile.user(), None);
    }

    #[test]
    fn test_empty_configuration_has_no_values() {
        let profile = profile_from_configuration(&toml::Table::new());
        assert!(!profile.has_any_value());
    }

    #[test]
    fn test_template_parses_back() {
        let settings = Settings::parse(&Settings::template(b"0123456789abcdef")).unwrap();
        assert_eq!(settings.salt.as_deref(), Some(&b"0123456789abcdef"[..]));
        assert!(settings.servers.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(dir.path().join("missing.toml")).await;
        assert!(matches!(result, Err(SettingsError::NotFound(_))));
    }
}
