//! Raw settings types for TOML parsing

use super::*;
use serde::Deserialize;

/// Raw settings file as parsed from TOML
#[derive(Debug, Deserialize, Default)]
pub struct RawSettings {
    pub security: Option<RawSecurity>,
    #[serde(default)]
    pub servers: Vec<RawServer>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawSecurity {
    pub salt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawServer {
    #[serde(default)]
    pub id: String,
    pub password: Option<String>,
    pub configuration: Option<toml::Table>,
}

impl TryFrom<RawSettings> for Settings {
    type Error = SettingsError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let salt = raw
            .security
            .and_then(|s| s.salt)
            .map(|encoded| {
                STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| SettingsError::Invalid(format!("Invalid salt: {}", e)))
            })
            .transpose()?;

        let servers = raw
            .servers
            .into_iter()
            .map(|s| ServerSettings {
                id: s.id,
                password: s.password.map(Secret::new),
                configuration: s.configuration,
            })
            .collect();

        Ok(Self { salt, servers })
    }
}
