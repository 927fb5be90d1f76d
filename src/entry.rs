//! Decrypted credential candidates

use crate::profile::AttributeProfile;
use crate::Secret;

/// A stored credential after decryption, as handed to the match engine
#[derive(Debug, Clone)]
pub struct CredentialEntry {
    /// Identifier of the stored entry (diagnostics only)
    pub id: String,
    /// Attributes from the entry's configuration block, if it has one
    pub profile: Option<AttributeProfile>,
    /// The decrypted secret, if one is defined
    pub secret: Option<Secret>,
}

impl CredentialEntry {
    /// Create an entry with a configuration block and a secret
    pub fn new(
        id: impl Into<String>,
        profile: AttributeProfile,
        secret: impl Into<Secret>,
    ) -> Self {
        Self {
            id: id.into(),
            profile: Some(profile),
            secret: Some(secret.into()),
        }
    }

    /// Drop the secret from this entry
    pub fn without_secret(mut self) -> Self {
        self.secret = None;
        self
    }

    /// Drop the configuration block from this entry
    pub fn without_configuration(mut self) -> Self {
        self.profile = None;
        self
    }

    /// An entry may only win a match when it has both a secret and a
    /// configuration block
    pub fn is_candidate(&self) -> bool {
        self.secret.is_some() && self.profile.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_requires_secret_and_configuration() {
        let entry = CredentialEntry::new("s1", AttributeProfile::empty().with_host("h1"), "p1");
        assert!(entry.is_candidate());
        assert!(!entry.clone().without_secret().is_candidate());
        assert!(!entry.without_configuration().is_candidate());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let entry = CredentialEntry::new("s1", AttributeProfile::empty(), "hunter2");
        let debug = format!("{:?}", entry);
        assert!(!debug.contains("hunter2"));
    }
}
