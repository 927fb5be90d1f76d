//! In-memory credential store

use super::{CredentialStore, StoreError};
use crate::entry::CredentialEntry;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Store holding already-decrypted entries in memory.
///
/// Useful when the caller obtains credentials from its own source.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<CredentialEntry>>,
}

impl MemoryStore {
    pub fn new(entries: Vec<CredentialEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Append an entry after the existing ones
    pub fn add(&self, entry: CredentialEntry) {
        self.entries.write().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn list_decrypted_candidates(&self) -> Result<Vec<CredentialEntry>, StoreError> {
        Ok(self.entries.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::AttributeProfile;

    #[tokio::test]
    async fn test_entries_keep_insertion_order() {
        let store = MemoryStore::default();
        assert!(store.is_empty());

        store.add(CredentialEntry::new("b", AttributeProfile::empty(), "1"));
        store.add(CredentialEntry::new("a", AttributeProfile::empty(), "2"));
        assert_eq!(store.len(), 2);

        let ids: Vec<_> = store
            .list_decrypted_candidates()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
