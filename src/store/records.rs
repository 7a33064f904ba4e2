//! Append-only log of submitted weighings.
//!
//! The whole list lives under one keystore key, newest first. Every
//! operation holds the same lock across its flush, so an append can never
//! interleave with a clear.

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::info;

use super::entry::{StoredEntry, TestEntry};
use super::keystore::KeyStore;

/// Keystore key holding the serialized log
pub const RECORDS_KEY: &str = "weighin_records";

pub struct RecordStore {
    keystore: KeyStore,
    entries: Mutex<Vec<StoredEntry>>,
}

impl RecordStore {
    /// Load the persisted log (empty when nothing was saved yet).
    pub async fn open(keystore: KeyStore) -> Result<Self> {
        let entries: Vec<StoredEntry> = keystore.get_json(RECORDS_KEY).await?.unwrap_or_default();
        info!("Record store opened with {} entries", entries.len());
        Ok(Self {
            keystore,
            entries: Mutex::new(entries),
        })
    }

    /// Stamp and persist a new entry; it becomes the first one listed.
    pub async fn append(&self, entry: TestEntry) -> Result<StoredEntry> {
        let stored = StoredEntry::new(entry);
        let mut entries = self.entries.lock().await;

        let mut updated = Vec::with_capacity(entries.len() + 1);
        updated.push(stored.clone());
        updated.extend(entries.iter().cloned());

        // Memory only changes once the flush succeeded
        self.keystore.set_json(RECORDS_KEY, &updated).await?;
        *entries = updated;

        info!("Stored {} ({} entries)", stored.entry.animal_id, entries.len());
        Ok(stored)
    }

    /// Most recent first
    pub async fn list(&self) -> Vec<StoredEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drop every entry. Confirmation is up to the caller.
    pub async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        self.keystore.remove(RECORDS_KEY).await?;
        let removed = entries.len();
        entries.clear();
        info!("Record store cleared ({} entries removed)", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FormState, SessionPrefs, TestPhase};
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn entry(number: &str) -> TestEntry {
        let mut form = FormState::new(&SessionPrefs::default(), Utc::now().date_naive());
        form.tattoo_prefix = "ABC-".into();
        form.animal_number = number.into();
        TestEntry::from_form(&form, 300.0, TestPhase::Start, Utc::now())
    }

    #[tokio::test]
    async fn test_append_lists_newest_first() {
        let temp_dir = tempdir().unwrap();
        let store = RecordStore::open(KeyStore::new(temp_dir.path())).await.unwrap();

        let first = store.append(entry("001")).await.unwrap();
        let second = store.append(entry("002")).await.unwrap();
        assert_ne!(first.id, second.id);

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], second);
        assert_eq!(listed[1], first);
    }

    #[tokio::test]
    async fn test_clear_then_append() {
        let temp_dir = tempdir().unwrap();
        let store = RecordStore::open(KeyStore::new(temp_dir.path())).await.unwrap();

        store.append(entry("001")).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list().await.is_empty());
        assert!(!temp_dir.path().join("weighin_records.json").exists());

        store.append(entry("002")).await.unwrap();
        let listed = store.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].entry.animal_id, "ABC-002");
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let temp_dir = tempdir().unwrap();
        let saved = {
            let store = RecordStore::open(KeyStore::new(temp_dir.path())).await.unwrap();
            store.append(entry("001")).await.unwrap();
            store.append(entry("002")).await.unwrap();
            store.list().await
        };

        let reopened = RecordStore::open(KeyStore::new(temp_dir.path())).await.unwrap();
        assert_eq!(reopened.list().await, saved);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let temp_dir = tempdir().unwrap();
        let store = Arc::new(RecordStore::open(KeyStore::new(temp_dir.path())).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(entry(&format!("{i:03}"))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 8);
        let reopened = RecordStore::open(KeyStore::new(temp_dir.path())).await.unwrap();
        assert_eq!(reopened.len().await, 8);
    }
}
