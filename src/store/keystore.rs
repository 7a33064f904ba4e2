//! Named-blob persistence.
//!
//! Every key maps to one JSON file inside the store directory. Blobs are
//! always read and written whole; writes go through a temp file and a rename
//! so a crash mid-flush never leaves a truncated blob behind.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Raw blob for `key`, `None` when it was never written.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        let present = fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check key '{}' at {}", key, path.display()))?;
        if !present {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read key '{}' from {}", key, path.display()))?;
        Ok(Some(text))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create store directory {}", self.dir.display()))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)
            .await
            .with_context(|| format!("Failed to write key '{}'", key))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to commit key '{}'", key))?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        let present = fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check key '{}'", key))?;
        if present {
            fs::remove_file(&path)
                .await
                .with_context(|| format!("Failed to remove key '{}'", key))?;
        }
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(text) => {
                let value = serde_json::from_str(&text)
                    .with_context(|| format!("Failed to deserialize key '{}'", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize key '{}'", key))?;
        self.set(key, &json).await
    }
}
