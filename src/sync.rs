//! Best-effort remote sync.
//!
//! Pushes each stored weighing to an optional HTTP endpoint. The local save
//! has already happened by the time a push runs, so failures are only logged.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::StoredEntry;

#[derive(Clone)]
pub struct RemoteSync {
    client: Client,
    endpoint: Option<String>,
}

impl RemoteSync {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            endpoint,
        }
    }

    /// Sync switched off
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// POST the entry as JSON. `Ok(false)` when sync is disabled.
    pub async fn push(&self, entry: &StoredEntry) -> Result<bool> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(false);
        };

        self.client
            .post(endpoint)
            .json(entry)
            .send()
            .await
            .context("Failed to reach the sync endpoint")?
            .error_for_status()
            .context("Sync endpoint rejected the entry")?;

        debug!("Synced {} to {}", entry.id, endpoint);
        Ok(true)
    }

    /// Push in the background; never blocks the caller and never fails it.
    pub fn push_in_background(self: &Arc<Self>, entry: StoredEntry) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            return None;
        }
        let sync = Arc::clone(self);
        Some(tokio::spawn(async move {
            if let Err(e) = sync.push(&entry).await {
                warn!("Remote sync failed for {} (kept locally): {:#}", entry.entry.animal_id, e);
            }
        }))
    }
}
