use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Where a CSV feed document comes from.
#[async_trait]
pub trait CsvSource: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    /// Fetch the whole document as text.
    async fn fetch(&self) -> Result<String>;
}

/// Feed published over HTTP (spreadsheet CSV export).
pub struct HttpCsvSource {
    name: String,
    url: String,
    client: Client,
}

impl HttpCsvSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CsvSource for HttpCsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<String> {
        debug!("Fetching {} feed from {}", self.name, self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to reach the {} feed", self.name))?
            .error_for_status()
            .with_context(|| format!("The {} feed answered with an error status", self.name))?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read the {} feed body", self.name))
    }
}

/// In-memory feed, handy for offline runs and tests. Counts its fetches.
pub struct StaticCsvSource {
    name: String,
    text: String,
    fetches: AtomicUsize,
}

impl StaticCsvSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// How many times `fetch` has been called
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CsvSource for StaticCsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers really overlap with the fetch
        tokio::task::yield_now().await;
        Ok(self.text.clone())
    }
}
