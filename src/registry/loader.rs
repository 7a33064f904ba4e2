//! Session cache for the two registry feeds.
//!
//! Each feed is fetched at most once per process. Concurrent first callers
//! share one in-flight fetch; a failed fetch degrades to an empty collection
//! and leaves the cache empty so the next call tries again.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::animal::RegistryAnimal;
use super::parse::{parse_deceased_csv, parse_registry_csv};
use super::source::CsvSource;

pub struct RegistryCache {
    registry_source: Arc<dyn CsvSource>,
    deceased_source: Arc<dyn CsvSource>,
    registry: OnceCell<Arc<[RegistryAnimal]>>,
    deceased: OnceCell<Arc<HashSet<String>>>,
}

impl RegistryCache {
    pub fn new(registry_source: Arc<dyn CsvSource>, deceased_source: Arc<dyn CsvSource>) -> Self {
        Self {
            registry_source,
            deceased_source,
            registry: OnceCell::new(),
            deceased: OnceCell::new(),
        }
    }

    /// All registry rows. Empty when the feed is unreachable.
    pub async fn load_registry(&self) -> Arc<[RegistryAnimal]> {
        if let Some(cached) = self.registry.get() {
            debug!("Registry cache hit ({} animals)", cached.len());
            return cached.clone();
        }

        let loaded = self
            .registry
            .get_or_try_init(|| async {
                let text = self.registry_source.fetch().await?;
                let animals = parse_registry_csv(&text);
                info!("Loaded {} animals from the {} feed", animals.len(), self.registry_source.name());
                Ok::<_, anyhow::Error>(Arc::from(animals))
            })
            .await;

        match loaded {
            Ok(animals) => animals.clone(),
            Err(e) => {
                warn!("Error loading the {} feed: {:#}", self.registry_source.name(), e);
                Vec::<RegistryAnimal>::new().into()
            }
        }
    }

    /// Canonical ids of deceased animals. Empty when the feed is unreachable.
    pub async fn load_deceased_registry(&self) -> Arc<HashSet<String>> {
        if let Some(cached) = self.deceased.get() {
            debug!("Deceased cache hit ({} ids)", cached.len());
            return cached.clone();
        }

        let loaded = self
            .deceased
            .get_or_try_init(|| async {
                let text = self.deceased_source.fetch().await?;
                let ids = parse_deceased_csv(&text);
                info!("Loaded {} deceased ids from the {} feed", ids.len(), self.deceased_source.name());
                Ok::<_, anyhow::Error>(Arc::new(ids))
            })
            .await;

        match loaded {
            Ok(ids) => ids.clone(),
            Err(e) => {
                warn!("Error loading the {} feed: {:#}", self.deceased_source.name(), e);
                Arc::new(HashSet::new())
            }
        }
    }

    pub fn is_registry_cached(&self) -> bool {
        self.registry.initialized()
    }

    pub fn is_deceased_cached(&self) -> bool {
        self.deceased.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticCsvSource;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const REGISTRY: &str = "h\n2023-01-01,ABC-045,,,,F1,M1,,,Angus\n2023-02-01,ABC-046,,,,F2,M2,,,Brangus\n";
    const DECEASED: &str = "h\nx,ABC-046\n";

    /// Fails the first `failures` fetches, then serves the document.
    struct FlakySource {
        failures: usize,
        calls: AtomicUsize,
        text: String,
    }

    #[async_trait]
    impl CsvSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch(&self) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                anyhow::bail!("503 Service Unavailable");
            }
            Ok(self.text.clone())
        }
    }

    fn cache_with(registry: Arc<StaticCsvSource>, deceased: Arc<StaticCsvSource>) -> RegistryCache {
        RegistryCache::new(registry, deceased)
    }

    #[tokio::test]
    async fn test_registry_is_fetched_once() {
        let registry = Arc::new(StaticCsvSource::new("registry", REGISTRY));
        let deceased = Arc::new(StaticCsvSource::new("deceased", DECEASED));
        let cache = cache_with(registry.clone(), deceased.clone());

        assert!(!cache.is_registry_cached());
        let first = cache.load_registry().await;
        let second = cache.load_registry().await;

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.fetch_count(), 1);
        assert_eq!(deceased.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_share_one_fetch() {
        let registry = Arc::new(StaticCsvSource::new("registry", REGISTRY));
        let deceased = Arc::new(StaticCsvSource::new("deceased", DECEASED));
        let cache = Arc::new(cache_with(registry.clone(), deceased.clone()));

        let (a, b, c, d) = tokio::join!(
            cache.load_registry(),
            cache.load_registry(),
            cache.load_deceased_registry(),
            cache.load_deceased_registry(),
        );

        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert!(c.contains("abc046"));
        assert_eq!(d.len(), 1);
        assert_eq!(registry.fetch_count(), 1);
        assert_eq!(deceased.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_and_retries() {
        let flaky = Arc::new(FlakySource {
            failures: 1,
            calls: AtomicUsize::new(0),
            text: REGISTRY.to_string(),
        });
        let cache = RegistryCache::new(flaky.clone(), Arc::new(StaticCsvSource::new("deceased", DECEASED)));

        let degraded = cache.load_registry().await;
        assert!(degraded.is_empty());
        assert!(!cache.is_registry_cached());

        let recovered = cache.load_registry().await;
        assert_eq!(recovered.len(), 2);
        assert!(cache.is_registry_cached());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_deceased_failure_degrades_to_empty_set() {
        let flaky = Arc::new(FlakySource {
            failures: usize::MAX,
            calls: AtomicUsize::new(0),
            text: String::new(),
        });
        let cache = RegistryCache::new(Arc::new(StaticCsvSource::new("registry", REGISTRY)), flaky);

        assert!(cache.load_deceased_registry().await.is_empty());
        assert!(!cache.is_deceased_cached());
    }
}
