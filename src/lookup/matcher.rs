use std::sync::Arc;

use tracing::debug;

use crate::registry::{normalize_id, RegistryAnimal, RegistryCache};

/// Upper bound on live suggestions
pub const MAX_SUGGESTIONS: usize = 5;

/// Searches the cached registry, annotating hits with deceased status.
#[derive(Clone)]
pub struct AnimalMatcher {
    cache: Arc<RegistryCache>,
}

impl AnimalMatcher {
    pub fn new(cache: Arc<RegistryCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<RegistryCache> {
        &self.cache
    }

    /// Suggestions for a partially typed number under the session prefix.
    ///
    /// A row matches when its canonical id contains either the canonical
    /// `prefix + query` or the canonical query alone, so operators who type
    /// the full tattoo (prefix included) still get hits. Rows under the
    /// session prefix come first; at most [`MAX_SUGGESTIONS`] are returned.
    pub async fn search_animals(&self, query: &str, prefix: &str) -> Vec<RegistryAnimal> {
        let simple = normalize_id(query);
        if query.trim().is_empty() || simple.is_empty() {
            return Vec::new();
        }

        let registry = self.cache.load_registry().await;
        let deceased = self.cache.load_deceased_registry().await;

        let combined = normalize_id(&format!("{prefix}{query}"));
        let prefix_key = normalize_id(prefix);

        let mut matches: Vec<(bool, RegistryAnimal)> = registry
            .iter()
            .filter_map(|animal| {
                let key = normalize_id(&animal.id);
                if key.is_empty() || !(key.contains(&combined) || key.contains(&simple)) {
                    return None;
                }
                let under_prefix = key.starts_with(&prefix_key);
                let is_deceased = deceased.contains(&key);
                Some((under_prefix, animal.clone().with_deceased(is_deceased)))
            })
            .collect();

        // Stable: keeps feed order within each group
        matches.sort_by_key(|(under_prefix, _)| !*under_prefix);
        matches.truncate(MAX_SUGGESTIONS);

        debug!("{} suggestions for {:?} under prefix {:?}", matches.len(), query, prefix);
        matches.into_iter().map(|(_, animal)| animal).collect()
    }

    /// Exact match on the canonical id.
    ///
    /// The deceased registry is consulted first: an id listed there always
    /// comes back flagged, with registry lineage when the main feed knows the
    /// animal and placeholders otherwise.
    pub async fn lookup_animal(&self, full_id: &str) -> Option<RegistryAnimal> {
        let target = normalize_id(full_id);
        if target.is_empty() {
            return None;
        }

        let registry = self.cache.load_registry().await;
        let deceased = self.cache.load_deceased_registry().await;

        let found = registry
            .iter()
            .find(|animal| !animal.id.is_empty() && normalize_id(&animal.id) == target)
            .cloned();

        if deceased.contains(&target) {
            return Some(match found {
                Some(animal) => animal.with_deceased(true),
                None => RegistryAnimal::unknown_deceased(full_id),
            });
        }

        found.map(|animal| animal.with_deceased(false))
    }
}
