use serde::{Deserialize, Serialize};

/// One row of the external animal registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryAnimal {
    pub id: String,
    pub breed: String,
    pub mother: String,
    pub father: String,
    pub birth_date: String,
    /// Set by the matcher from the deceased registry, never by the feed itself
    #[serde(default)]
    pub is_deceased: bool,
}

impl RegistryAnimal {
    /// Breed used when an id is only known from the deceased registry
    pub const UNKNOWN_BREED: &'static str = "Desconocida";
    /// Placeholder for missing lineage fields
    pub const PLACEHOLDER: &'static str = "-";

    /// Stand-in for an animal that appears in the deceased registry but not in
    /// the main registry.
    pub fn unknown_deceased(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            breed: Self::UNKNOWN_BREED.to_string(),
            mother: Self::PLACEHOLDER.to_string(),
            father: Self::PLACEHOLDER.to_string(),
            birth_date: Self::PLACEHOLDER.to_string(),
            is_deceased: true,
        }
    }

    pub fn with_deceased(mut self, is_deceased: bool) -> Self {
        self.is_deceased = is_deceased;
        self
    }
}
