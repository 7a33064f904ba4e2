use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::keystore::KeyStore;

const PREFIX_KEY: &str = "last_tattoo_prefix";
const SHED_KEY: &str = "last_shed";
const PEN_KEY: &str = "last_pen";

/// Location settings remembered between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPrefs {
    pub tattoo_prefix: String,
    pub shed: String,
    pub pen: String,
}

impl SessionPrefs {
    /// Missing keys come back empty.
    pub async fn load(store: &KeyStore) -> Result<Self> {
        Ok(Self {
            tattoo_prefix: store.get_json(PREFIX_KEY).await?.unwrap_or_default(),
            shed: store.get_json(SHED_KEY).await?.unwrap_or_default(),
            pen: store.get_json(PEN_KEY).await?.unwrap_or_default(),
        })
    }

    pub async fn save(&self, store: &KeyStore) -> Result<()> {
        store.set_json(PREFIX_KEY, &self.tattoo_prefix).await?;
        store.set_json(SHED_KEY, &self.shed).await?;
        store.set_json(PEN_KEY, &self.pen).await?;
        Ok(())
    }
}
