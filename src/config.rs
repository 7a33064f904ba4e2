//! Station configuration, read from the environment (and `.env`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::lookup::DEFAULT_DEBOUNCE;

const DEFAULT_REGISTRY_URL: &str = "https://docs.google.com/spreadsheets/d/1caHz2oGQUzpOCdkJlzLYk7aLAdGk5La5c948Z_y87MI/export?format=csv&gid=2118275156";
const DEFAULT_DECEASED_URL: &str =
    "https://docs.google.com/spreadsheets/d/1oLCMGGMg6yzOPaRPUrVamLUjPXEKk0S814iOoxYoevc/export?format=csv&gid=0";
const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Which text-generation backend the assistant talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistBackend {
    Disabled,
    /// Local Ollama daemon on its default port
    Ollama,
    OpenAICompatible {
        base_url: String,
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct StationConfig {
    /// CSV export of the animal registry
    pub registry_url: String,
    /// CSV export of the deceased registry
    pub deceased_url: String,
    /// Keystore directory (records + session preferences)
    pub data_dir: PathBuf,
    /// Where CSV reports are written
    pub export_dir: PathBuf,
    /// Optional endpoint receiving every stored entry
    pub sync_url: Option<String>,
    pub debounce: Duration,
    pub assist: AssistBackend,
    pub assist_model: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            deceased_url: DEFAULT_DECEASED_URL.to_string(),
            data_dir: PathBuf::from("weighin_data"),
            export_dir: PathBuf::from("."),
            sync_url: None,
            debounce: DEFAULT_DEBOUNCE,
            assist: AssistBackend::Disabled,
            assist_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl StationConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let debounce = match get("WEIGHIN_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .with_context(|| format!("WEIGHIN_DEBOUNCE_MS must be milliseconds, got {:?}", raw))?,
            ),
            None => defaults.debounce,
        };

        let use_ollama = match get("WEIGHIN_OLLAMA") {
            Some(raw) => parse_flag(&raw).with_context(|| format!("WEIGHIN_OLLAMA must be a boolean, got {:?}", raw))?,
            None => false,
        };

        let assist = match get("WEIGHIN_LLM_URL") {
            Some(base_url) => AssistBackend::OpenAICompatible {
                base_url,
                api_key: get("WEIGHIN_LLM_API_KEY"),
            },
            None if use_ollama => AssistBackend::Ollama,
            None => AssistBackend::Disabled,
        };

        Ok(Self {
            registry_url: get("WEIGHIN_REGISTRY_URL").unwrap_or(defaults.registry_url),
            deceased_url: get("WEIGHIN_DECEASED_URL").unwrap_or(defaults.deceased_url),
            data_dir: get("WEIGHIN_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            export_dir: get("WEIGHIN_EXPORT_DIR").map(PathBuf::from).unwrap_or(defaults.export_dir),
            sync_url: get("WEIGHIN_SYNC_URL"),
            debounce,
            assist,
            assist_model: get("WEIGHIN_LLM_MODEL").unwrap_or(defaults.assist_model),
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("not a boolean"),
    }
}
