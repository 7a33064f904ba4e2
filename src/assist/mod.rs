//! Assist Module
//!
//! Optional AI help for the notes field: condensing free text and producing a
//! short diagnostic from an animal snapshot.

mod assistant;
mod provider;

pub use assistant::{AnimalSnapshot, Assistant, EMPTY_FALLBACK, ERROR_FALLBACK};
pub use provider::{build_provider, LLMProvider, OllamaProvider, OpenAICompatibleProvider};
