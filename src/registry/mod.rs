//! Registry Module
//!
//! Loads the external animal registry and the deceased registry (both CSV
//! feeds) into a session cache shared by the matcher and the lookup controller.

mod animal;
pub mod columns;
mod loader;
mod normalize;
pub mod parse;
mod source;

pub use animal::RegistryAnimal;
pub use loader::RegistryCache;
pub use normalize::normalize_id;
pub use source::{CsvSource, HttpCsvSource, StaticCsvSource};
