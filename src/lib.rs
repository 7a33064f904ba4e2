//! Livestock Weigh Station
//!
//! Weigh-in / weigh-out data entry for feeding tests:
//! - Animal registry and deceased registry loaded from CSV feeds
//! - Tattoo normalization, live suggestions and debounced exact lookup
//! - Append-only local record store with optional remote sync
//! - Quoted CSV reports
//! - Optional AI assist for notes

pub mod assist;
pub mod config;
pub mod export;
pub mod lookup;
pub mod registry;
pub mod station;
pub mod store;
pub mod sync;
pub mod telemetry;

// Re-exports for convenience
pub use config::StationConfig;
pub use lookup::{AnimalMatcher, LookupController};
pub use registry::{normalize_id, RegistryCache};
pub use station::{StationParts, SubmitOutcome, WeighStation};
pub use store::RecordStore;
