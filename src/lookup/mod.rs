//! Lookup Module
//!
//! Live suggestions for a partially typed tattoo number and the debounced
//! exact-match lookup that autofills lineage fields.

mod controller;
mod matcher;

pub use controller::{LookupController, LookupResolution, LookupState, ResolutionKind, DEFAULT_DEBOUNCE};
pub use matcher::{AnimalMatcher, MAX_SUGGESTIONS};
