//! Store Module
//!
//! Local persistence: a keystore of named JSON blobs, the append-only log of
//! submitted weighings, and the operator's session preferences.

mod entry;
mod keystore;
mod prefs;
mod records;

pub use entry::{FormState, StoredEntry, TestEntry, TestPhase, TestStatus, ValidationError, DEFAULT_NOTES};
pub use keystore::KeyStore;
pub use prefs::SessionPrefs;
pub use records::{RecordStore, RECORDS_KEY};
