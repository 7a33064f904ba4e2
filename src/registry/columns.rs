//! Fixed column layout of the two external feeds.
//!
//! The sheets are maintained by hand upstream; any column shuffle there only
//! needs to be reflected here.

/// Column offsets of the main registry feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryColumns {
    pub birth_date: usize,
    pub id: usize,
    pub father: usize,
    pub mother: usize,
    pub breed: usize,
}

/// Rows too short to carry an id are skipped
pub const REGISTRY_MIN_COLUMNS: usize = REGISTRY_COLUMNS.id + 1;

pub const REGISTRY_COLUMNS: RegistryColumns = RegistryColumns {
    birth_date: 0, // A
    id: 1,         // B
    father: 5,     // F
    mother: 6,     // G
    breed: 9,      // J
};

/// Each deceased row carries up to four ids (columns B, D, F, H).
pub const DECEASED_ID_COLUMNS: [usize; 4] = [1, 3, 5, 7];
