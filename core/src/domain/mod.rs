//! Core domain models
//!
//! - Location is a storage slot, either a carousel coordinate or a named slot
//! - Plate is the sample plate that moves between slots
//! - Where a plate *is* never lives here: it is derived from the ledger

pub mod location;
pub mod plate;

// Re-export commonly used types
pub use location::{Location, LocationId, LocationInput, LocationKind, MAX_POSITION};
pub use plate::{HistoryEntry, Plate, PlateId};
