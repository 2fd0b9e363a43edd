//! Plate location ledger
//!
//! - `ledger` appends and reads assignment rows
//! - `resolver` derives current state from them
//! - `occupancy` decides whether a move is allowed
//! - `service` is the only writer of the ledger
//! - `registry` manages the slots themselves
//! - `grid` projects the carousel for rendering

pub mod error;
pub mod grid;
pub mod ledger;
pub mod occupancy;
pub mod registry;
pub mod resolver;
pub mod service;

pub use error::{LocationError, LocationResult};
pub use grid::{CarouselGrid, GridCell, GridProjector, LocationGrid};
pub use ledger::LocationLedger;
pub use occupancy::{Availability, OccupancyValidator};
pub use registry::{CarouselInitOutput, LocationRegistry, OccupiedLocation};
pub use resolver::{CurrentLocationResolver, CurrentLocations, Occupants};
pub use service::{AssignOutcome, PlateLocationService};
