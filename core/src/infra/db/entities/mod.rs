//! Sea-ORM entity definitions
//!
//! These map our domain models to database tables.

pub mod current_assignment;
pub mod location;
pub mod location_assignment;
pub mod plate;
