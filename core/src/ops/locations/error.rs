//! Location and ledger errors

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::domain::{LocationId, PlateId};

/// Errors raised by the registry, the resolver and the plate location service.
///
/// All of them are returned to the caller; nothing here is retried.
#[derive(Error, Debug)]
pub enum LocationError {
	/// Malformed location shape, rejected before touching the store
	#[error("Invalid location: {0}")]
	Validation(String),

	/// The target location is held by another plate
	#[error("Location {location_id} is occupied by plate {occupant_plate_id}")]
	Occupied {
		location_id: LocationId,
		occupant_plate_id: PlateId,
	},

	/// An occupied location cannot be deleted
	#[error("Location {location_id} cannot be deleted while plate {occupant_plate_id} occupies it")]
	DeletionBlocked {
		location_id: LocationId,
		occupant_plate_id: PlateId,
	},

	#[error("Location not found: {0}")]
	LocationNotFound(LocationId),

	#[error("Plate not found: {0}")]
	PlateNotFound(PlateId),

	/// Another location already has these coordinates or this name
	#[error("Location already exists: {0}")]
	DuplicateLocation(String),

	/// Another plate already has this barcode
	#[error("Plate already exists: {0}")]
	DuplicatePlate(String),

	/// A stored location row does not describe a valid shape
	#[error("Location {location_id} is corrupt: {reason}")]
	Corrupt {
		location_id: LocationId,
		reason: String,
	},

	#[error("Database error: {0}")]
	Database(#[from] DbErr),
}

impl LocationError {
	/// Whether the store rejected a write on a unique constraint
	pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
		matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
	}

	/// Whether the store rejected a write on a foreign key
	pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
		matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
	}
}

/// Result type for location operations
pub type LocationResult<T> = Result<T, LocationError>;
