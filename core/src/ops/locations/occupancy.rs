//! Occupancy validation
//!
//! Decides whether a plate may move into a location. A conflict is a hard
//! rejection: callers must not append to the ledger after one.

use sea_orm::{ConnectionTrait, DbErr};

use super::error::{LocationError, LocationResult};
use super::resolver::CurrentLocationResolver;
use crate::domain::{LocationId, PlateId};

/// Outcome of checking a candidate location for a plate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
	/// Nobody is there
	Available,
	/// The requesting plate is already there; moving is a no-op
	AlreadyHere,
	/// Another plate holds the location
	Conflict { occupant_plate_id: PlateId },
}

impl Availability {
	/// Turn a conflict into `LocationError::Occupied`
	pub fn ensure_free(self, location_id: LocationId) -> LocationResult<Self> {
		match self {
			Self::Conflict { occupant_plate_id } => Err(LocationError::Occupied {
				location_id,
				occupant_plate_id,
			}),
			other => Ok(other),
		}
	}
}

pub struct OccupancyValidator;

impl OccupancyValidator {
	/// Check whether `requesting_plate` may be placed at `candidate`.
	///
	/// Run this on the same transaction that will append the ledger row.
	pub async fn check_available<C: ConnectionTrait>(
		conn: &C,
		candidate: LocationId,
		requesting_plate: PlateId,
	) -> Result<Availability, DbErr> {
		let availability = match CurrentLocationResolver::occupant(conn, candidate).await? {
			None => Availability::Available,
			Some(occupant) if occupant == requesting_plate => Availability::AlreadyHere,
			Some(occupant_plate_id) => Availability::Conflict { occupant_plate_id },
		};

		Ok(availability)
	}
}
