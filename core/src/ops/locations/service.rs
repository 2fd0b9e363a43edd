//! Plate location service - the only writer of the ledger
//!
//! Each plate is either unassigned or assigned to exactly one location.
//! `assign` and `unassign` are the two transitions. Both run under the
//! database write gate, inside one transaction that holds the SQLite write
//! lock from its first statement, so the occupancy check and the append it
//! guards cannot interleave with another writer in this process or any
//! other. The unique index on `current_assignments` rejects a second
//! occupant should the ledger and that table ever disagree.

use sea_orm::{
	sea_query::OnConflict, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseTransaction,
	DbErr, EntityTrait, QueryFilter,
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info, warn};

use super::error::{LocationError, LocationResult};
use super::ledger::LocationLedger;
use super::occupancy::{Availability, OccupancyValidator};
use super::resolver::CurrentLocationResolver;
use crate::domain::{HistoryEntry, Location, LocationId, PlateId};
use crate::infra::{
	db::{
		entities::{current_assignment, location, location_assignment, plate},
		Database,
	},
	event::{Event, EventBus},
};
use crate::ops::plates::PlateHandle;

/// What `assign` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
	/// A new ledger entry moved the plate
	Moved(location_assignment::Model),
	/// The plate was already there; nothing was written
	Unchanged,
}

impl AssignOutcome {
	pub fn assignment(&self) -> Option<&location_assignment::Model> {
		match self {
			Self::Moved(assignment) => Some(assignment),
			Self::Unchanged => None,
		}
	}
}

pub struct PlateLocationService {
	db: Arc<Database>,
	events: Arc<EventBus>,
}

impl PlateLocationService {
	pub fn new(db: Arc<Database>, events: Arc<EventBus>) -> Self {
		Self { db, events }
	}

	/// Collaborator handle for one plate
	pub fn plate(&self, plate_id: PlateId) -> PlateHandle<'_> {
		PlateHandle::new(self, plate_id)
	}

	/// Move `plate_id` into `location_id`.
	///
	/// Fails with `Occupied` when another plate is there, in which case
	/// nothing is appended. Assigning a plate to the location it already
	/// occupies succeeds without writing.
	pub async fn assign(
		&self,
		plate_id: PlateId,
		location_id: LocationId,
	) -> LocationResult<AssignOutcome> {
		let _gate = self.db.write_gate().await;
		let txn = self.db.begin_write().await?;

		ensure_plate(&txn, plate_id).await?;
		if location::Entity::find_by_id(location_id)
			.one(&txn)
			.await?
			.is_none()
		{
			return Err(LocationError::LocationNotFound(location_id));
		}

		let availability = OccupancyValidator::check_available(&txn, location_id, plate_id).await?;
		match availability.ensure_free(location_id) {
			Err(rejected) => {
				txn.rollback().await?;
				warn!(plate_id, location_id, error = %rejected, "Rejected plate assignment");
				return Err(rejected);
			}
			Ok(Availability::AlreadyHere) => {
				txn.rollback().await?;
				debug!(plate_id, location_id, "Plate already at location");
				return Ok(AssignOutcome::Unchanged);
			}
			Ok(_) => {}
		}

		let assignment = LocationLedger::append(&txn, plate_id, Some(location_id)).await?;

		if let Err(e) = track_current(&txn, plate_id, Some(location_id), assignment.id).await {
			if !LocationError::is_unique_violation(&e) {
				return Err(e.into());
			}

			// The enforcement table holds an occupant the ledger does not show
			let holder = current_assignment::Entity::find()
				.filter(current_assignment::Column::LocationId.eq(location_id))
				.one(&txn)
				.await?;
			txn.rollback().await?;

			let occupant_plate_id = holder.map(|h| h.plate_id).ok_or(LocationError::Database(e))?;
			warn!(
				plate_id,
				location_id, occupant_plate_id, "Location is held in current_assignments but free in the ledger"
			);
			return Err(LocationError::Occupied {
				location_id,
				occupant_plate_id,
			});
		}

		txn.commit().await?;

		info!(
			plate_id,
			location_id,
			assignment_id = assignment.id,
			"Assigned plate to location"
		);
		self.events.emit(Event::PlateAssigned {
			plate_id,
			location_id,
			assignment_id: assignment.id,
		});

		Ok(AssignOutcome::Moved(assignment))
	}

	/// Take `plate_id` out of whatever location it is in.
	///
	/// Always appends a vacate entry, even for a plate that is already
	/// unassigned. Vacating never conflicts.
	pub async fn unassign(&self, plate_id: PlateId) -> LocationResult<location_assignment::Model> {
		let _gate = self.db.write_gate().await;
		let txn = self.db.begin_write().await?;

		ensure_plate(&txn, plate_id).await?;
		let previous = CurrentLocationResolver::current_location(&txn, plate_id).await?;

		let assignment = LocationLedger::append(&txn, plate_id, None).await?;
		track_current(&txn, plate_id, None, assignment.id).await?;

		txn.commit().await?;

		info!(
			plate_id,
			?previous,
			assignment_id = assignment.id,
			"Vacated plate"
		);
		self.events.emit(Event::PlateVacated {
			plate_id,
			assignment_id: assignment.id,
		});

		Ok(assignment)
	}

	/// Where the plate is now, if anywhere
	pub async fn current_location(&self, plate_id: PlateId) -> LocationResult<Option<Location>> {
		let conn = self.db.conn();
		ensure_plate(conn, plate_id).await?;

		let Some(location_id) = CurrentLocationResolver::current_location(conn, plate_id).await?
		else {
			return Ok(None);
		};

		match location::Entity::find_by_id(location_id).one(conn).await? {
			Some(model) => Ok(Some(model.into_domain()?)),
			None => {
				warn!(plate_id, location_id, "Current location no longer exists");
				Ok(None)
			}
		}
	}

	/// The plate's full location history, oldest first
	pub async fn location_history(&self, plate_id: PlateId) -> LocationResult<Vec<HistoryEntry>> {
		let conn = self.db.conn();
		ensure_plate(conn, plate_id).await?;

		let entries = LocationLedger::history(conn, plate_id).await?;

		let mut location_ids: Vec<LocationId> =
			entries.iter().filter_map(|e| e.location_id).collect();
		location_ids.sort_unstable();
		location_ids.dedup();

		let mut kinds = HashMap::new();
		for model in location::Entity::find()
			.filter(location::Column::Id.is_in(location_ids))
			.all(conn)
			.await?
		{
			kinds.insert(model.id, model.location_kind()?);
		}

		Ok(entries
			.into_iter()
			.map(|entry| HistoryEntry {
				assignment_id: entry.id,
				location_id: entry.location_id,
				location: entry.location_id.and_then(|id| kinds.get(&id).cloned()),
				assigned_at: entry.created_at,
			})
			.collect())
	}
}

async fn ensure_plate<C: ConnectionTrait>(conn: &C, plate_id: PlateId) -> LocationResult<()> {
	match plate::Entity::find_by_id(plate_id).one(conn).await? {
		Some(_) => Ok(()),
		None => Err(LocationError::PlateNotFound(plate_id)),
	}
}

/// Mirror the plate's latest ledger entry into the enforcement table
async fn track_current(
	txn: &DatabaseTransaction,
	plate_id: PlateId,
	location_id: Option<LocationId>,
	assignment_id: i32,
) -> Result<(), DbErr> {
	current_assignment::Entity::insert(current_assignment::ActiveModel {
		plate_id: Set(plate_id),
		location_id: Set(location_id),
		assignment_id: Set(assignment_id),
	})
	.on_conflict(
		OnConflict::column(current_assignment::Column::PlateId)
			.update_columns([
				current_assignment::Column::LocationId,
				current_assignment::Column::AssignmentId,
			])
			.to_owned(),
	)
	.exec_without_returning(txn)
	.await?;

	Ok(())
}
