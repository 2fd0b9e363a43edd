//! Current location resolution
//!
//! A plate's current location is the `location_id` of its ledger row with
//! the highest id. Resolution is always batched: one grouped query answers a
//! whole set of plates (or locations), so rendering a full carousel costs a
//! constant number of queries instead of one per cell.
//!
//! Results are returned as plain maps. Callers may hold on to a map for the
//! rest of their request but must not share it across requests, since the
//! ledger can move on underneath it.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, FromQueryResult, Statement, Value};
use std::collections::HashMap;
use tracing::{trace, warn};

use crate::domain::{LocationId, PlateId};

/// SQLite caps bound parameters per statement; stay well below it.
const MAX_BATCH: usize = 400;

#[derive(Debug, FromQueryResult)]
struct LatestAssignment {
	plate_id: i32,
	location_id: Option<i32>,
	assignment_id: i32,
}

/// Current location of each requested plate
pub type CurrentLocations = HashMap<PlateId, Option<LocationId>>;

/// Current occupant of each requested location
pub type Occupants = HashMap<LocationId, Option<PlateId>>;

pub struct CurrentLocationResolver;

impl CurrentLocationResolver {
	/// Resolve the current location of every plate in `plate_ids`.
	///
	/// Every requested plate is present in the result. Plates with no ledger
	/// rows, or whose latest row is a vacate, map to `None`.
	pub async fn resolve_plates<C: ConnectionTrait>(
		conn: &C,
		plate_ids: &[PlateId],
	) -> Result<CurrentLocations, DbErr> {
		let mut current: CurrentLocations = plate_ids.iter().map(|id| (*id, None)).collect();

		let mut requested: Vec<PlateId> = current.keys().copied().collect();
		requested.sort_unstable();

		for chunk in requested.chunks(MAX_BATCH) {
			let sql = format!(
				r#"
				SELECT a.plate_id, a.location_id, a.id AS assignment_id
				FROM location_assignments a
				INNER JOIN (
					SELECT plate_id, MAX(id) AS max_id
					FROM location_assignments
					WHERE plate_id IN ({})
					GROUP BY plate_id
				) latest ON latest.max_id = a.id
				"#,
				placeholders(chunk.len())
			);

			let rows = LatestAssignment::find_by_statement(Statement::from_sql_and_values(
				DbBackend::Sqlite,
				sql,
				chunk.iter().map(|id| Value::from(*id)).collect::<Vec<_>>(),
			))
			.all(conn)
			.await?;

			for row in rows {
				current.insert(row.plate_id, row.location_id);
			}
		}

		trace!(plates = plate_ids.len(), "Resolved current plate locations");

		Ok(current)
	}

	/// Resolve the current occupant of every location in `location_ids`.
	///
	/// Every requested location is present in the result, `None` when no
	/// plate currently points at it.
	pub async fn resolve_locations<C: ConnectionTrait>(
		conn: &C,
		location_ids: &[LocationId],
	) -> Result<Occupants, DbErr> {
		let mut occupants: Occupants = location_ids.iter().map(|id| (*id, None)).collect();
		let mut winning_assignment: HashMap<LocationId, i32> = HashMap::new();

		let mut requested: Vec<LocationId> = occupants.keys().copied().collect();
		requested.sort_unstable();

		for chunk in requested.chunks(MAX_BATCH / 2) {
			// Only plates that have ever been at one of these locations can be
			// there now, so the grouping is restricted to them.
			let sql = format!(
				r#"
				SELECT a.plate_id, a.location_id, a.id AS assignment_id
				FROM location_assignments a
				INNER JOIN (
					SELECT plate_id, MAX(id) AS max_id
					FROM location_assignments
					WHERE plate_id IN (
						SELECT DISTINCT plate_id
						FROM location_assignments
						WHERE location_id IN ({list})
					)
					GROUP BY plate_id
				) latest ON latest.max_id = a.id
				WHERE a.location_id IN ({list})
				"#,
				list = placeholders(chunk.len())
			);

			let values: Vec<Value> = chunk
				.iter()
				.chain(chunk.iter())
				.map(|id| Value::from(*id))
				.collect();

			let rows = LatestAssignment::find_by_statement(Statement::from_sql_and_values(
				DbBackend::Sqlite,
				sql,
				values,
			))
			.all(conn)
			.await?;

			for row in rows {
				let Some(location_id) = row.location_id else {
					continue;
				};

				if let Some(previous) = winning_assignment.get(&location_id) {
					warn!(
						location_id,
						plate_id = row.plate_id,
						"Location resolved to more than one current occupant"
					);
					if *previous > row.assignment_id {
						continue;
					}
				}

				winning_assignment.insert(location_id, row.assignment_id);
				occupants.insert(location_id, Some(row.plate_id));
			}
		}

		trace!(
			locations = location_ids.len(),
			"Resolved current location occupants"
		);

		Ok(occupants)
	}

	/// Current location of a single plate
	pub async fn current_location<C: ConnectionTrait>(
		conn: &C,
		plate_id: PlateId,
	) -> Result<Option<LocationId>, DbErr> {
		Ok(Self::resolve_plates(conn, &[plate_id])
			.await?
			.remove(&plate_id)
			.flatten())
	}

	/// Current occupant of a single location
	pub async fn occupant<C: ConnectionTrait>(
		conn: &C,
		location_id: LocationId,
	) -> Result<Option<PlateId>, DbErr> {
		Ok(Self::resolve_locations(conn, &[location_id])
			.await?
			.remove(&location_id)
			.flatten())
	}
}

fn placeholders(count: usize) -> String {
	vec!["?"; count].join(", ")
}
