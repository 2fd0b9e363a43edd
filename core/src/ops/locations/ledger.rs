//! Plate location ledger
//!
//! The append-only log every current location is derived from. Appending
//! applies no business rules; callers validate first and pass in the
//! transaction they validated under.

use sea_orm::{
	ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
	PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::trace;

use crate::domain::{LocationId, PlateId};
use crate::infra::db::entities::location_assignment;

pub struct LocationLedger;

impl LocationLedger {
	/// Record that `plate_id` now points at `location_id`, or at nothing
	/// when `location_id` is `None`.
	pub async fn append<C: ConnectionTrait>(
		conn: &C,
		plate_id: PlateId,
		location_id: Option<LocationId>,
	) -> Result<location_assignment::Model, DbErr> {
		let entry = location_assignment::ActiveModel {
			plate_id: Set(plate_id),
			location_id: Set(location_id),
			created_at: Set(chrono::Utc::now()),
			..Default::default()
		}
		.insert(conn)
		.await?;

		trace!(
			assignment_id = entry.id,
			plate_id,
			?location_id,
			"Appended ledger entry"
		);

		Ok(entry)
	}

	/// Every entry for one plate, oldest first
	pub async fn history<C: ConnectionTrait>(
		conn: &C,
		plate_id: PlateId,
	) -> Result<Vec<location_assignment::Model>, DbErr> {
		location_assignment::Entity::find()
			.filter(location_assignment::Column::PlateId.eq(plate_id))
			.order_by_asc(location_assignment::Column::Id)
			.all(conn)
			.await
	}

	/// Total number of entries across all plates
	pub async fn len<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
		location_assignment::Entity::find().count(conn).await
	}
}
