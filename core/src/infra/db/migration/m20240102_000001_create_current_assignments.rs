//! Create the current_assignments enforcement table
//!
//! The ledger alone cannot stop two writers from both observing a free
//! location and both appending to it. This table mirrors each plate's
//! latest ledger row and is written in the same transaction as every append.
//! The UNIQUE constraint on `location_id` makes the store reject a second
//! occupant at commit time, and the foreign key to `locations` blocks the
//! deletion of an occupied slot. The resolver never reads it.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

use super::m20240101_000001_initial_schema::{LocationAssignments, Locations, Plates};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(CurrentAssignments::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(CurrentAssignments::PlateId)
							.integer()
							.not_null()
							.primary_key(),
					)
					.col(ColumnDef::new(CurrentAssignments::LocationId).integer())
					.col(
						ColumnDef::new(CurrentAssignments::AssignmentId)
							.integer()
							.not_null(),
					)
					.foreign_key(
						ForeignKey::create()
							.from(CurrentAssignments::Table, CurrentAssignments::PlateId)
							.to(Plates::Table, Plates::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.foreign_key(
						ForeignKey::create()
							.from(CurrentAssignments::Table, CurrentAssignments::LocationId)
							.to(Locations::Table, Locations::Id)
							.on_delete(ForeignKeyAction::Restrict),
					)
					.foreign_key(
						ForeignKey::create()
							.from(CurrentAssignments::Table, CurrentAssignments::AssignmentId)
							.to(LocationAssignments::Table, LocationAssignments::Id)
							.on_delete(ForeignKeyAction::Restrict),
					)
					.to_owned(),
			)
			.await?;

		// At most one current occupant per location. Vacated plates keep a
		// NULL location_id, which the constraint ignores.
		manager
			.create_index(
				Index::create()
					.name("idx_current_assignments_location_unique")
					.table(CurrentAssignments::Table)
					.col(CurrentAssignments::LocationId)
					.unique()
					.to_owned(),
			)
			.await?;

		// Backfill from an existing ledger
		manager
			.get_connection()
			.execute_unprepared(
				r#"
				INSERT INTO current_assignments (plate_id, location_id, assignment_id)
				SELECT a.plate_id, a.location_id, a.id
				FROM location_assignments a
				INNER JOIN (
					SELECT plate_id, MAX(id) AS max_id
					FROM location_assignments
					GROUP BY plate_id
				) latest ON latest.max_id = a.id
				"#,
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(CurrentAssignments::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum CurrentAssignments {
	Table,
	PlateId,
	LocationId,
	AssignmentId,
}
