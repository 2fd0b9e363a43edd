//! Initial database schema
//!
//! Creates the plate, location and ledger tables. The ledger
//! (`location_assignments`) is append-only: rows are never updated or
//! deleted, and its `location_id` has no foreign key so that
//! history survives the removal of an unoccupied location.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		// Create plates table
		manager
			.create_table(
				Table::create()
					.table(Plates::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Plates::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(
						ColumnDef::new(Plates::Barcode)
							.string()
							.not_null()
							.unique_key(),
					)
					.col(
						ColumnDef::new(Plates::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.to_owned(),
			)
			.await?;

		// Create locations table
		manager
			.create_table(
				Table::create()
					.table(Locations::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Locations::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Locations::Kind).string().not_null())
					.col(ColumnDef::new(Locations::CarouselPosition).integer())
					.col(ColumnDef::new(Locations::HotelPosition).integer())
					.col(ColumnDef::new(Locations::Name).string())
					.col(
						ColumnDef::new(Locations::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(Locations::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.to_owned(),
			)
			.await?;

		// One carousel slot per coordinate pair. Special slots leave both
		// columns NULL, which SQLite never treats as equal.
		manager
			.create_index(
				Index::create()
					.name("idx_locations_coordinate_unique")
					.table(Locations::Table)
					.col(Locations::CarouselPosition)
					.col(Locations::HotelPosition)
					.unique()
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_locations_name_unique")
					.table(Locations::Table)
					.col(Locations::Name)
					.unique()
					.to_owned(),
			)
			.await?;

		// Create location_assignments table (the ledger)
		manager
			.create_table(
				Table::create()
					.table(LocationAssignments::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(LocationAssignments::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(
						ColumnDef::new(LocationAssignments::PlateId)
							.integer()
							.not_null(),
					)
					.col(ColumnDef::new(LocationAssignments::LocationId).integer())
					.col(
						ColumnDef::new(LocationAssignments::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.foreign_key(
						ForeignKey::create()
							.from(LocationAssignments::Table, LocationAssignments::PlateId)
							.to(Plates::Table, Plates::Id)
							.on_delete(ForeignKeyAction::Restrict),
					)
					.to_owned(),
			)
			.await?;

		// Serves the per-plate MAX(id) lookup of the resolver
		manager
			.create_index(
				Index::create()
					.name("idx_location_assignments_plate_id")
					.table(LocationAssignments::Table)
					.col(LocationAssignments::PlateId)
					.col(LocationAssignments::Id)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_location_assignments_location_id")
					.table(LocationAssignments::Table)
					.col(LocationAssignments::LocationId)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(LocationAssignments::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Locations::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Plates::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
pub(super) enum Plates {
	Table,
	Id,
	Barcode,
	CreatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Locations {
	Table,
	Id,
	Kind,
	CarouselPosition,
	HotelPosition,
	Name,
	CreatedAt,
	UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum LocationAssignments {
	Table,
	Id,
	PlateId,
	LocationId,
	CreatedAt,
}
