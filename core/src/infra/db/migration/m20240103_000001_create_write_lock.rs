//! Create the write_lock table
//!
//! A single row that every ledger write transaction bumps as its first
//! statement. SQLite takes the database write lock at that point and waits
//! out other writers through the busy timeout, so the occupancy check that
//! follows always reads the latest committed ledger.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(WriteLock::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(WriteLock::Id)
							.integer()
							.not_null()
							.primary_key(),
					)
					.col(
						ColumnDef::new(WriteLock::Generation)
							.big_integer()
							.not_null()
							.default(0),
					)
					.to_owned(),
			)
			.await?;

		manager
			.get_connection()
			.execute_unprepared("INSERT INTO write_lock (id, generation) VALUES (1, 0)")
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(WriteLock::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum WriteLock {
	Table,
	Id,
	Generation,
}
