//! Database migrations

use sea_orm_migration::prelude::*;

mod m20240101_000001_initial_schema;
mod m20240102_000001_create_current_assignments;
mod m20240103_000001_create_write_lock;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
	fn migrations() -> Vec<Box<dyn MigrationTrait>> {
		vec![
			Box::new(m20240101_000001_initial_schema::Migration),
			Box::new(m20240102_000001_create_current_assignments::Migration),
			Box::new(m20240103_000001_create_write_lock::Migration),
		]
	}
}
