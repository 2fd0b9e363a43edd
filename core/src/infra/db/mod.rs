//! Database infrastructure using SeaORM

use sea_orm::{
	ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection,
	DatabaseTransaction, DbBackend, DbErr, Statement, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

pub mod entities;
pub mod migration;

/// Database wrapper for the plate location store
pub struct Database {
	/// SeaORM database connection
	conn: DatabaseConnection,

	/// Serialises ledger writers inside this process. `begin_write` covers
	/// writers outside it.
	write_gate: Mutex<()>,
}

impl Database {
	/// Create a new database at the specified path
	pub async fn create(path: &Path) -> Result<Self, DbErr> {
		// Ensure parent directory exists
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.map_err(|e| DbErr::Custom(format!("Failed to create directory: {}", e)))?;
		}

		let db_url = format!("sqlite://{}?mode=rwc", path.display());
		let conn = SeaDatabase::connect(Self::connect_options(db_url)).await?;

		info!("Created new database at {:?}", path);

		Ok(Self::from_connection(conn))
	}

	/// Open an existing database
	pub async fn open(path: &Path) -> Result<Self, DbErr> {
		if !path.exists() {
			return Err(DbErr::Custom(format!(
				"Database does not exist: {}",
				path.display()
			)));
		}

		let db_url = format!("sqlite://{}", path.display());
		let conn = SeaDatabase::connect(Self::connect_options(db_url)).await?;

		info!("Opened database at {:?}", path);

		Ok(Self::from_connection(conn))
	}

	/// Open the database at `path`, creating it when missing
	pub async fn open_or_create(path: &Path) -> Result<Self, DbErr> {
		if path.exists() {
			Self::open(path).await
		} else {
			Self::create(path).await
		}
	}

	fn connect_options(db_url: String) -> ConnectOptions {
		let mut opt = ConnectOptions::new(db_url);
		opt.max_connections(10)
			.min_connections(1)
			.connect_timeout(Duration::from_secs(8))
			.idle_timeout(Duration::from_secs(60))
			.sqlx_logging(false); // We'll use tracing instead
		opt
	}

	fn from_connection(conn: DatabaseConnection) -> Self {
		Self {
			conn,
			write_gate: Mutex::new(()),
		}
	}

	/// Run migrations
	pub async fn migrate(&self) -> Result<(), DbErr> {
		migration::Migrator::up(&self.conn, None).await?;
		info!("Database migrations completed successfully");
		Ok(())
	}

	/// Get the database connection
	pub fn conn(&self) -> &DatabaseConnection {
		&self.conn
	}

	/// Wait for exclusive write access to the ledger.
	///
	/// Hold the guard across the whole check-then-append transaction.
	pub async fn write_gate(&self) -> MutexGuard<'_, ()> {
		self.write_gate.lock().await
	}

	/// Begin a transaction that already holds the SQLite write lock.
	///
	/// A deferred transaction that reads first cannot upgrade to a writer
	/// once another connection has committed, and fails with SQLITE_BUSY
	/// instead of waiting. Writing first makes SQLite wait for the lock
	/// (bounded by the connection's busy timeout) and start from the latest
	/// commit, so checks made afterwards see every other writer's result.
	pub async fn begin_write(&self) -> Result<DatabaseTransaction, DbErr> {
		let txn = self.conn.begin().await?;
		txn.execute(Statement::from_string(
			DbBackend::Sqlite,
			"UPDATE write_lock SET generation = generation + 1 WHERE id = 1",
		))
		.await?;
		Ok(txn)
	}
}
