//! Plate location ledger and occupancy resolver
//!
//! Tracks which storage slot each sample plate is in over time. Slots are
//! carousel coordinates or named special locations. Every move is appended to
//! an immutable ledger and a plate's current location is always derived from
//! it, so no two plates can ever be recorded in the same slot at once.

pub mod config;
pub mod domain;
pub mod infra;
pub mod ops;

use crate::config::AppConfig;
use crate::infra::{db::Database, event::EventBus};
use crate::ops::locations::{
	CarouselInitOutput, GridProjector, LocationGrid, LocationRegistry, LocationResult,
	PlateLocationService,
};
use crate::ops::plates::PlateRegistry;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub use crate::ops::locations::LocationError;

/// The core context: storage, event bus and the services built on them
pub struct Core {
	pub config: AppConfig,
	pub db: Arc<Database>,
	pub events: Arc<EventBus>,
	pub locations: LocationRegistry,
	pub plates: PlateRegistry,
	pub plate_locations: PlateLocationService,
}

impl Core {
	/// Initialize a core from the config found in `data_dir`
	pub async fn new_with_config(data_dir: PathBuf) -> anyhow::Result<Self> {
		info!("Initializing plate location core at {:?}", data_dir);

		let config = AppConfig::load_or_create(&data_dir)?;
		Self::with_config(config).await
	}

	pub async fn with_config(config: AppConfig) -> anyhow::Result<Self> {
		config.ensure_directories()?;

		let db_path = config.database_path();
		let db = Database::open_or_create(&db_path)
			.await
			.with_context(|| format!("Failed to open database at {}", db_path.display()))?;
		db.migrate().await.context("Failed to migrate database")?;
		let db = Arc::new(db);

		let events = Arc::new(EventBus::default());

		Ok(Self {
			locations: LocationRegistry::new(db.clone(), events.clone()),
			plates: PlateRegistry::new(db.clone()),
			plate_locations: PlateLocationService::new(db.clone(), events.clone()),
			config,
			db,
			events,
		})
	}

	/// Occupancy grid over the carousel plus the special locations
	pub async fn grid(&self) -> LocationResult<LocationGrid> {
		GridProjector::build(self.db.conn()).await
	}

	/// Make sure the configured default carousel exists
	pub async fn initialise_carousel(&self) -> LocationResult<CarouselInitOutput> {
		let carousel = self.config.carousel;
		self.locations
			.bulk_initialize_carousel(1..=carousel.carousels, 1..=carousel.hotels)
			.await
	}
}
