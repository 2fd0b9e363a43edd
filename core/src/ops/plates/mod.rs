//! Plate records
//!
//! Only what the ledger needs: an id to hang assignments on and a unique
//! barcode.

mod handle;

use sea_orm::{
	ActiveModelBehavior, ActiveModelTrait, ActiveValue::Set, EntityTrait, QueryOrder,
};
use std::sync::Arc;
use tracing::info;

pub use handle::PlateHandle;

use crate::domain::{Plate, PlateId};
use crate::infra::db::{entities::plate, Database};
use crate::ops::locations::error::{LocationError, LocationResult};

pub struct PlateRegistry {
	db: Arc<Database>,
}

impl PlateRegistry {
	pub fn new(db: Arc<Database>) -> Self {
		Self { db }
	}

	/// Register a plate. The barcode is trimmed and must be unique.
	pub async fn create(&self, barcode: &str) -> LocationResult<Plate> {
		let barcode = barcode.trim();
		if barcode.is_empty() {
			return Err(LocationError::Validation(
				"plate barcode must not be empty".to_string(),
			));
		}

		let mut active = plate::ActiveModel::new();
		active.barcode = Set(barcode.to_string());

		let model = active.insert(self.db.conn()).await.map_err(|e| {
			if LocationError::is_unique_violation(&e) {
				LocationError::DuplicatePlate(barcode.to_string())
			} else {
				LocationError::Database(e)
			}
		})?;

		info!(plate_id = model.id, barcode, "Registered plate");

		Ok(model.into())
	}

	pub async fn get(&self, id: PlateId) -> LocationResult<Plate> {
		plate::Entity::find_by_id(id)
			.one(self.db.conn())
			.await?
			.map(Plate::from)
			.ok_or(LocationError::PlateNotFound(id))
	}

	pub async fn list(&self) -> LocationResult<Vec<Plate>> {
		Ok(plate::Entity::find()
			.order_by_asc(plate::Column::Id)
			.all(self.db.conn())
			.await?
			.into_iter()
			.map(Plate::from)
			.collect())
	}
}
