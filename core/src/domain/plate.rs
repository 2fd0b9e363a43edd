//! Plate - a sample plate tracked by the ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::{LocationId, LocationKind};

/// Database id of a plate row
pub type PlateId = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plate {
	pub id: PlateId,
	pub barcode: String,
	pub created_at: DateTime<Utc>,
}

/// One row of a plate's location history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
	pub assignment_id: i32,
	/// None for a vacate event
	pub location_id: Option<LocationId>,
	/// None for a vacate event, or when the location has since been deleted
	pub location: Option<LocationKind>,
	pub assigned_at: DateTime<Utc>,
}

impl HistoryEntry {
	pub fn is_vacate(&self) -> bool {
		self.location_id.is_none()
	}
}
