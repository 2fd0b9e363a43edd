//! Location assignment entity - one row of the plate location ledger
//!
//! Rows are only ever inserted. A NULL `location_id` records that the plate
//! was vacated.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location_assignments")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	#[sea_orm(indexed)]
	pub plate_id: i32,
	#[sea_orm(indexed, nullable)]
	pub location_id: Option<i32>,
	pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::plate::Entity",
		from = "Column::PlateId",
		to = "super::plate::Column::Id"
	)]
	Plate,
}

impl Related<super::plate::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Plate.def()
	}
}

impl ActiveModelBehavior for ActiveModel {
	fn new() -> Self {
		Self {
			created_at: Set(chrono::Utc::now()),
			..ActiveModelTrait::default()
		}
	}
}

impl Model {
	/// Whether this row records a vacate rather than a placement
	pub fn is_vacate(&self) -> bool {
		self.location_id.is_none()
	}
}
