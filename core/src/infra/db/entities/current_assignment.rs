//! Current assignment entity
//!
//! Enforcement index kept in step with the ledger inside each write
//! transaction. Its unique `location_id` is what stops two plates from
//! committing into the same slot; reads derive state from the ledger instead.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "current_assignments")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub plate_id: i32,
	#[sea_orm(unique, nullable)]
	pub location_id: Option<i32>,
	pub assignment_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::plate::Entity",
		from = "Column::PlateId",
		to = "super::plate::Column::Id"
	)]
	Plate,
	#[sea_orm(
		belongs_to = "super::location::Entity",
		from = "Column::LocationId",
		to = "super::location::Column::Id"
	)]
	Location,
}

impl Related<super::plate::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Plate.def()
	}
}

impl Related<super::location::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Location.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
