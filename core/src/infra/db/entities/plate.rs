//! Plate entity

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::domain;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plates")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	#[sea_orm(unique)]
	pub barcode: String,
	pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::location_assignment::Entity")]
	LocationAssignment,
}

impl Related<super::location_assignment::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::LocationAssignment.def()
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

impl From<Model> for domain::Plate {
	fn from(model: Model) -> Self {
		Self {
			id: model.id,
			barcode: model.barcode,
			created_at: model.created_at,
		}
	}
}
