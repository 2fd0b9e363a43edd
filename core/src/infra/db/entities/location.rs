//! Location entity
//!
//! Stores the tagged `LocationKind` in flat columns. `kind` says which
//! columns are meaningful; `into_domain` refuses rows where they disagree.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::domain::{self, LocationKind, MAX_POSITION};
use crate::ops::locations::error::{LocationError, LocationResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	#[sea_orm(indexed)]
	pub kind: LocationType,
	pub carousel_position: Option<i32>,
	pub hotel_position: Option<i32>,
	#[sea_orm(unique)]
	pub name: Option<String>,
	pub created_at: DateTimeUtc,
	pub updated_at: DateTimeUtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum LocationType {
	#[sea_orm(string_value = "carousel")]
	Carousel,
	#[sea_orm(string_value = "special")]
	Special,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {
	fn new() -> Self {
		let now = chrono::Utc::now();
		Self {
			created_at: Set(now),
			updated_at: Set(now),
			..ActiveModelTrait::default()
		}
	}
}

impl ActiveModel {
	/// Write every shape column, clearing the ones the kind does not use
	pub fn set_kind(&mut self, kind: &LocationKind) {
		match kind {
			LocationKind::Carousel {
				carousel_position,
				hotel_position,
			} => {
				self.kind = Set(LocationType::Carousel);
				self.carousel_position = Set(Some(*carousel_position));
				self.hotel_position = Set(Some(*hotel_position));
				self.name = Set(None);
			}
			LocationKind::Special { name } => {
				self.kind = Set(LocationType::Special);
				self.carousel_position = Set(None);
				self.hotel_position = Set(None);
				self.name = Set(Some(name.clone()));
			}
		}
	}
}

impl Model {
	/// Rebuild the tagged shape from the stored columns
	pub fn location_kind(&self) -> LocationResult<LocationKind> {
		let corrupt = |reason: &str| LocationError::Corrupt {
			location_id: self.id,
			reason: reason.to_string(),
		};

		match self.kind {
			LocationType::Carousel => {
				if self.name.is_some() {
					return Err(corrupt("carousel location has a name"));
				}
				match (self.carousel_position, self.hotel_position) {
					(Some(carousel), Some(hotel))
						if (1..=MAX_POSITION).contains(&carousel)
							&& (1..=MAX_POSITION).contains(&hotel) =>
					{
						Ok(LocationKind::Carousel {
							carousel_position: carousel,
							hotel_position: hotel,
						})
					}
					_ => Err(corrupt("carousel location is missing a valid coordinate")),
				}
			}
			LocationType::Special => {
				if self.carousel_position.is_some() || self.hotel_position.is_some() {
					return Err(corrupt("special location has coordinates"));
				}
				match &self.name {
					Some(name) if !name.trim().is_empty() => Ok(LocationKind::Special {
						name: name.clone(),
					}),
					_ => Err(corrupt("special location has no name")),
				}
			}
		}
	}

	/// Convert into the domain representation
	pub fn into_domain(self) -> LocationResult<domain::Location> {
		let kind = self.location_kind()?;
		Ok(domain::Location {
			id: self.id,
			label: kind.label(),
			kind,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn model(kind: LocationType) -> Model {
		Model {
			id: 7,
			kind,
			carousel_position: None,
			hotel_position: None,
			name: None,
			created_at: chrono::Utc::now(),
			updated_at: chrono::Utc::now(),
		}
	}

	#[test]
	fn test_carousel_row_round_trips_into_domain() {
		let mut row = model(LocationType::Carousel);
		row.carousel_position = Some(2);
		row.hotel_position = Some(5);

		let location = row.into_domain().unwrap();
		assert_eq!(location.id, 7);
		assert_eq!(location.label, "C2-H5");
	}

	#[test]
	fn test_partially_filled_rows_are_corrupt() {
		let mut row = model(LocationType::Carousel);
		row.carousel_position = Some(2);
		assert!(matches!(
			row.location_kind(),
			Err(LocationError::Corrupt { location_id: 7, .. })
		));

		let mut row = model(LocationType::Special);
		row.name = Some("Imager".to_string());
		row.hotel_position = Some(1);
		assert!(row.location_kind().is_err());

		assert!(model(LocationType::Special).location_kind().is_err());
	}

	#[test]
	fn test_out_of_range_coordinates_are_corrupt() {
		let mut row = model(LocationType::Carousel);
		row.carousel_position = Some(1);
		row.hotel_position = Some(MAX_POSITION + 1);
		assert!(matches!(
			row.location_kind(),
			Err(LocationError::Corrupt { location_id: 7, .. })
		));
	}

	#[test]
	fn test_set_kind_clears_unused_columns() {
		let mut active = ActiveModel::new();
		active.set_kind(&LocationKind::Special {
			name: "Imager".to_string(),
		});
		assert_eq!(active.carousel_position, Set(None));
		assert_eq!(active.hotel_position, Set(None));
		assert_eq!(active.name, Set(Some("Imager".to_string())));
	}
}
