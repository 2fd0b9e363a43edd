//! Occupancy grid projection
//!
//! Renders the whole carousel as a dense `hotel -> carousel -> cell` map over
//! the bounding box of the carousel slots that exist, plus a flat list of the
//! special slots. Occupants are resolved in two batched resolver calls no
//! matter how big the carousel is.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::error::LocationResult;
use super::resolver::CurrentLocationResolver;
use crate::domain::{LocationId, LocationKind, PlateId};
use crate::infra::db::entities::location;

/// One slot in the rendered grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
	/// None when the coordinate falls inside the box but has no location row
	pub location_id: Option<LocationId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub carousel_position: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hotel_position: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub occupant_plate_id: Option<PlateId>,
}

impl GridCell {
	fn empty(carousel_position: i32, hotel_position: i32) -> Self {
		Self {
			location_id: None,
			carousel_position: Some(carousel_position),
			hotel_position: Some(hotel_position),
			name: None,
			occupant_plate_id: None,
		}
	}

	fn for_location(id: LocationId, kind: &LocationKind) -> Self {
		match kind {
			LocationKind::Carousel {
				carousel_position,
				hotel_position,
			} => Self {
				location_id: Some(id),
				..Self::empty(*carousel_position, *hotel_position)
			},
			LocationKind::Special { name } => Self {
				location_id: Some(id),
				carousel_position: None,
				hotel_position: None,
				name: Some(name.clone()),
				occupant_plate_id: None,
			},
		}
	}

	pub fn is_occupied(&self) -> bool {
		self.occupant_plate_id.is_some()
	}
}

/// Dense carousel grid keyed by hotel, then carousel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarouselGrid(BTreeMap<i32, BTreeMap<i32, GridCell>>);

impl CarouselGrid {
	pub fn rows(&self) -> &BTreeMap<i32, BTreeMap<i32, GridCell>> {
		&self.0
	}

	pub fn cell(&self, carousel_position: i32, hotel_position: i32) -> Option<&GridCell> {
		self.0.get(&hotel_position)?.get(&carousel_position)
	}

	pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
		self.0.values().flat_map(|row| row.values())
	}

	pub fn len(&self) -> usize {
		self.0.values().map(BTreeMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn cell_mut(&mut self, carousel_position: i32, hotel_position: i32) -> Option<&mut GridCell> {
		self.0.get_mut(&hotel_position)?.get_mut(&carousel_position)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationGrid {
	/// None when no carousel slots exist
	pub carousel_grid: Option<CarouselGrid>,
	pub special_locations: Vec<GridCell>,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
	carousels: (i32, i32),
	hotels: (i32, i32),
}

impl Bounds {
	fn around(points: impl IntoIterator<Item = (i32, i32)>) -> Option<Self> {
		points.into_iter().fold(None, |bounds, (c, h)| {
			Some(match bounds {
				None => Bounds {
					carousels: (c, c),
					hotels: (h, h),
				},
				Some(Bounds { carousels, hotels }) => Bounds {
					carousels: (carousels.0.min(c), carousels.1.max(c)),
					hotels: (hotels.0.min(h), hotels.1.max(h)),
				},
			})
		})
	}
}

pub struct GridProjector;

impl GridProjector {
	pub async fn build<C: ConnectionTrait>(conn: &C) -> LocationResult<LocationGrid> {
		let carousel_rows = location::Entity::find()
			.filter(location::Column::Kind.eq(location::LocationType::Carousel))
			.all(conn)
			.await?;

		let mut carousel_slots = Vec::with_capacity(carousel_rows.len());
		for row in carousel_rows {
			if let LocationKind::Carousel {
				carousel_position,
				hotel_position,
			} = row.location_kind()?
			{
				carousel_slots.push((row.id, carousel_position, hotel_position));
			}
		}

		let carousel_grid = match Bounds::around(carousel_slots.iter().map(|(_, c, h)| (*c, *h))) {
			None => None,
			Some(bounds) => {
				let mut grid = CarouselGrid::default();
				for hotel in bounds.hotels.0..=bounds.hotels.1 {
					let row = grid.0.entry(hotel).or_default();
					for carousel in bounds.carousels.0..=bounds.carousels.1 {
						row.insert(carousel, GridCell::empty(carousel, hotel));
					}
				}

				let ids: Vec<LocationId> = carousel_slots.iter().map(|(id, _, _)| *id).collect();
				let occupants = CurrentLocationResolver::resolve_locations(conn, &ids).await?;

				for (id, carousel, hotel) in &carousel_slots {
					if let Some(cell) = grid.cell_mut(*carousel, *hotel) {
						cell.location_id = Some(*id);
						cell.occupant_plate_id = occupants.get(id).copied().flatten();
					}
				}

				debug!(
					carousels = ?bounds.carousels,
					hotels = ?bounds.hotels,
					slots = carousel_slots.len(),
					"Projected carousel grid"
				);
				Some(grid)
			}
		};

		let special_rows = location::Entity::find()
			.filter(location::Column::Kind.eq(location::LocationType::Special))
			.order_by_asc(location::Column::Name)
			.all(conn)
			.await?;

		let special_ids: Vec<LocationId> = special_rows.iter().map(|row| row.id).collect();
		let special_occupants = CurrentLocationResolver::resolve_locations(conn, &special_ids).await?;

		let mut special_locations = Vec::with_capacity(special_rows.len());
		for row in special_rows {
			let mut cell = GridCell::for_location(row.id, &row.location_kind()?);
			cell.occupant_plate_id = special_occupants.get(&row.id).copied().flatten();
			special_locations.push(cell);
		}

		Ok(LocationGrid {
			carousel_grid,
			special_locations,
		})
	}
}
