//! Location registry - storage slot metadata
//!
//! Creating, editing and deleting slots, plus idempotent bulk creation of a
//! rectangular carousel. Deletion is the only operation here that has to
//! consult the ledger, because an occupied slot may not disappear.

use sea_orm::{
	sea_query::OnConflict, ActiveModelBehavior, ActiveModelTrait, ActiveValue::Set, ColumnTrait,
	Condition, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, ops::RangeInclusive, sync::Arc};
use tracing::{debug, info, warn};

use super::error::{LocationError, LocationResult};
use super::resolver::CurrentLocationResolver;
use crate::domain::{Location, LocationId, LocationKind, PlateId, MAX_POSITION};
use crate::infra::{
	db::{
		entities::{current_assignment, location},
		Database,
	},
	event::{Event, EventBus},
};

/// Rows per INSERT when initialising a carousel
const INSERT_CHUNK: usize = 100;

/// A location together with the plate currently in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedLocation {
	#[serde(flatten)]
	pub location: Location,
	pub occupant_plate_id: Option<PlateId>,
}

/// Result of a carousel initialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselInitOutput {
	/// Locations that did not exist before
	pub created: usize,
	/// Coordinate pairs covered by the requested ranges
	pub total: usize,
}

pub struct LocationRegistry {
	db: Arc<Database>,
	events: Arc<EventBus>,
}

impl LocationRegistry {
	pub fn new(db: Arc<Database>, events: Arc<EventBus>) -> Self {
		Self { db, events }
	}

	/// Register a new storage slot
	pub async fn create(&self, kind: LocationKind) -> LocationResult<Location> {
		kind.validate()?;

		let mut active = location::ActiveModel::new();
		active.set_kind(&kind);

		let model = active
			.insert(self.db.conn())
			.await
			.map_err(|e| duplicate_or(e, &kind))?;

		info!(location_id = model.id, label = %kind, "Created location");

		self.events.emit(Event::LocationCreated {
			location_id: model.id,
			kind,
		});

		model.into_domain()
	}

	/// Change the shape or coordinates of a slot.
	///
	/// Allowed for occupied slots too: the occupant is tied to the location
	/// id, so it moves with the record.
	pub async fn update(&self, id: LocationId, kind: LocationKind) -> LocationResult<Location> {
		kind.validate()?;

		let existing = location::Entity::find_by_id(id)
			.one(self.db.conn())
			.await?
			.ok_or(LocationError::LocationNotFound(id))?;

		let mut active: location::ActiveModel = existing.into();
		active.set_kind(&kind);
		active.updated_at = Set(chrono::Utc::now());

		let model = active
			.update(self.db.conn())
			.await
			.map_err(|e| duplicate_or(e, &kind))?;

		info!(location_id = id, label = %kind, "Updated location");

		self.events.emit(Event::LocationUpdated {
			location_id: id,
			kind,
		});

		model.into_domain()
	}

	/// Remove a slot. Fails with `DeletionBlocked` while a plate occupies it.
	pub async fn delete(&self, id: LocationId) -> LocationResult<()> {
		let _gate = self.db.write_gate().await;
		let txn = self.db.begin_write().await?;

		if location::Entity::find_by_id(id).one(&txn).await?.is_none() {
			txn.rollback().await?;
			return Err(LocationError::LocationNotFound(id));
		}

		if let Some(occupant_plate_id) = CurrentLocationResolver::occupant(&txn, id).await? {
			txn.rollback().await?;
			warn!(
				location_id = id,
				occupant_plate_id, "Refused to delete occupied location"
			);
			return Err(LocationError::DeletionBlocked {
				location_id: id,
				occupant_plate_id,
			});
		}

		if let Err(e) = location::Entity::delete_by_id(id).exec(&txn).await {
			if LocationError::is_foreign_key_violation(&e) {
				// The enforcement table still points here
				let occupant = current_assignment::Entity::find()
					.filter(current_assignment::Column::LocationId.eq(id))
					.one(&txn)
					.await?;
				txn.rollback().await?;
				return Err(match occupant {
					Some(current) => LocationError::DeletionBlocked {
						location_id: id,
						occupant_plate_id: current.plate_id,
					},
					None => LocationError::Database(e),
				});
			}
			return Err(e.into());
		}

		txn.commit().await?;

		info!(location_id = id, "Deleted location");
		self.events.emit(Event::LocationDeleted { location_id: id });

		Ok(())
	}

	pub async fn get(&self, id: LocationId) -> LocationResult<Location> {
		location::Entity::find_by_id(id)
			.one(self.db.conn())
			.await?
			.ok_or(LocationError::LocationNotFound(id))?
			.into_domain()
	}

	/// A slot together with its current occupant
	pub async fn get_with_occupant(&self, id: LocationId) -> LocationResult<OccupiedLocation> {
		let location = self.get(id).await?;
		let occupant_plate_id = CurrentLocationResolver::occupant(self.db.conn(), id).await?;

		Ok(OccupiedLocation {
			location,
			occupant_plate_id,
		})
	}

	/// All slots: carousel slots by coordinate, then special slots by name
	pub async fn list(&self) -> LocationResult<Vec<Location>> {
		location::Entity::find()
			.order_by_asc(location::Column::Kind)
			.order_by_asc(location::Column::CarouselPosition)
			.order_by_asc(location::Column::HotelPosition)
			.order_by_asc(location::Column::Name)
			.all(self.db.conn())
			.await?
			.into_iter()
			.map(location::Model::into_domain)
			.collect()
	}

	/// All slots with their occupants, resolved in one batch
	pub async fn list_with_occupants(&self) -> LocationResult<Vec<OccupiedLocation>> {
		let locations = self.list().await?;
		let ids: Vec<LocationId> = locations.iter().map(|l| l.id).collect();
		let mut occupants = CurrentLocationResolver::resolve_locations(self.db.conn(), &ids).await?;

		Ok(locations
			.into_iter()
			.map(|location| OccupiedLocation {
				occupant_plate_id: occupants.remove(&location.id).flatten(),
				location,
			})
			.collect())
	}

	pub async fn find_by_coordinate(
		&self,
		carousel_position: i32,
		hotel_position: i32,
	) -> LocationResult<Option<Location>> {
		location::Entity::find()
			.filter(location::Column::Kind.eq(location::LocationType::Carousel))
			.filter(location::Column::CarouselPosition.eq(carousel_position))
			.filter(location::Column::HotelPosition.eq(hotel_position))
			.one(self.db.conn())
			.await?
			.map(location::Model::into_domain)
			.transpose()
	}

	pub async fn find_by_name(&self, name: &str) -> LocationResult<Option<Location>> {
		location::Entity::find()
			.filter(location::Column::Kind.eq(location::LocationType::Special))
			.filter(location::Column::Name.eq(name.trim()))
			.one(self.db.conn())
			.await?
			.map(location::Model::into_domain)
			.transpose()
	}

	/// Make sure a carousel slot exists for every pair in
	/// `carousels × hotels`. Existing slots are left alone, so running this
	/// again with the same ranges creates nothing.
	pub async fn bulk_initialize_carousel(
		&self,
		carousels: RangeInclusive<i32>,
		hotels: RangeInclusive<i32>,
	) -> LocationResult<CarouselInitOutput> {
		validate_range("carousel", &carousels)?;
		validate_range("hotel", &hotels)?;

		let txn = self.db.begin_write().await?;

		let existing: HashSet<(i32, i32)> = location::Entity::find()
			.filter(location::Column::Kind.eq(location::LocationType::Carousel))
			.filter(
				Condition::all()
					.add(location::Column::CarouselPosition.between(*carousels.start(), *carousels.end()))
					.add(location::Column::HotelPosition.between(*hotels.start(), *hotels.end())),
			)
			.all(&txn)
			.await?
			.into_iter()
			.filter_map(|row| Some((row.carousel_position?, row.hotel_position?)))
			.collect();

		let missing: Vec<location::ActiveModel> = carousels
			.clone()
			.flat_map(|carousel| hotels.clone().map(move |hotel| (carousel, hotel)))
			.filter(|pair| !existing.contains(pair))
			.map(|(carousel_position, hotel_position)| {
				let mut active = location::ActiveModel::new();
				active.set_kind(&LocationKind::Carousel {
					carousel_position,
					hotel_position,
				});
				active
			})
			.collect();

		let total = carousels.clone().count() * hotels.clone().count();
		let mut created = 0usize;

		for chunk in missing.chunks(INSERT_CHUNK) {
			// A concurrent initialiser may have filled some of these in
			created += location::Entity::insert_many(chunk.to_vec())
				.on_conflict(
					OnConflict::columns([
						location::Column::CarouselPosition,
						location::Column::HotelPosition,
					])
					.do_nothing()
					.to_owned(),
				)
				.exec_without_returning(&txn)
				.await? as usize;
		}

		txn.commit().await?;

		debug!(?carousels, ?hotels, created, total, "Carousel initialisation finished");
		if created > 0 {
			info!(created, total, "Created carousel locations");
		}

		self.events
			.emit(Event::CarouselInitialised { created, total });

		Ok(CarouselInitOutput { created, total })
	}
}

fn validate_range(axis: &str, range: &RangeInclusive<i32>) -> LocationResult<()> {
	if range.is_empty() {
		return Err(LocationError::Validation(format!(
			"{} range {:?} is empty",
			axis, range
		)));
	}
	if *range.start() < 1 {
		return Err(LocationError::Validation(format!(
			"{} positions must start at 1 or above, got {}",
			axis,
			range.start()
		)));
	}
	if *range.end() > MAX_POSITION {
		return Err(LocationError::Validation(format!(
			"{} positions must end at {} or below, got {}",
			axis,
			MAX_POSITION,
			range.end()
		)));
	}
	Ok(())
}

fn duplicate_or(err: sea_orm::DbErr, kind: &LocationKind) -> LocationError {
	if LocationError::is_unique_violation(&err) {
		LocationError::DuplicateLocation(kind.label())
	} else {
		LocationError::Database(err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_validate_range() {
		assert!(validate_range("carousel", &(1..=10)).is_ok());
		assert!(validate_range("carousel", &(0..=10)).is_err());
		#[allow(clippy::reversed_empty_ranges)]
		let empty = 5..=1;
		assert!(validate_range("hotel", &empty).is_err());
		assert!(validate_range("hotel", &(1..=MAX_POSITION)).is_ok());
		assert!(validate_range("hotel", &(1..=MAX_POSITION + 1)).is_err());
	}
}
