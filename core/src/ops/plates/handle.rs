use crate::domain::{HistoryEntry, Location, LocationId, PlateId};
use crate::infra::db::entities::location_assignment;
use crate::ops::locations::{AssignOutcome, LocationResult, PlateLocationService};

/// A plate's view of the location service.
///
/// Lets plate-centric callers write `plate.assign_location(id)` without
/// passing the plate id around. Holds no state of its own.
pub struct PlateHandle<'a> {
	service: &'a PlateLocationService,
	plate_id: PlateId,
}

impl<'a> PlateHandle<'a> {
	pub(crate) fn new(service: &'a PlateLocationService, plate_id: PlateId) -> Self {
		Self { service, plate_id }
	}

	pub fn id(&self) -> PlateId {
		self.plate_id
	}

	pub async fn assign_location(&self, location_id: LocationId) -> LocationResult<AssignOutcome> {
		self.service.assign(self.plate_id, location_id).await
	}

	pub async fn vacate(&self) -> LocationResult<location_assignment::Model> {
		self.service.unassign(self.plate_id).await
	}

	pub async fn current_location(&self) -> LocationResult<Option<Location>> {
		self.service.current_location(self.plate_id).await
	}

	pub async fn location_history(&self) -> LocationResult<Vec<HistoryEntry>> {
		self.service.location_history(self.plate_id).await
	}
}
