//! Event bus for decoupled communication

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{LocationId, LocationKind, PlateId};

/// Location and plate events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
	/// A storage slot was registered
	LocationCreated {
		location_id: LocationId,
		kind: LocationKind,
	},

	/// A storage slot changed shape or coordinates
	LocationUpdated {
		location_id: LocationId,
		kind: LocationKind,
	},

	/// An unoccupied storage slot was removed
	LocationDeleted { location_id: LocationId },

	/// Carousel initialisation finished
	CarouselInitialised { created: usize, total: usize },

	/// A plate was moved into a slot
	PlateAssigned {
		plate_id: PlateId,
		location_id: LocationId,
		assignment_id: i32,
	},

	/// A plate was taken out of the storage system
	PlateVacated { plate_id: PlateId, assignment_id: i32 },
}

/// Event bus for broadcasting events
pub struct EventBus {
	sender: broadcast::Sender<Event>,
}

impl EventBus {
	/// Create a new event bus with specified capacity
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Emit an event
	pub fn emit(&self, event: Event) {
		// No receivers is not an error
		if self.sender.send(event).is_err() {
			debug!("Event emitted with no subscribers");
		}
	}

	/// Subscribe to events
	pub fn subscribe(&self) -> broadcast::Receiver<Event> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}
