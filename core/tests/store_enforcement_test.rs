//! Occupancy holds for writers that do not share this process's write gate

mod helpers;

use helpers::{carousel, plate, shared_store, test_core};
use plateloc_core::{
	infra::db::entities::current_assignment,
	ops::locations::{CurrentLocationResolver, LocationLedger},
	LocationError,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_cores_racing_for_one_slot() {
	let store = shared_store().await;
	let (first, second) = (&store.first, &store.second);

	for hotel in 1..=20 {
		let a = plate(first, &format!("PL-A{hotel}")).await;
		let b = plate(first, &format!("PL-B{hotel}")).await;
		let slot = carousel(first, 1, hotel).await;

		let (left, right) = tokio::join!(
			first.plate_locations.assign(a.id, slot.id),
			second.plate_locations.assign(b.id, slot.id),
		);

		let (winner, loser) = match (left, right) {
			(Ok(_), Err(err)) => (a.id, err),
			(Err(err), Ok(_)) => (b.id, err),
			other => panic!("expected exactly one assignment to succeed, got {:?}", other),
		};

		match loser {
			LocationError::Occupied {
				location_id,
				occupant_plate_id,
			} => {
				assert_eq!(location_id, slot.id);
				assert_eq!(occupant_plate_id, winner);
			}
			other => panic!("expected Occupied, got {:?}", other),
		}

		let occupant = CurrentLocationResolver::occupant(second.db.conn(), slot.id)
			.await
			.unwrap();
		assert_eq!(occupant, Some(winner));
	}

	assert_eq!(LocationLedger::len(first.db.conn()).await.unwrap(), 20);
}

#[tokio::test]
async fn test_other_core_sees_committed_occupant() {
	let store = shared_store().await;
	let a = plate(&store.first, "PL-A").await;
	let b = plate(&store.first, "PL-B").await;
	let slot = carousel(&store.first, 2, 2).await;

	store.first.plate_locations.assign(a.id, slot.id).await.unwrap();

	assert!(matches!(
		store.second.plate_locations.assign(b.id, slot.id).await,
		Err(LocationError::Occupied { occupant_plate_id, .. }) if occupant_plate_id == a.id
	));
	assert!(matches!(
		store.second.locations.delete(slot.id).await,
		Err(LocationError::DeletionBlocked { occupant_plate_id, .. }) if occupant_plate_id == a.id
	));
}

/// Point `plate_id` at `location_id` in the enforcement table only, leaving
/// the ledger saying the plate is vacated
async fn hold_without_ledger(core: &plateloc_core::Core, plate_id: i32, location_id: i32) {
	let vacate = core.plate_locations.unassign(plate_id).await.unwrap();

	current_assignment::ActiveModel {
		plate_id: Set(plate_id),
		location_id: Set(Some(location_id)),
		assignment_id: Set(vacate.id),
	}
	.update(core.db.conn())
	.await
	.unwrap();
}

#[tokio::test]
async fn test_unique_index_rejects_second_occupant() {
	let core = test_core().await;
	let holder = plate(&core, "PL-HOLD").await;
	let b = plate(&core, "PL-B").await;
	let slot = carousel(&core, 1, 1).await;

	hold_without_ledger(&core, holder.id, slot.id).await;
	let ledger_len = LocationLedger::len(core.db.conn()).await.unwrap();

	match core.plate_locations.assign(b.id, slot.id).await {
		Err(LocationError::Occupied {
			location_id,
			occupant_plate_id,
		}) => {
			assert_eq!(location_id, slot.id);
			assert_eq!(occupant_plate_id, holder.id);
		}
		other => panic!("expected Occupied, got {:?}", other),
	}

	// The append was rolled back with the rest of the transaction
	assert_eq!(LocationLedger::len(core.db.conn()).await.unwrap(), ledger_len);
	assert!(core.plate_locations.current_location(b.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_foreign_key_blocks_deleting_held_location() {
	let core = test_core().await;
	let holder = plate(&core, "PL-HOLD").await;
	let slot = carousel(&core, 1, 1).await;

	hold_without_ledger(&core, holder.id, slot.id).await;

	match core.locations.delete(slot.id).await {
		Err(LocationError::DeletionBlocked {
			location_id,
			occupant_plate_id,
		}) => {
			assert_eq!(location_id, slot.id);
			assert_eq!(occupant_plate_id, holder.id);
		}
		other => panic!("expected DeletionBlocked, got {:?}", other),
	}
	assert!(core.locations.get(slot.id).await.is_ok());
}
