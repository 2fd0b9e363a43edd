//! Shared fixtures for integration tests

#![allow(dead_code)]

use plateloc_core::{
	config::AppConfig,
	domain::{Location, LocationKind, Plate},
	Core,
};
use tempfile::TempDir;

/// A core over a fresh data directory that is removed on drop
pub struct TestCore {
	pub core: Core,
	_data_dir: TempDir,
}

impl std::ops::Deref for TestCore {
	type Target = Core;

	fn deref(&self) -> &Core {
		&self.core
	}
}

pub async fn test_core() -> TestCore {
	let data_dir = TempDir::new().unwrap();
	let config = AppConfig::default_with_dir(data_dir.path().to_path_buf());
	let core = Core::with_config(config).await.unwrap();

	TestCore {
		core,
		_data_dir: data_dir,
	}
}

/// Two independent cores over one data directory, as two server processes
/// sharing a database would be
pub struct SharedStore {
	pub first: Core,
	pub second: Core,
	_data_dir: TempDir,
}

pub async fn shared_store() -> SharedStore {
	let data_dir = TempDir::new().unwrap();
	let config = AppConfig::default_with_dir(data_dir.path().to_path_buf());
	let first = Core::with_config(config.clone()).await.unwrap();
	let second = Core::with_config(config).await.unwrap();

	SharedStore {
		first,
		second,
		_data_dir: data_dir,
	}
}

pub async fn plate(core: &Core, barcode: &str) -> Plate {
	core.plates.create(barcode).await.unwrap()
}

pub async fn carousel(core: &Core, carousel_position: i64, hotel_position: i64) -> Location {
	core.locations
		.create(LocationKind::carousel(carousel_position, hotel_position).unwrap())
		.await
		.unwrap()
}

pub async fn special(core: &Core, name: &str) -> Location {
	core.locations
		.create(LocationKind::special(name).unwrap())
		.await
		.unwrap()
}
