//! Application configuration management

use anyhow::Result;
use std::{env, fs, path::PathBuf};

pub mod app_config;

pub use app_config::{AppConfig, CarouselConfig, ServerConfig};

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "PLATELOC_DATA_DIR";

/// Versioned configuration that can upgrade itself in place
pub trait Migrate {
	fn current_version(&self) -> u32;

	fn target_version() -> u32;

	/// Step the value forward until it reaches `target_version`
	fn migrate(&mut self) -> Result<()>;
}

/// Data directory from `PLATELOC_DATA_DIR`, or `./plateloc_data`
pub fn default_data_dir() -> Result<PathBuf> {
	let dir = match env::var_os(DATA_DIR_ENV) {
		Some(dir) => PathBuf::from(dir),
		None => env::current_dir()?.join("plateloc_data"),
	};

	fs::create_dir_all(&dir)?;

	Ok(dir)
}
