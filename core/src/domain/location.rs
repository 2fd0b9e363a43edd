//! Location - a storage slot a plate can be placed in
//!
//! A slot is either a carousel position (carousel × hotel coordinate) or a
//! special slot addressed by name, such as an imaging station. The tagged
//! form below is the only way a location enters the system, so a record can
//! never be half carousel and half special.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ops::locations::error::{LocationError, LocationResult};

/// Database id of a location row
pub type LocationId = i32;

/// Highest carousel or hotel position a slot may have
pub const MAX_POSITION: i32 = 200;

/// The shape of a storage slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationKind {
	/// A position in the storage carousel
	Carousel {
		carousel_position: i32,
		hotel_position: i32,
	},
	/// A named slot outside the carousel coordinate system
	Special { name: String },
}

impl LocationKind {
	/// Build a validated carousel slot
	pub fn carousel(carousel_position: i64, hotel_position: i64) -> LocationResult<Self> {
		Ok(Self::Carousel {
			carousel_position: positive_coordinate("carousel_position", carousel_position)?,
			hotel_position: positive_coordinate("hotel_position", hotel_position)?,
		})
	}

	/// Build a validated special slot. Surrounding whitespace is trimmed.
	pub fn special(name: impl AsRef<str>) -> LocationResult<Self> {
		let name = name.as_ref().trim();
		if name.is_empty() {
			return Err(LocationError::Validation(
				"special location name must not be empty".to_string(),
			));
		}

		Ok(Self::Special {
			name: name.to_string(),
		})
	}

	/// Re-check a shape that was built without the constructors above
	pub fn validate(&self) -> LocationResult<()> {
		match self {
			Self::Carousel {
				carousel_position,
				hotel_position,
			} => Self::carousel(*carousel_position as i64, *hotel_position as i64).map(|_| ()),
			Self::Special { name } if name.trim() == name => Self::special(name).map(|_| ()),
			Self::Special { .. } => Err(LocationError::Validation(
				"special location name must not have surrounding whitespace".to_string(),
			)),
		}
	}

	pub fn is_carousel(&self) -> bool {
		matches!(self, Self::Carousel { .. })
	}

	/// Short human label, `C3-H12` for carousel slots or the name itself
	pub fn label(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for LocationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Carousel {
				carousel_position,
				hotel_position,
			} => write!(f, "C{}-H{}", carousel_position, hotel_position),
			Self::Special { name } => write!(f, "{}", name),
		}
	}
}

fn positive_coordinate(field: &str, value: i64) -> LocationResult<i32> {
	if value < 1 {
		return Err(LocationError::Validation(format!(
			"{} must be a positive integer, got {}",
			field, value
		)));
	}

	match i32::try_from(value) {
		Ok(position) if position <= MAX_POSITION => Ok(position),
		_ => Err(LocationError::Validation(format!(
			"{} must be at most {}, got {}",
			field, MAX_POSITION, value
		))),
	}
}

/// Raw location payload as received from a caller.
///
/// Every field is optional so that malformed payloads (missing coordinates,
/// a name on a carousel slot, an unknown type) are reported as validation
/// errors instead of opaque deserialisation failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationInput {
	#[serde(rename = "type")]
	pub kind: Option<String>,
	pub carousel_position: Option<i64>,
	pub hotel_position: Option<i64>,
	pub name: Option<String>,
}

impl TryFrom<LocationInput> for LocationKind {
	type Error = LocationError;

	fn try_from(input: LocationInput) -> Result<Self, Self::Error> {
		let has_coordinates = input.carousel_position.is_some() || input.hotel_position.is_some();

		match input.kind.as_deref() {
			Some("carousel") => {
				if input.name.is_some() {
					return Err(LocationError::Validation(
						"a carousel location cannot also have a name".to_string(),
					));
				}
				match (input.carousel_position, input.hotel_position) {
					(Some(carousel), Some(hotel)) => Self::carousel(carousel, hotel),
					_ => Err(LocationError::Validation(
						"a carousel location needs both carousel_position and hotel_position"
							.to_string(),
					)),
				}
			}
			Some("special") => {
				if has_coordinates {
					return Err(LocationError::Validation(
						"a special location cannot have carousel or hotel positions".to_string(),
					));
				}
				match input.name {
					Some(name) => Self::special(name),
					None => Err(LocationError::Validation(
						"a special location needs a name".to_string(),
					)),
				}
			}
			Some(other) => Err(LocationError::Validation(format!(
				"unknown location type '{}', expected 'carousel' or 'special'",
				other
			))),
			None => Err(LocationError::Validation(
				"location type is required".to_string(),
			)),
		}
	}
}

/// A storage slot as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
	pub id: LocationId,
	#[serde(flatten)]
	pub kind: LocationKind,
	pub label: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn input(kind: &str) -> LocationInput {
		LocationInput {
			kind: Some(kind.to_string()),
			..Default::default()
		}
	}

	#[test]
	fn test_carousel_label() {
		let kind = LocationKind::carousel(3, 12).unwrap();
		assert_eq!(kind.label(), "C3-H12");
		assert!(kind.is_carousel());
	}

	#[test]
	fn test_rejects_non_positive_coordinates() {
		assert!(matches!(
			LocationKind::carousel(0, 1),
			Err(LocationError::Validation(_))
		));
		assert!(matches!(
			LocationKind::carousel(1, -4),
			Err(LocationError::Validation(_))
		));
	}

	#[test]
	fn test_rejects_coordinates_past_the_carousel() {
		assert!(LocationKind::carousel(MAX_POSITION as i64, 1).is_ok());
		assert!(matches!(
			LocationKind::carousel(MAX_POSITION as i64 + 1, 1),
			Err(LocationError::Validation(_))
		));
		assert!(matches!(
			LocationKind::carousel(1, i32::MAX as i64),
			Err(LocationError::Validation(_))
		));
		assert!(LocationKind::carousel(1, i64::MAX).is_err());
	}

	#[test]
	fn test_special_name_is_trimmed() {
		let kind = LocationKind::special("  Imager  ").unwrap();
		assert_eq!(
			kind,
			LocationKind::Special {
				name: "Imager".to_string()
			}
		);
		assert!(LocationKind::special("   ").is_err());
	}

	#[test]
	fn test_input_rejects_mixed_shapes() {
		let mut carousel_with_name = input("carousel");
		carousel_with_name.carousel_position = Some(1);
		carousel_with_name.hotel_position = Some(1);
		carousel_with_name.name = Some("Imager".to_string());
		assert!(LocationKind::try_from(carousel_with_name).is_err());

		let mut special_with_coordinates = input("special");
		special_with_coordinates.name = Some("Imager".to_string());
		special_with_coordinates.hotel_position = Some(2);
		assert!(LocationKind::try_from(special_with_coordinates).is_err());
	}

	#[test]
	fn test_input_rejects_partial_carousel() {
		let mut partial = input("carousel");
		partial.carousel_position = Some(4);
		assert!(LocationKind::try_from(partial).is_err());

		assert!(LocationKind::try_from(LocationInput::default()).is_err());
		assert!(LocationKind::try_from(input("shelf")).is_err());
	}

	#[test]
	fn test_input_accepts_well_formed_payloads() {
		let payload: LocationInput = serde_json::from_value(serde_json::json!({
			"type": "carousel",
			"carousel_position": 2,
			"hotel_position": 7
		}))
		.unwrap();
		assert_eq!(
			LocationKind::try_from(payload).unwrap(),
			LocationKind::Carousel {
				carousel_position: 2,
				hotel_position: 7
			}
		);

		let payload: LocationInput =
			serde_json::from_value(serde_json::json!({ "type": "special", "name": "Imager" }))
				.unwrap();
		assert_eq!(
			LocationKind::try_from(payload).unwrap().label(),
			"Imager"
		);
	}
}
