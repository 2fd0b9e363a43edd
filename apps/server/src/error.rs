//! Mapping of core errors onto HTTP responses
//!
//! Every failure is rendered as `{"error": {"code", "message", ...}}`.

use axum::{
	extract::rejection::{JsonRejection, PathRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use plateloc_core::LocationError;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
	#[error(transparent)]
	Location(#[from] LocationError),

	#[error("Invalid request body: {0}")]
	Body(#[from] JsonRejection),

	#[error("Invalid path: {0}")]
	Path(#[from] PathRejection),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Location(err) => match err {
				LocationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
				LocationError::Occupied { .. }
				| LocationError::DeletionBlocked { .. }
				| LocationError::DuplicateLocation(_)
				| LocationError::DuplicatePlate(_) => StatusCode::CONFLICT,
				LocationError::LocationNotFound(_) | LocationError::PlateNotFound(_) => {
					StatusCode::NOT_FOUND
				}
				LocationError::Corrupt { .. } | LocationError::Database(_) => {
					StatusCode::INTERNAL_SERVER_ERROR
				}
			},
			Self::Body(rejection) => rejection.status(),
			Self::Path(_) => StatusCode::BAD_REQUEST,
		}
	}

	fn code(&self) -> &'static str {
		match self {
			Self::Location(err) => match err {
				LocationError::Validation(_) => "validation_error",
				LocationError::Occupied { .. } => "occupied",
				LocationError::DeletionBlocked { .. } => "deletion_blocked",
				LocationError::LocationNotFound(_) => "location_not_found",
				LocationError::PlateNotFound(_) => "plate_not_found",
				LocationError::DuplicateLocation(_) => "duplicate_location",
				LocationError::DuplicatePlate(_) => "duplicate_plate",
				LocationError::Corrupt { .. } => "corrupt_location",
				LocationError::Database(_) => "internal_error",
			},
			Self::Body(_) => "invalid_body",
			Self::Path(_) => "invalid_path",
		}
	}

	fn details(&self) -> Map<String, Value> {
		let mut details = Map::new();
		match self {
			Self::Location(
				LocationError::Occupied {
					location_id,
					occupant_plate_id,
				}
				| LocationError::DeletionBlocked {
					location_id,
					occupant_plate_id,
				},
			) => {
				details.insert("location_id".into(), json!(location_id));
				details.insert("occupant_plate_id".into(), json!(occupant_plate_id));
			}
			Self::Location(LocationError::LocationNotFound(id)) => {
				details.insert("location_id".into(), json!(id));
			}
			Self::Location(LocationError::PlateNotFound(id)) => {
				details.insert("plate_id".into(), json!(id));
			}
			_ => {}
		}
		details
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();

		// Store failures are logged in full and reported without internals
		let message = if status.is_server_error() {
			error!(error = %self, "Request failed");
			"internal server error".to_string()
		} else {
			self.to_string()
		};

		let mut body = self.details();
		body.insert("code".into(), json!(self.code()));
		body.insert("message".into(), json!(message));

		(status, Json(json!({ "error": body }))).into_response()
	}
}
