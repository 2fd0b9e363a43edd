use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection},
		Path, State,
	},
	http::StatusCode,
	routing::{get, post},
	Json, Router,
};
use plateloc_core::domain::{HistoryEntry, Location, LocationId, Plate, PlateId};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, AppState};

#[derive(Debug, Deserialize)]
struct CreatePlate {
	barcode: String,
}

#[derive(Debug, Deserialize)]
struct AssignLocation {
	location_id: LocationId,
}

#[derive(Debug, Serialize)]
struct PlateLocation {
	plate_id: PlateId,
	location: Option<Location>,
	/// Ledger row written by this request, none when nothing changed
	assignment_id: Option<i32>,
}

pub(crate) fn router() -> Router<AppState> {
	Router::new()
		.route("/", post(create).get(list))
		.route("/:id", get(show))
		.route(
			"/:id/location",
			get(current_location).put(assign).delete(vacate),
		)
		.route("/:id/location_history", get(location_history))
}

async fn create(
	State(state): State<AppState>,
	body: Result<Json<CreatePlate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Plate>)> {
	let Json(input) = body?;

	Ok((
		StatusCode::CREATED,
		Json(state.core.plates.create(&input.barcode).await?),
	))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Plate>>> {
	Ok(Json(state.core.plates.list().await?))
}

async fn show(
	State(state): State<AppState>,
	path: Result<Path<PlateId>, PathRejection>,
) -> ApiResult<Json<Plate>> {
	let Path(id) = path?;
	Ok(Json(state.core.plates.get(id).await?))
}

async fn current_location(
	State(state): State<AppState>,
	path: Result<Path<PlateId>, PathRejection>,
) -> ApiResult<Json<Option<Location>>> {
	let Path(id) = path?;
	Ok(Json(state.core.plate_locations.current_location(id).await?))
}

async fn assign(
	State(state): State<AppState>,
	path: Result<Path<PlateId>, PathRejection>,
	body: Result<Json<AssignLocation>, JsonRejection>,
) -> ApiResult<Json<PlateLocation>> {
	let Path(id) = path?;
	let Json(input) = body?;
	let plate = state.core.plate_locations.plate(id);

	let outcome = plate.assign_location(input.location_id).await?;
	let location = plate.current_location().await?;

	Ok(Json(PlateLocation {
		plate_id: id,
		location,
		assignment_id: outcome.assignment().map(|a| a.id),
	}))
}

async fn vacate(
	State(state): State<AppState>,
	path: Result<Path<PlateId>, PathRejection>,
) -> ApiResult<Json<PlateLocation>> {
	let Path(id) = path?;
	let assignment = state.core.plate_locations.unassign(id).await?;

	Ok(Json(PlateLocation {
		plate_id: id,
		location: None,
		assignment_id: Some(assignment.id),
	}))
}

async fn location_history(
	State(state): State<AppState>,
	path: Result<Path<PlateId>, PathRejection>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
	let Path(id) = path?;
	Ok(Json(state.core.plate_locations.location_history(id).await?))
}
