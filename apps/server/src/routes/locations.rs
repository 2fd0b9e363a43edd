use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection},
		Path, State,
	},
	http::StatusCode,
	routing::{get, post},
	Json, Router,
};
use plateloc_core::{
	domain::{Location, LocationId, LocationInput, LocationKind},
	ops::locations::{CarouselInitOutput, LocationGrid, OccupiedLocation},
};
use serde::Serialize;

use crate::{error::ApiResult, AppState};

#[derive(Debug, Serialize)]
struct Deleted {
	deleted: LocationId,
}

pub(crate) fn router() -> Router<AppState> {
	Router::new()
		.route("/", get(list).post(create))
		.route("/grid", get(grid))
		.route("/initialise_carousel", post(initialise_carousel))
		.route("/:id", get(show).patch(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<OccupiedLocation>>> {
	Ok(Json(state.core.locations.list_with_occupants().await?))
}

async fn grid(State(state): State<AppState>) -> ApiResult<Json<LocationGrid>> {
	Ok(Json(state.core.grid().await?))
}

async fn create(
	State(state): State<AppState>,
	body: Result<Json<LocationInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Location>)> {
	let Json(input) = body?;
	let kind = LocationKind::try_from(input)?;

	Ok((
		StatusCode::CREATED,
		Json(state.core.locations.create(kind).await?),
	))
}

async fn show(
	State(state): State<AppState>,
	path: Result<Path<LocationId>, PathRejection>,
) -> ApiResult<Json<OccupiedLocation>> {
	let Path(id) = path?;
	Ok(Json(state.core.locations.get_with_occupant(id).await?))
}

async fn update(
	State(state): State<AppState>,
	path: Result<Path<LocationId>, PathRejection>,
	body: Result<Json<LocationInput>, JsonRejection>,
) -> ApiResult<Json<Location>> {
	let Path(id) = path?;
	let Json(input) = body?;
	let kind = LocationKind::try_from(input)?;

	Ok(Json(state.core.locations.update(id, kind).await?))
}

async fn remove(
	State(state): State<AppState>,
	path: Result<Path<LocationId>, PathRejection>,
) -> ApiResult<Json<Deleted>> {
	let Path(id) = path?;
	state.core.locations.delete(id).await?;
	Ok(Json(Deleted { deleted: id }))
}

async fn initialise_carousel(
	State(state): State<AppState>,
) -> ApiResult<Json<CarouselInitOutput>> {
	Ok(Json(state.core.initialise_carousel().await?))
}
