//! HTTP surface for the plate location ledger

pub mod error;
mod routes;
pub mod utils;

use axum::{routing::get, Router};
use plateloc_core::Core;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
	pub core: Arc<Core>,
}

/// Create the HTTP router
pub fn create_router(core: Arc<Core>) -> Router {
	let state = AppState { core };

	Router::new()
		.route("/health", get(|| async { "OK" }))
		.nest("/locations", routes::locations::router())
		.nest("/plates", routes::plates::router())
		.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
		.with_state(state)
}
