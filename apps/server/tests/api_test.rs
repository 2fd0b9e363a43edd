//! Drives the router end to end over a temporary data directory

use axum::{
	body::Body,
	http::{Request, StatusCode},
	Router,
};
use http_body_util::BodyExt;
use plateloc_core::{config::AppConfig, Core};
use plateloc_server::create_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
	router: Router,
	_data_dir: TempDir,
}

impl TestApp {
	async fn new() -> Self {
		let data_dir = TempDir::new().unwrap();
		let mut config = AppConfig::default_with_dir(data_dir.path().to_path_buf());
		config.carousel.carousels = 2;
		config.carousel.hotels = 3;

		let core = Core::with_config(config).await.unwrap();

		Self {
			router: create_router(Arc::new(core)),
			_data_dir: data_dir,
		}
	}

	async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
		let builder = Request::builder().method(method).uri(uri);
		let request = match body {
			Some(body) => builder
				.header("content-type", "application/json")
				.body(Body::from(body.to_string()))
				.unwrap(),
			None => builder.body(Body::empty()).unwrap(),
		};

		let response = self.router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = response.into_body().collect().await.unwrap().to_bytes();
		let value = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap_or_else(|_| {
				Value::String(String::from_utf8_lossy(&bytes).into_owned())
			})
		};

		(status, value)
	}

	async fn create_plate(&self, barcode: &str) -> i64 {
		let (status, body) = self
			.request("POST", "/plates", Some(json!({ "barcode": barcode })))
			.await;
		assert_eq!(status, StatusCode::CREATED);
		body["id"].as_i64().unwrap()
	}

	async fn create_location(&self, payload: Value) -> i64 {
		let (status, body) = self.request("POST", "/locations", Some(payload)).await;
		assert_eq!(status, StatusCode::CREATED, "{}", body);
		body["id"].as_i64().unwrap()
	}
}

#[tokio::test]
async fn test_health() {
	let app = TestApp::new().await;
	let (status, body) = app.request("GET", "/health", None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn test_create_location_validates_shape() {
	let app = TestApp::new().await;

	let (status, body) = app
		.request(
			"POST",
			"/locations",
			Some(json!({ "type": "carousel", "carousel_position": 1 })),
		)
		.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body["error"]["code"], "validation_error");

	let (status, body) = app
		.request(
			"POST",
			"/locations",
			Some(json!({ "type": "special", "name": "Imager", "hotel_position": 2 })),
		)
		.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body["error"]["code"], "validation_error");

	let id = app
		.create_location(json!({ "type": "carousel", "carousel_position": 1, "hotel_position": 2 }))
		.await;
	let (status, body) = app.request("GET", &format!("/locations/{id}"), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["type"], "carousel");
	assert_eq!(body["label"], "C1-H2");
	assert!(body["occupant_plate_id"].is_null());

	let (status, body) = app
		.request(
			"POST",
			"/locations",
			Some(json!({ "type": "carousel", "carousel_position": 1, "hotel_position": 2 })),
		)
		.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"]["code"], "duplicate_location");
}

#[tokio::test]
async fn test_assign_conflict_and_vacate() {
	let app = TestApp::new().await;
	let a = app.create_plate("PL-A").await;
	let b = app.create_plate("PL-B").await;
	let slot = app
		.create_location(json!({ "type": "carousel", "carousel_position": 1, "hotel_position": 1 }))
		.await;

	let (status, body) = app
		.request(
			"PUT",
			&format!("/plates/{a}/location"),
			Some(json!({ "location_id": slot })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["location"]["id"], slot);
	assert!(body["assignment_id"].is_i64());

	let (status, body) = app
		.request(
			"PUT",
			&format!("/plates/{b}/location"),
			Some(json!({ "location_id": slot })),
		)
		.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"]["code"], "occupied");
	assert_eq!(body["error"]["location_id"], slot);
	assert_eq!(body["error"]["occupant_plate_id"], a);

	let (_, body) = app.request("GET", &format!("/plates/{b}/location"), None).await;
	assert!(body.is_null());

	let (status, _) = app.request("DELETE", &format!("/plates/{a}/location"), None).await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = app
		.request(
			"PUT",
			&format!("/plates/{b}/location"),
			Some(json!({ "location_id": slot })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["location"]["label"], "C1-H1");

	let (_, history) = app
		.request("GET", &format!("/plates/{a}/location_history"), None)
		.await;
	let history = history.as_array().unwrap();
	assert_eq!(history.len(), 2);
	assert_eq!(history[0]["location_id"], slot);
	assert!(history[1]["location_id"].is_null());
}

#[tokio::test]
async fn test_delete_blocked_while_occupied() {
	let app = TestApp::new().await;
	let p = app.create_plate("PL-DEL").await;
	let slot = app
		.create_location(json!({ "type": "special", "name": "Imager" }))
		.await;

	app.request(
		"PUT",
		&format!("/plates/{p}/location"),
		Some(json!({ "location_id": slot })),
	)
	.await;

	let (status, body) = app.request("DELETE", &format!("/locations/{slot}"), None).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"]["code"], "deletion_blocked");
	assert_eq!(body["error"]["occupant_plate_id"], p);

	app.request("DELETE", &format!("/plates/{p}/location"), None)
		.await;

	let (status, _) = app.request("DELETE", &format!("/locations/{slot}"), None).await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = app.request("GET", &format!("/locations/{slot}"), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"]["code"], "location_not_found");
}

#[tokio::test]
async fn test_initialise_and_grid() {
	let app = TestApp::new().await;

	let (_, body) = app.request("GET", "/locations/grid", None).await;
	assert!(body["carouselGrid"].is_null());

	let (status, body) = app
		.request("POST", "/locations/initialise_carousel", None)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["created"], 6);

	let (_, body) = app
		.request("POST", "/locations/initialise_carousel", None)
		.await;
	assert_eq!(body["created"], 0);

	let (status, body) = app.request("GET", "/locations/grid", None).await;
	assert_eq!(status, StatusCode::OK);
	let rows = body["carouselGrid"].as_object().unwrap();
	assert_eq!(rows.len(), 3);
	assert!(rows.values().all(|row| row.as_object().unwrap().len() == 2));
	assert_eq!(body["specialLocations"], json!([]));

	let (_, body) = app.request("GET", "/locations", None).await;
	assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_unknown_plate_and_bad_body() {
	let app = TestApp::new().await;

	let (status, body) = app.request("GET", "/plates/42/location", None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"]["code"], "plate_not_found");
	assert_eq!(body["error"]["plate_id"], 42);

	let (status, body) = app
		.request("POST", "/plates", Some(json!({ "name": "no barcode" })))
		.await;
	assert!(status.is_client_error());
	assert_eq!(body["error"]["code"], "invalid_body");

	let (status, body) = app
		.request("POST", "/plates", Some(json!({ "barcode": "  " })))
		.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_patch_keeps_occupant_and_rejects_duplicates() {
	let app = TestApp::new().await;
	let p = app.create_plate("PL-MOVE").await;
	let slot = app
		.create_location(json!({ "type": "carousel", "carousel_position": 1, "hotel_position": 1 }))
		.await;
	app.create_location(json!({ "type": "carousel", "carousel_position": 1, "hotel_position": 2 }))
		.await;

	let (status, _) = app
		.request(
			"PUT",
			&format!("/plates/{p}/location"),
			Some(json!({ "location_id": slot })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = app
		.request(
			"PATCH",
			&format!("/locations/{slot}"),
			Some(json!({ "type": "special", "name": "Imager" })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["id"], slot);
	assert_eq!(body["label"], "Imager");

	let (_, body) = app.request("GET", &format!("/locations/{slot}"), None).await;
	assert_eq!(body["type"], "special");
	assert_eq!(body["occupant_plate_id"], p);

	let (_, body) = app.request("GET", &format!("/plates/{p}/location"), None).await;
	assert_eq!(body["id"], slot);

	let (status, body) = app
		.request(
			"PATCH",
			&format!("/locations/{slot}"),
			Some(json!({ "type": "carousel", "carousel_position": 1, "hotel_position": 2 })),
		)
		.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"]["code"], "duplicate_location");

	let (_, body) = app.request("GET", &format!("/locations/{slot}"), None).await;
	assert_eq!(body["name"], "Imager");
	assert_eq!(body["occupant_plate_id"], p);
}

#[tokio::test]
async fn test_malformed_path_is_json_error() {
	let app = TestApp::new().await;

	let (status, body) = app.request("GET", "/locations/abc", None).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"]["code"], "invalid_path");

	let (status, body) = app
		.request(
			"PUT",
			"/plates/not-a-number/location",
			Some(json!({ "location_id": 1 })),
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"]["code"], "invalid_path");
}

#[tokio::test]
async fn test_far_coordinates_are_unprocessable() {
	let app = TestApp::new().await;

	let (status, body) = app
		.request(
			"POST",
			"/locations",
			Some(json!({
				"type": "carousel",
				"carousel_position": 2147483647,
				"hotel_position": 2147483647
			})),
		)
		.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body["error"]["code"], "validation_error");

	let (status, body) = app.request("GET", "/locations/grid", None).await;
	assert_eq!(status, StatusCode::OK);
	assert!(body["carouselGrid"].is_null());
}
