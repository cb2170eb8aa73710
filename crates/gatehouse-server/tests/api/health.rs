// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Body,
	http::{Request, StatusCode},
};
use gatehouse_server::{create_app_state, create_router};
use tower::ServiceExt;

use super::support::{json_body, test_config, TestApp};

#[tokio::test]
async fn root_reports_running() {
	let app = TestApp::new().await;

	let response = app.get("/", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		json_body(response).await["message"],
		"Gatehouse backend running"
	);
}

#[tokio::test]
async fn health_is_healthy_when_fully_configured() {
	let app = TestApp::new().await;

	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;
	assert_eq!(body["status"], "healthy");
	assert_eq!(body["components"]["database"]["status"], "healthy");
	assert_eq!(body["components"]["review"]["webhook_secret_configured"], true);
	assert_eq!(body["version"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_degrades_without_review_config() {
	let mut config = test_config();
	config.webhook.signing_secret = None;
	config.auth.admin_email = None;
	let app = TestApp::with_config(config).await;

	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;
	assert_eq!(body["status"], "degraded");
	assert_eq!(body["components"]["review"]["admin_email_configured"], false);
}

#[tokio::test]
async fn openapi_document_is_served() {
	let app = TestApp::new().await;

	let response = app.get("/api/openapi.json", None).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;
	assert!(body["paths"]["/admin/pending"].is_object());
}

#[tokio::test]
async fn health_is_unavailable_when_database_is_down() {
	let temp_dir = tempfile::tempdir().unwrap();
	let db_url = format!("sqlite:{}", temp_dir.path().join("down.db").display());
	let pool = gatehouse_server::db::create_pool(&db_url).await.unwrap();
	gatehouse_server::db::run_migrations(&pool).await.unwrap();

	let state = create_app_state(pool.clone(), &test_config()).await.unwrap();
	pool.close().await;

	let request = Request::builder()
		.uri("/health")
		.body(Body::empty())
		.unwrap();
	let response = create_router(state).oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

	let body = json_body(response).await;
	assert_eq!(body["status"], "unhealthy");
	assert_eq!(body["components"]["database"]["status"], "unhealthy");
	assert!(!body["components"]["database"]["error"]
		.as_str()
		.unwrap()
		.is_empty());
	assert_eq!(body["components"]["review"]["status"], "healthy");
}
