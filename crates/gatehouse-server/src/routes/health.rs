// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Liveness and health HTTP handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use gatehouse_server_api::MessageResponse;

use crate::{
	api::AppState,
	health::{self, HealthComponents, HealthResponse, HealthStatus},
	version::BuildInfo,
};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is running", body = MessageResponse)
    ),
    tag = "health"
)]
/// GET / - Liveness banner.
pub async fn root() -> Json<MessageResponse> {
	Json(MessageResponse::new("Gatehouse backend running"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System is healthy or degraded", body = HealthResponse),
        (status = 503, description = "System is unhealthy", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - Database ping plus review configuration status.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	use tokio::time::Instant;

	let overall_start = Instant::now();

	let database = health::check_database(state.user_store.as_ref()).await;
	let review = health::check_review(&state);
	let components = HealthComponents { database, review };

	let status = health::aggregate_status(&components);
	let response = HealthResponse {
		status,
		timestamp: chrono::Utc::now().to_rfc3339(),
		duration_ms: overall_start.elapsed().as_millis() as u64,
		version: BuildInfo::current(),
		components,
	};

	let http_status = match status {
		HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
		HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
	};

	(http_status, Json(response))
}
