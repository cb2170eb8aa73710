// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health check types and component checking logic.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use utoipa::ToSchema;

use gatehouse_server_db::UserStore;

use crate::api::AppState;
use crate::version::BuildInfo;

/// Health status for components and overall system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Unhealthy,
}

/// Database component health.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
	pub status: HealthStatus,
	pub latency_ms: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Whether the pieces needed for registration review are configured.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewHealth {
	pub status: HealthStatus,
	pub webhook_secret_configured: bool,
	pub admin_email_configured: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthComponents {
	pub database: DatabaseHealth,
	pub review: ReviewHealth,
}

/// Complete health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
	pub status: HealthStatus,
	pub timestamp: String,
	pub duration_ms: u64,
	pub version: BuildInfo,
	pub components: HealthComponents,
}

const DB_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Check database health.
pub async fn check_database(store: &dyn UserStore) -> DatabaseHealth {
	let start = Instant::now();

	let result = timeout(DB_CHECK_TIMEOUT, store.health_check()).await;
	let latency_ms = start.elapsed().as_millis() as u64;

	match result {
		Ok(Ok(())) => DatabaseHealth {
			status: HealthStatus::Healthy,
			latency_ms,
			error: None,
		},
		Ok(Err(e)) => DatabaseHealth {
			status: HealthStatus::Unhealthy,
			latency_ms,
			error: Some(e.to_string()),
		},
		Err(_) => DatabaseHealth {
			status: HealthStatus::Unhealthy,
			latency_ms,
			error: Some("database health check timed out".to_string()),
		},
	}
}

/// Missing review configuration degrades the service but does not take it down.
pub fn check_review(state: &AppState) -> ReviewHealth {
	let webhook_secret_configured = state.webhook_verifier.is_some();
	let admin_email_configured = state.admin_policy.is_configured();

	let status = if webhook_secret_configured && admin_email_configured {
		HealthStatus::Healthy
	} else {
		HealthStatus::Degraded
	};

	ReviewHealth {
		status,
		webhook_secret_configured,
		admin_email_configured,
	}
}

pub fn aggregate_status(components: &HealthComponents) -> HealthStatus {
	let statuses = [components.database.status, components.review.status];

	if statuses.contains(&HealthStatus::Unhealthy) {
		HealthStatus::Unhealthy
	} else if statuses.contains(&HealthStatus::Degraded) {
		HealthStatus::Degraded
	} else {
		HealthStatus::Healthy
	}
}
