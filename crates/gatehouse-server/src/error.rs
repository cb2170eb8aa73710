// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	extract::rejection::JsonRejection,
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use gatehouse_server_db::DbError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Database error: {0}")]
	Db(#[from] DbError),

	#[error("Migration error: {0}")]
	Migration(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Invalid request: {0}")]
	BadRequest(String),

	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	#[error("Forbidden: {0}")]
	Forbidden(String),

	/// Authenticated, but the account has not been approved yet.
	#[error("Account pending approval")]
	PendingApproval,

	/// A server-side prerequisite (such as the webhook secret) is missing.
	#[error("Not configured: {0}")]
	NotConfigured(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

impl ServerError {
	fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
		match self {
			ServerError::Db(DbError::Conflict(msg)) | ServerError::Conflict(msg) => {
				(StatusCode::CONFLICT, ErrorResponse::new("conflict", msg.clone()))
			}
			ServerError::Db(DbError::NotFound(msg)) | ServerError::NotFound(msg) => {
				(StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg.clone()))
			}
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::Migration(e) => {
				tracing::error!(error = %e, "migration error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::Unauthorized(msg) => (
				StatusCode::UNAUTHORIZED,
				ErrorResponse::new("unauthorized", msg.clone()),
			),
			ServerError::Forbidden(msg) => {
				(StatusCode::FORBIDDEN, ErrorResponse::new("forbidden", msg.clone()))
			}
			ServerError::PendingApproval => (
				StatusCode::FORBIDDEN,
				ErrorResponse::new("pending_approval", "Account pending approval"),
			),
			ServerError::NotConfigured(msg) => {
				tracing::error!(error = %msg, "required configuration missing");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("not_configured", msg.clone()),
				)
			}
			ServerError::Config(msg) | ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
		}
	}
}

impl From<JsonRejection> for ServerError {
	fn from(rejection: JsonRejection) -> Self {
		ServerError::BadRequest(rejection.body_text())
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = self.status_and_body();
		(status, Json(body)).into_response()
	}
}
