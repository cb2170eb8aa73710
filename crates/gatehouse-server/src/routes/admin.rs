// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Registration review handlers. Every route requires the configured admin.

use axum::{
	extract::{Path, State},
	Json,
};
use gatehouse_server_api::{ApproveUserResponse, MessageResponse, UserResponse};
use gatehouse_server_auth::UserId;

use crate::{
	api::AppState,
	auth_middleware::RequireAdmin,
	error::{ErrorResponse, ServerError},
};

fn parse_user_id(raw: &str) -> Result<UserId, ServerError> {
	raw.parse()
		.map_err(|_| ServerError::BadRequest("Invalid user ID".to_string()))
}

#[utoipa::path(
    get,
    path = "/admin/pending",
    responses(
        (status = 200, description = "Pending users, oldest first", body = [UserResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the admin", body = ErrorResponse),
        (status = 404, description = "Caller has no local account", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
/// GET /admin/pending - Users awaiting review.
#[tracing::instrument(skip(state, admin), fields(actor_id = %admin.id))]
pub async fn list_pending(
	State(state): State<AppState>,
	RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>, ServerError> {
	let users = state.user_store.list_pending_users().await?;
	tracing::debug!(count = users.len(), "listed pending users");
	Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/approve/{id}",
    params(
        ("id" = String, Path, description = "Local user ID")
    ),
    responses(
        (status = 200, description = "User approved", body = ApproveUserResponse),
        (status = 400, description = "Malformed user ID", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
/// POST /admin/approve/{id} - Approve a pending user. Approving twice is a no-op.
#[tracing::instrument(skip(state, admin), fields(actor_id = %admin.id))]
pub async fn approve_user(
	State(state): State<AppState>,
	RequireAdmin(admin): RequireAdmin,
	Path(id): Path<String>,
) -> Result<Json<ApproveUserResponse>, ServerError> {
	let target_id = parse_user_id(&id)?;

	let user = state
		.user_store
		.approve_user(&target_id)
		.await?
		.ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

	tracing::info!(actor_id = %admin.id, target_id = %target_id, "user approved");
	Ok(Json(ApproveUserResponse {
		message: "User approved".to_string(),
		user: UserResponse::from(user),
	}))
}

#[utoipa::path(
    delete,
    path = "/admin/reject/{id}",
    params(
        ("id" = String, Path, description = "Local user ID")
    ),
    responses(
        (status = 200, description = "User rejected and deleted", body = MessageResponse),
        (status = 400, description = "Malformed user ID", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
/// DELETE /admin/reject/{id} - Reject a user by deleting the record.
#[tracing::instrument(skip(state, admin), fields(actor_id = %admin.id))]
pub async fn reject_user(
	State(state): State<AppState>,
	RequireAdmin(admin): RequireAdmin,
	Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServerError> {
	let target_id = parse_user_id(&id)?;

	if !state.user_store.delete_user(&target_id).await? {
		return Err(ServerError::NotFound("User not found".to_string()));
	}

	tracing::info!(actor_id = %admin.id, target_id = %target_id, "user rejected");
	Ok(Json(MessageResponse::new("User rejected and deleted")))
}
