// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Self-service handlers for the signed-in user.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

pub use gatehouse_server_api::users::*;

use crate::{
	api::AppState,
	auth_middleware::{RequireApproved, RequireAuth},
	error::{ErrorResponse, ServerError},
};

#[utoipa::path(
    get,
    path = "/user/me",
    responses(
        (status = 200, description = "The caller's account", body = MeResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "No local account for this identity", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// GET /user/me - The caller's email and approval status.
#[tracing::instrument(skip(state, identity), fields(external_id = %identity.external_id))]
pub async fn get_me(
	State(state): State<AppState>,
	RequireAuth(identity): RequireAuth,
) -> Result<Json<MeResponse>, ServerError> {
	let user = state
		.user_store
		.get_user_by_external_id(&identity.external_id)
		.await?
		.ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

	Ok(Json(MeResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/user/me/public-key",
    request_body = UpdatePublicKeyRequest,
    responses(
        (status = 200, description = "Key stored", body = MeResponse),
        (status = 400, description = "Malformed body, or an empty or oversized key", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Account pending approval", body = ErrorResponse),
        (status = 404, description = "No local account for this identity", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// PUT /user/me/public-key - Store the caller's public key. Approved accounts only.
#[tracing::instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_public_key(
	State(state): State<AppState>,
	RequireApproved(user): RequireApproved,
	payload: Result<Json<UpdatePublicKeyRequest>, JsonRejection>,
) -> Result<Json<MeResponse>, ServerError> {
	let Json(payload) = payload?;
	let key = payload
		.validated()
		.map_err(|msg| ServerError::BadRequest(msg.to_string()))?;

	let updated = state
		.user_store
		.set_public_key(&user.id, key)
		.await?
		.ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

	tracing::info!(user_id = %updated.id, "public key updated");
	Ok(Json(MeResponse::from(updated)))
}
