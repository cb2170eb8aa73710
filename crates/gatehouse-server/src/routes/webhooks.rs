// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Identity-provider webhook receiver.
//!
//! The raw body is verified against the svix headers before any JSON parsing.
//! Accounts created here always start out pending.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use gatehouse_common_webhook::WebhookHeaders;
use gatehouse_server_api::{
	DeletedObjectData, IdentityEvent, IdentityEventType, IdentityUserData, MessageResponse,
};
use gatehouse_server_db::DbError;

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
};

const RECEIVED: &str = "Webhook received";

#[utoipa::path(
    post,
    path = "/webhooks/identity",
    request_body = IdentityEvent,
    responses(
        (status = 200, description = "Event handled or ignored", body = MessageResponse),
        (status = 400, description = "Missing headers, bad signature, or invalid payload", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 500, description = "Webhook secret not configured", body = ErrorResponse)
    ),
    tag = "webhooks"
)]
/// POST /webhooks/identity - Sync account events from the identity provider.
#[tracing::instrument(skip(state, headers, body), fields(event_type = tracing::field::Empty))]
pub async fn identity_webhook(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<MessageResponse>, ServerError> {
	let Some(verifier) = state.webhook_verifier.as_ref() else {
		tracing::error!("webhook received but no signing secret is configured");
		return Err(ServerError::NotConfigured(
			"Webhook secret not configured".to_string(),
		));
	};

	let webhook_headers = WebhookHeaders::from_http(&headers).map_err(|e| {
		tracing::debug!(error = %e, "webhook headers missing");
		ServerError::BadRequest("Missing svix headers".to_string())
	})?;

	verifier.verify(&webhook_headers, &body).map_err(|e| {
		tracing::warn!(error = %e, "webhook verification failed");
		ServerError::BadRequest("Webhook verification failed".to_string())
	})?;

	let event: IdentityEvent = serde_json::from_slice(&body).map_err(|e| {
		tracing::debug!(error = %e, "webhook payload is not an event");
		ServerError::BadRequest("Invalid payload".to_string())
	})?;
	tracing::Span::current().record("event_type", event.event_type.as_str());

	match event.kind() {
		IdentityEventType::UserCreated => handle_user_created(&state, event).await,
		IdentityEventType::UserUpdated => handle_user_updated(&state, event).await,
		IdentityEventType::UserDeleted => handle_user_deleted(&state, event).await,
		IdentityEventType::Other => {
			tracing::debug!(event_type = %event.event_type, "ignoring webhook event");
			Ok(Json(MessageResponse::new(RECEIVED)))
		}
	}
}

fn user_data(event: IdentityEvent) -> Result<IdentityUserData, ServerError> {
	serde_json::from_value(event.data)
		.map_err(|_| ServerError::BadRequest("Invalid payload".to_string()))
}

fn missing_email() -> ServerError {
	ServerError::BadRequest("Invalid payload: missing email".to_string())
}

async fn handle_user_created(
	state: &AppState,
	event: IdentityEvent,
) -> Result<Json<MessageResponse>, ServerError> {
	let data = user_data(event)?;
	let email = data.primary_email().ok_or_else(missing_email)?;
	let username = data.username_or(email);

	if state
		.user_store
		.get_user_by_external_id(&data.id)
		.await?
		.is_some()
	{
		return Ok(Json(MessageResponse::new("User already exists")));
	}

	match state.user_store.create_user(&data.id, email, username).await {
		Ok(user) => {
			tracing::info!(user_id = %user.id, external_id = %user.external_id, "pending user created");
			Ok(Json(MessageResponse::new(RECEIVED)))
		}
		// A concurrent delivery of the same event may have won the insert.
		Err(DbError::Conflict(what)) => {
			if state
				.user_store
				.get_user_by_external_id(&data.id)
				.await?
				.is_some()
			{
				Ok(Json(MessageResponse::new("User already exists")))
			} else {
				Err(ServerError::Conflict(what))
			}
		}
		Err(e) => Err(e.into()),
	}
}

async fn handle_user_updated(
	state: &AppState,
	event: IdentityEvent,
) -> Result<Json<MessageResponse>, ServerError> {
	let data = user_data(event)?;

	let Some(existing) = state.user_store.get_user_by_external_id(&data.id).await? else {
		tracing::debug!(external_id = %data.id, "update for unknown user ignored");
		return Ok(Json(MessageResponse::new(RECEIVED)));
	};

	// Accounts without an email keep the stored one.
	let (email, username) = match data.primary_email() {
		Some(email) => (email, data.username_or(email)),
		None => {
			tracing::debug!(user_id = %existing.id, "update carries no email, keeping stored address");
			(
				existing.email.as_str(),
				data.username_or(&existing.username),
			)
		}
	};

	if let Some(user) = state
		.user_store
		.update_identity(&data.id, email, username)
		.await?
	{
		tracing::info!(user_id = %user.id, "user identity refreshed");
	}
	Ok(Json(MessageResponse::new(RECEIVED)))
}

async fn handle_user_deleted(
	state: &AppState,
	event: IdentityEvent,
) -> Result<Json<MessageResponse>, ServerError> {
	let data: DeletedObjectData = serde_json::from_value(event.data)
		.map_err(|_| ServerError::BadRequest("Invalid payload".to_string()))?;

	let Some(external_id) = data.id else {
		return Err(ServerError::BadRequest(
			"Invalid payload: missing id".to_string(),
		));
	};

	if state
		.user_store
		.delete_user_by_external_id(&external_id)
		.await?
	{
		tracing::info!(external_id = %external_id, "user deleted by identity provider");
	}
	Ok(Json(MessageResponse::new(RECEIVED)))
}
