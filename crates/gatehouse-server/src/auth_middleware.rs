// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Authentication middleware and extractors.
//!
//! [`auth_layer`] verifies the bearer token and stores an [`AuthContext`] in
//! request extensions. Handlers then pick an extractor for the access they
//! need:
//!
//! | extractor           | 401 | 404 | 403                         |
//! |---------------------|-----|-----|-----------------------------|
//! | [`RequireAuth`]     | yes |     |                             |
//! | [`RequireApproved`] | yes | yes | account still pending       |
//! | [`RequireAdmin`]    | yes | yes | email is not the admin's    |

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::Response,
};
use gatehouse_server_auth::{extract_bearer_token, AuthContext, Identity, User};
use tracing::instrument;

use crate::{api::AppState, error::ServerError};

#[instrument(
	name = "auth_layer",
	skip_all,
	fields(external_id = tracing::field::Empty)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let auth_ctx = match extract_bearer_token(request.headers()) {
		Some(token) => match state.token_verifier.verify(&token).await {
			Ok(claims) => {
				tracing::Span::current().record("external_id", claims.sub.as_str());
				AuthContext::authenticated(Identity::from(claims))
			}
			Err(e) => {
				tracing::debug!(error = %e, "session token rejected");
				AuthContext::unauthenticated()
			}
		},
		None => AuthContext::unauthenticated(),
	};

	request.extensions_mut().insert(auth_ctx);
	next.run(request).await
}

fn identity_from_parts(parts: &Parts) -> Result<Identity, ServerError> {
	parts
		.extensions
		.get::<AuthContext>()
		.and_then(|ctx| ctx.identity.clone())
		.ok_or_else(|| ServerError::Unauthorized("Authentication required".to_string()))
}

async fn load_user(state: &AppState, identity: &Identity) -> Result<User, ServerError> {
	state
		.user_store
		.get_user_by_external_id(&identity.external_id)
		.await?
		.ok_or_else(|| ServerError::NotFound("User not found".to_string()))
}

/// Extractor for the verified identity behind the request.
pub struct RequireAuth(pub Identity);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		identity_from_parts(parts).map(RequireAuth)
	}
}

/// Extractor for an authenticated user whose account has been approved.
pub struct RequireApproved(pub User);

impl FromRequestParts<AppState> for RequireApproved {
	type Rejection = ServerError;

	#[instrument(name = "RequireApproved::from_request_parts", skip_all)]
	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let identity = identity_from_parts(parts)?;
		let user = load_user(state, &identity).await?;

		if !user.is_approved() {
			tracing::debug!(user_id = %user.id, "account pending approval");
			return Err(ServerError::PendingApproval);
		}
		Ok(RequireApproved(user))
	}
}

/// Extractor for the configured administrator.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
	type Rejection = ServerError;

	#[instrument(name = "RequireAdmin::from_request_parts", skip_all)]
	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let identity = identity_from_parts(parts)?;
		let user = load_user(state, &identity).await?;

		if !state.admin_policy.is_admin(&user) {
			tracing::warn!(user_id = %user.id, "non-admin attempted admin access");
			return Err(ServerError::Forbidden(
				"Access denied. Admin only.".to_string(),
			));
		}
		Ok(RequireAdmin(user))
	}
}
