// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;
use std::time::Duration;

use axum::{
	http::{header, HeaderValue, Method},
	routing::{delete, get, post, put},
	Json, Router,
};
use gatehouse_common_webhook::{WebhookSecret, WebhookVerifier};
use gatehouse_server_auth::{AdminPolicy, IdentityTokenVerifier};
use gatehouse_server_config::ServerConfig;
use gatehouse_server_db::{UserRepository, UserStore};
use sqlx::sqlite::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::{
	error::ServerError,
	routes,
	typed_router::{AuthedRouter, PublicRouter},
};

#[derive(Clone)]
pub struct AppState {
	pub user_store: Arc<dyn UserStore>,
	pub token_verifier: Arc<IdentityTokenVerifier>,
	pub admin_policy: AdminPolicy,
	/// `None` when no signing secret is configured; webhooks are then refused.
	pub webhook_verifier: Option<Arc<WebhookVerifier>>,
}

/// Build the shared state from configuration.
///
/// # Errors
/// `ServerError::Config` if the token key or webhook secret cannot be parsed.
pub async fn create_app_state(
	pool: SqlitePool,
	config: &ServerConfig,
) -> Result<AppState, ServerError> {
	for warning in config.review_warnings() {
		tracing::warn!("{warning}");
	}

	let token_verifier = IdentityTokenVerifier::from_config(&config.auth)
		.map_err(|e| ServerError::Config(format!("session token verifier: {e}")))?;

	let webhook_verifier = match &config.webhook.signing_secret {
		Some(secret) => {
			let secret = WebhookSecret::parse(secret.expose())
				.map_err(|e| ServerError::Config(format!("webhook signing secret: {e}")))?;
			Some(Arc::new(
				WebhookVerifier::new(secret)
					.with_tolerance(Duration::from_secs(config.webhook.tolerance_secs)),
			))
		}
		None => None,
	};

	Ok(AppState {
		user_store: Arc::new(UserRepository::new(pool)),
		token_verifier: Arc::new(token_verifier),
		admin_policy: AdminPolicy::new(config.auth.admin_email.clone()),
		webhook_verifier,
	})
}

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
	let public = PublicRouter::new()
		.route("/", get(routes::health::root))
		.route("/health", get(routes::health::health_check))
		.route("/api/openapi.json", get(openapi_json))
		.route("/webhooks/identity", post(routes::webhooks::identity_webhook))
		.build();

	let authed = AuthedRouter::new()
		.route("/user/me", get(routes::users::get_me))
		.route("/user/me/public-key", put(routes::users::update_public_key))
		.route("/admin/pending", get(routes::admin::list_pending))
		.route("/admin/approve/{id}", post(routes::admin::approve_user))
		.route("/admin/reject/{id}", delete(routes::admin::reject_user))
		.build(state.clone());

	Router::new().merge(public).merge(authed).with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(crate::api_docs::ApiDoc::openapi())
}

/// CORS policy: the configured frontend origin, or any origin when unset.
pub fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
	let origin = frontend_url.and_then(|url| match HeaderValue::from_str(url) {
		Ok(value) => Some(value),
		Err(e) => {
			tracing::warn!(frontend_url = %url, error = %e, "invalid frontend URL, allowing any origin");
			None
		}
	});

	match origin {
		Some(origin) => CorsLayer::new()
			.allow_origin(origin)
			.allow_methods([
				Method::GET,
				Method::POST,
				Method::PUT,
				Method::DELETE,
				Method::OPTIONS,
			])
			.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
			.allow_credentials(true),
		None => CorsLayer::new()
			.allow_origin(Any)
			.allow_methods(Any)
			.allow_headers(Any),
	}
}
