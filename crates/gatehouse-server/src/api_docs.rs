// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for gatehouse-server.
//!
//! The raw JSON document is served at `/api/openapi.json`.

use utoipa::{
	openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
	Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gatehouse Server API",
        version = "1.0.0",
        description = "Registration gatekeeping: identity-provider webhooks create pending accounts that an administrator approves or rejects.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Liveness and health checks"),
        (name = "users", description = "The signed-in user's own account"),
        (name = "admin", description = "Registration review (admin only)"),
        (name = "webhooks", description = "Identity-provider event sync")
    ),
    paths(
        crate::routes::health::root,
        crate::routes::health::health_check,
        crate::routes::users::get_me,
        crate::routes::users::update_public_key,
        crate::routes::admin::list_pending,
        crate::routes::admin::approve_user,
        crate::routes::admin::reject_user,
        crate::routes::webhooks::identity_webhook,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            gatehouse_server_api::MessageResponse,
            gatehouse_server_api::MeResponse,
            gatehouse_server_api::UserResponse,
            gatehouse_server_api::UpdatePublicKeyRequest,
            gatehouse_server_api::ApproveUserResponse,
            gatehouse_server_api::IdentityEvent,
            gatehouse_server_api::IdentityUserData,
            gatehouse_server_api::EmailAddress,
            gatehouse_server_api::DeletedObjectData,
            crate::health::HealthStatus,
            crate::health::HealthResponse,
            crate::health::HealthComponents,
            crate::health::DatabaseHealth,
            crate::health::ReviewHealth,
            crate::version::BuildInfo,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
	fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
		if let Some(components) = openapi.components.as_mut() {
			components.add_security_scheme(
				"bearer",
				SecurityScheme::Http(
					HttpBuilder::new()
						.scheme(HttpAuthScheme::Bearer)
						.bearer_format("JWT")
						.build(),
				),
			);
		}
	}
}
