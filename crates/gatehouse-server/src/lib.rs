// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP server for registration gatekeeping.
//!
//! New accounts arrive through the identity-provider webhook as `pending`.
//! The configured administrator approves or rejects them, and only approved
//! accounts may use the gated endpoints.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod db;
pub mod error;
pub mod health;
pub mod routes;
pub mod typed_router;
pub mod version;

pub use api::{cors_layer, create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use error::{ErrorResponse, ServerError};
pub use gatehouse_server_config::ServerConfig;
pub use typed_router::{AuthedRouter, PublicRouter};
