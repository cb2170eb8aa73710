// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication state.
//!
//! The server's auth layer verifies the bearer token, then stores an
//! [`AuthContext`] in request extensions for extractors to read.
//!
//! ```text
//! Request → Authorization: Bearer <jwt> → IdentityTokenVerifier → AuthContext
//! ```

use http::header::AUTHORIZATION;
use http::HeaderMap;
use tracing::instrument;

use crate::token::IdentityClaims;

/// The identity-provider account behind a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
	pub external_id: String,
	pub session_id: Option<String>,
}

impl From<IdentityClaims> for Identity {
	fn from(claims: IdentityClaims) -> Self {
		Self {
			external_id: claims.sub,
			session_id: claims.sid,
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub identity: Option<Identity>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self { identity: None }
	}

	pub fn authenticated(identity: Identity) -> Self {
		Self {
			identity: Some(identity),
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.identity.is_some()
	}
}

/// Extract bearer token from the Authorization header.
///
/// Expects `Authorization: Bearer <token>`. The scheme match is
/// case-insensitive and an empty token counts as absent.
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
	let (scheme, token) = value.split_once(' ')?;
	if !scheme.eq_ignore_ascii_case("bearer") {
		return None;
	}
	let token = token.trim();
	(!token.is_empty()).then(|| token.to_string())
}
