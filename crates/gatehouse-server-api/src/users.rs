// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use gatehouse_server_auth::User;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Upper bound on a stored public key, in bytes.
pub const MAX_PUBLIC_KEY_BYTES: usize = 8 * 1024;

/// A user record as shown to the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserResponse {
	pub id: String,
	pub external_id: String,
	pub email: String,
	pub username: String,
	pub public_key: Option<String>,
	/// `pending` or `approved`.
	pub status: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
	fn from(user: User) -> Self {
		Self {
			id: user.id.to_string(),
			external_id: user.external_id,
			email: user.email,
			username: user.username,
			public_key: user.public_key,
			status: user.status.to_string(),
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

/// The caller's own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MeResponse {
	pub email: String,
	pub status: String,
	pub username: String,
	pub public_key: Option<String>,
}

impl From<User> for MeResponse {
	fn from(user: User) -> Self {
		Self {
			email: user.email,
			status: user.status.to_string(),
			username: user.username,
			public_key: user.public_key,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdatePublicKeyRequest {
	pub public_key: String,
}

impl UpdatePublicKeyRequest {
	/// The trimmed key, or an error message when it is empty or too large.
	pub fn validated(&self) -> Result<&str, &'static str> {
		let key = self.public_key.trim();
		if key.is_empty() {
			return Err("public_key cannot be empty");
		}
		if key.len() > MAX_PUBLIC_KEY_BYTES {
			return Err("public_key exceeds 8 KiB");
		}
		Ok(key)
	}
}
