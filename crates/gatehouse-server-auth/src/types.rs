// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core account types.
//!
//! - [`UserId`]: local primary key, a UUID v4 newtype
//! - [`AccountStatus`]: the two-state registration gate
//! - [`User`]: a locally mirrored identity-provider account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			pub fn into_inner(self) -> Uuid {
				self.0
			}

			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Uuid::parse_str(s).map(Self)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a local user record.");

/// Registration state of an account.
///
/// Accounts start `Pending` and may only move to `Approved`. Rejection removes
/// the record instead of adding a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
	#[default]
	Pending,
	Approved,
}

impl AccountStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			AccountStatus::Pending => "pending",
			AccountStatus::Approved => "approved",
		}
	}

	/// Staying put is always allowed so approval stays idempotent.
	pub fn can_transition_to(self, next: AccountStatus) -> bool {
		matches!(
			(self, next),
			(AccountStatus::Pending, _) | (AccountStatus::Approved, AccountStatus::Approved)
		)
	}
}

impl fmt::Display for AccountStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown account status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for AccountStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(AccountStatus::Pending),
			"approved" => Ok(AccountStatus::Approved),
			other => Err(UnknownStatus(other.to_string())),
		}
	}
}

/// A user mirrored from the identity provider.
///
/// `email` and `username` are PII and should not be logged at info level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	/// The identity provider's user id (session token `sub`).
	pub external_id: String,
	pub email: String,
	pub username: String,
	pub public_key: Option<String>,
	pub status: AccountStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	pub fn is_approved(&self) -> bool {
		self.status == AccountStatus::Approved
	}
}
