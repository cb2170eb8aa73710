// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity-provider webhook payloads.
//!
//! Events arrive as `{"type": "...", "data": {...}}`. `data` is kept as raw
//! JSON until the event type says how to read it.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct IdentityEvent {
	#[serde(rename = "type")]
	pub event_type: String,
	#[serde(default)]
	#[cfg_attr(feature = "openapi", schema(value_type = Object))]
	pub data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityEventType {
	UserCreated,
	UserUpdated,
	UserDeleted,
	Other,
}

impl IdentityEvent {
	pub fn kind(&self) -> IdentityEventType {
		match self.event_type.as_str() {
			"user.created" => IdentityEventType::UserCreated,
			"user.updated" => IdentityEventType::UserUpdated,
			"user.deleted" => IdentityEventType::UserDeleted,
			_ => IdentityEventType::Other,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EmailAddress {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub email_address: Option<String>,
}

/// `data` of `user.created` and `user.updated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct IdentityUserData {
	pub id: String,
	#[serde(default)]
	pub email_addresses: Vec<EmailAddress>,
	#[serde(default)]
	pub primary_email_address_id: Option<String>,
	#[serde(default)]
	pub username: Option<String>,
}

impl IdentityUserData {
	/// The primary address if the provider flags one, else the first listed.
	pub fn primary_email(&self) -> Option<&str> {
		let flagged = self.primary_email_address_id.as_deref().and_then(|primary| {
			self.email_addresses
				.iter()
				.find(|e| e.id.as_deref() == Some(primary))
		});

		flagged
			.or_else(|| self.email_addresses.first())
			.and_then(|e| e.email_address.as_deref())
			.map(str::trim)
			.filter(|e| !e.is_empty())
	}

	/// Provider username, falling back to the email.
	pub fn username_or<'a>(&'a self, email: &'a str) -> &'a str {
		self.username
			.as_deref()
			.map(str::trim)
			.filter(|u| !u.is_empty())
			.unwrap_or(email)
	}
}

/// `data` of `user.deleted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DeletedObjectData {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub deleted: bool,
}
