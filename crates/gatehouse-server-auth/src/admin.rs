// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Who may review registrations.

use crate::types::User;

/// Single-admin policy: the account whose email matches the configured one.
///
/// With no admin email configured nobody is an admin.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
	admin_email: Option<String>,
}

impl AdminPolicy {
	pub fn new(admin_email: Option<String>) -> Self {
		let admin_email = admin_email
			.map(|e| e.trim().to_lowercase())
			.filter(|e| !e.is_empty());
		Self { admin_email }
	}

	pub fn is_configured(&self) -> bool {
		self.admin_email.is_some()
	}

	pub fn is_admin_email(&self, email: &str) -> bool {
		self.admin_email
			.as_deref()
			.is_some_and(|admin| admin == email.trim().to_lowercase())
	}

	pub fn is_admin(&self, user: &User) -> bool {
		self.is_admin_email(&user.email)
	}
}
