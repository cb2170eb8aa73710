// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Build information for gatehouse-server.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct BuildInfo {
	pub version: String,
	/// From `GATEHOUSE_GIT_SHA` at build time, or `unknown`.
	pub git_sha: String,
}

impl BuildInfo {
	pub fn current() -> Self {
		Self {
			version: env!("CARGO_PKG_VERSION").to_string(),
			git_sha: option_env!("GATEHOUSE_GIT_SHA")
				.unwrap_or("unknown")
				.to_string(),
		}
	}
}

/// Format version info for display.
pub fn format_version_info() -> String {
	let info = BuildInfo::current();
	format!(
		"gatehouse-server version: {}\n\
         Git SHA:                  {}",
		info.version, info.git_sha,
	)
}
