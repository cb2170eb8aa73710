// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity-provider webhook configuration section.

use gatehouse_common_config::SecretString;
use serde::Deserialize;

const DEFAULT_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct WebhookConfig {
	/// `whsec_...` secret from the provider dashboard. Webhooks are refused
	/// while this is unset.
	pub signing_secret: Option<SecretString>,
	pub tolerance_secs: u64,
}

impl Default for WebhookConfig {
	fn default() -> Self {
		WebhookConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfigLayer {
	#[serde(default)]
	pub signing_secret: Option<SecretString>,
	#[serde(default)]
	pub tolerance_secs: Option<u64>,
}

impl WebhookConfigLayer {
	pub fn merge(&mut self, other: WebhookConfigLayer) {
		if other.signing_secret.is_some() {
			self.signing_secret = other.signing_secret;
		}
		if other.tolerance_secs.is_some() {
			self.tolerance_secs = other.tolerance_secs;
		}
	}

	pub fn finalize(self) -> WebhookConfig {
		WebhookConfig {
			signing_secret: self.signing_secret,
			tolerance_secs: self.tolerance_secs.unwrap_or(DEFAULT_TOLERANCE_SECS),
		}
	}
}
