// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session-token verification and admin identity.

use gatehouse_common_config::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_LEEWAY_SECS: u64 = 5;

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Email of the single account allowed to review registrations.
	pub admin_email: Option<String>,
	/// Expected `iss` claim. Unchecked when unset.
	pub issuer: Option<String>,
	/// JWKS endpoint of the identity provider.
	pub jwks_url: Option<String>,
	/// PEM public key for networkless verification.
	pub public_key_pem: Option<SecretString>,
	/// Accepted `azp` values. Empty accepts any.
	pub authorized_parties: Vec<String>,
	pub leeway_secs: u64,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

impl AuthConfig {
	/// Exactly one key source must be configured, and a JWKS URL must be http(s).
	pub fn validate(&self) -> Result<(), ConfigError> {
		match (&self.jwks_url, &self.public_key_pem) {
			(Some(_), Some(_)) => Err(ConfigError::Validation(
				"set only one of GATEHOUSE_SERVER_AUTH_JWKS_URL and GATEHOUSE_SERVER_AUTH_PUBLIC_KEY"
					.to_string(),
			)),
			(None, None) => Err(ConfigError::Validation(
				"session token verification needs GATEHOUSE_SERVER_AUTH_JWKS_URL or \
				 GATEHOUSE_SERVER_AUTH_PUBLIC_KEY"
					.to_string(),
			)),
			(Some(url), None) if !(url.starts_with("https://") || url.starts_with("http://")) => {
				Err(ConfigError::Validation(format!(
					"auth jwks_url must be an http(s) URL, got: {url}"
				)))
			}
			(None, Some(pem)) if pem.expose().trim().is_empty() => Err(ConfigError::Validation(
				"auth public key cannot be empty".to_string(),
			)),
			_ => Ok(()),
		}
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub admin_email: Option<String>,
	#[serde(default)]
	pub issuer: Option<String>,
	#[serde(default)]
	pub jwks_url: Option<String>,
	#[serde(default)]
	pub public_key_pem: Option<SecretString>,
	#[serde(default)]
	pub authorized_parties: Option<Vec<String>>,
	#[serde(default)]
	pub leeway_secs: Option<u64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.admin_email.is_some() {
			self.admin_email = other.admin_email;
		}
		if other.issuer.is_some() {
			self.issuer = other.issuer;
		}
		if other.jwks_url.is_some() {
			self.jwks_url = other.jwks_url;
		}
		if other.public_key_pem.is_some() {
			self.public_key_pem = other.public_key_pem;
		}
		if other.authorized_parties.is_some() {
			self.authorized_parties = other.authorized_parties;
		}
		if other.leeway_secs.is_some() {
			self.leeway_secs = other.leeway_secs;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			admin_email: self
				.admin_email
				.map(|e| e.trim().to_string())
				.filter(|e| !e.is_empty()),
			issuer: self.issuer,
			jwks_url: self.jwks_url,
			public_key_pem: self.public_key_pem,
			authorized_parties: self.authorized_parties.unwrap_or_default(),
			leeway_secs: self.leeway_secs.unwrap_or(DEFAULT_LEEWAY_SECS),
		}
	}
}
