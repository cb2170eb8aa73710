// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signing and verification for identity-provider webhooks.
//!
//! The provider signs each delivery with HMAC-SHA256 over
//! `"{svix-id}.{svix-timestamp}.{body}"` using a shared secret of the form
//! `whsec_<base64 key>`. The `svix-signature` header carries one or more
//! space-separated `v1,<base64 signature>` entries, any of which may match.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use http::HeaderMap;
use sha2::Sha256;
use tracing::{debug, warn};
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Accepted clock skew between the provider and this server, in either direction.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
	#[error("missing webhook header: {0}")]
	MissingHeader(&'static str),

	#[error("webhook timestamp is not a unix timestamp")]
	InvalidTimestamp,

	#[error("webhook timestamp is too old")]
	TimestampTooOld,

	#[error("webhook timestamp is too far in the future")]
	TimestampTooNew,

	#[error("webhook signing secret is invalid")]
	InvalidSecret,

	#[error("no matching webhook signature")]
	NoMatchingSignature,
}

/// Decoded HMAC key for webhook signatures.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct WebhookSecret {
	key: Vec<u8>,
}

impl WebhookSecret {
	/// Parse a signing secret as shown in the provider dashboard.
	///
	/// `whsec_`-prefixed secrets must carry valid base64. Unprefixed secrets
	/// are base64-decoded when possible and otherwise used as raw bytes.
	pub fn parse(secret: &str) -> Result<Self, WebhookError> {
		let secret = secret.trim();
		let key = match secret.strip_prefix(SECRET_PREFIX) {
			Some(encoded) => STANDARD
				.decode(encoded)
				.map_err(|_| WebhookError::InvalidSecret)?,
			None => STANDARD
				.decode(secret)
				.unwrap_or_else(|_| secret.as_bytes().to_vec()),
		};
		Self::from_bytes(key)
	}

	pub fn from_bytes(key: Vec<u8>) -> Result<Self, WebhookError> {
		if key.is_empty() {
			return Err(WebhookError::InvalidSecret);
		}
		Ok(Self { key })
	}

	fn mac(&self, msg_id: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, WebhookError> {
		let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|_| WebhookError::InvalidSecret)?;
		mac.update(msg_id.as_bytes());
		mac.update(b".");
		mac.update(timestamp.as_bytes());
		mac.update(b".");
		mac.update(payload);
		Ok(mac)
	}

	/// Produce a `svix-signature` header value (`v1,<base64>`).
	pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
		let mac = self.mac(msg_id, &timestamp.to_string(), payload)?;
		let digest = mac.finalize().into_bytes();
		Ok(format!("{SIGNATURE_VERSION},{}", STANDARD.encode(digest)))
	}

	fn matches(&self, msg_id: &str, timestamp: &str, payload: &[u8], signature: &[u8]) -> bool {
		match self.mac(msg_id, timestamp, payload) {
			Ok(mac) => mac.verify_slice(signature).is_ok(),
			Err(_) => false,
		}
	}
}

impl std::fmt::Debug for WebhookSecret {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WebhookSecret").finish_non_exhaustive()
	}
}

/// The three signature headers of a webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookHeaders<'a> {
	pub id: &'a str,
	pub timestamp: &'a str,
	pub signature: &'a str,
}

impl<'a> WebhookHeaders<'a> {
	pub fn from_http(headers: &'a HeaderMap) -> Result<Self, WebhookError> {
		fn get<'h>(headers: &'h HeaderMap, name: &'static str) -> Result<&'h str, WebhookError> {
			headers
				.get(name)
				.and_then(|v| v.to_str().ok())
				.filter(|v| !v.is_empty())
				.ok_or(WebhookError::MissingHeader(name))
		}

		Ok(Self {
			id: get(headers, HEADER_ID)?,
			timestamp: get(headers, HEADER_TIMESTAMP)?,
			signature: get(headers, HEADER_SIGNATURE)?,
		})
	}
}

/// Verifies webhook deliveries against one signing secret.
#[derive(Debug)]
pub struct WebhookVerifier {
	secret: WebhookSecret,
	tolerance: Duration,
}

impl WebhookVerifier {
	pub fn new(secret: WebhookSecret) -> Self {
		Self {
			secret,
			tolerance: DEFAULT_TOLERANCE,
		}
	}

	pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
		self.tolerance = tolerance;
		self
	}

	/// Verify a delivery against the current wall clock.
	pub fn verify(&self, headers: &WebhookHeaders<'_>, payload: &[u8]) -> Result<(), WebhookError> {
		self.verify_at(headers, payload, chrono::Utc::now().timestamp())
	}

	/// Verify a delivery as of `now` (unix seconds).
	pub fn verify_at(
		&self,
		headers: &WebhookHeaders<'_>,
		payload: &[u8],
		now: i64,
	) -> Result<(), WebhookError> {
		let timestamp: i64 = headers
			.timestamp
			.trim()
			.parse()
			.map_err(|_| WebhookError::InvalidTimestamp)?;

		let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
		if now.saturating_sub(timestamp) > tolerance {
			warn!(msg_id = %headers.id, timestamp, "webhook timestamp outside tolerance (too old)");
			return Err(WebhookError::TimestampTooOld);
		}
		if timestamp.saturating_sub(now) > tolerance {
			warn!(msg_id = %headers.id, timestamp, "webhook timestamp outside tolerance (too new)");
			return Err(WebhookError::TimestampTooNew);
		}

		let matched = headers
			.signature
			.split_whitespace()
			.filter_map(|entry| entry.split_once(','))
			.filter(|(version, _)| *version == SIGNATURE_VERSION)
			.filter_map(|(_, sig)| STANDARD.decode(sig).ok())
			.any(|sig| {
				self
					.secret
					.matches(headers.id, headers.timestamp, payload, &sig)
			});

		if matched {
			debug!(msg_id = %headers.id, "webhook signature verified");
			Ok(())
		} else {
			warn!(msg_id = %headers.id, "webhook signature verification failed");
			Err(WebhookError::NoMatchingSignature)
		}
	}
}
