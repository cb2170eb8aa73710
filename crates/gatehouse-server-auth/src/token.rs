// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Verification of identity-provider session tokens.
//!
//! Session tokens are RS256 (or other RSA-family) JWTs. The verifying key comes
//! from one of two places:
//!
//! - a PEM public key configured up front, so no network is needed, or
//! - the provider's JWKS endpoint. Keys are cached by `kid` and the set is
//!   refetched when a token names a `kid` the cache does not hold, which
//!   covers key rotation. Refetches are serialized and rate limited, so a
//!   stream of bogus `kid`s costs at most one fetch per interval.
//!
//! Token values are never logged.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gatehouse_server_config::AuthConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Minimum time between two JWKS fetches triggered by cache misses.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const RSA_ALGORITHMS: &[Algorithm] = &[
	Algorithm::RS256,
	Algorithm::RS384,
	Algorithm::RS512,
	Algorithm::PS256,
	Algorithm::PS384,
	Algorithm::PS512,
];

/// Claims read from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
	/// External user id.
	pub sub: String,
	pub exp: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nbf: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	/// Authorized party: the origin the token was minted for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub azp: Option<String>,
	/// Provider session id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sid: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
	#[error("token has expired")]
	Expired,

	#[error("token is not valid yet")]
	NotYetValid,

	#[error("invalid token signature")]
	InvalidSignature,

	#[error("token issuer mismatch")]
	InvalidIssuer,

	#[error("unsupported token algorithm: {0:?}")]
	UnsupportedAlgorithm(Algorithm),

	#[error("token header has no kid")]
	MissingKid,

	#[error("no signing key found for kid: {0}")]
	KeyNotFound(String),

	#[error("failed to fetch JWKS: {0}")]
	JwksFetch(String),

	#[error("invalid verification key: {0}")]
	InvalidKey(String),

	#[error("token authorized party not allowed: {0}")]
	UnauthorizedParty(String),

	#[error("invalid token: {0}")]
	Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		match err.kind() {
			ErrorKind::ExpiredSignature => TokenError::Expired,
			ErrorKind::ImmatureSignature => TokenError::NotYetValid,
			ErrorKind::InvalidSignature => TokenError::InvalidSignature,
			ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
			ErrorKind::InvalidRsaKey(msg) => TokenError::InvalidKey(msg.clone()),
			ErrorKind::InvalidKeyFormat => TokenError::InvalidKey("invalid key format".to_string()),
			_ => TokenError::Invalid(err.to_string()),
		}
	}
}

/// Cache of provider signing keys keyed by `kid`.
#[derive(Clone)]
pub struct JwksCache {
	url: String,
	http: reqwest::Client,
	keys: Arc<RwLock<HashMap<String, Jwk>>>,
	/// Held for the whole fetch; also records when the last fetch started.
	last_refresh: Arc<Mutex<Option<Instant>>>,
	min_refresh_interval: Duration,
}

impl JwksCache {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			http: reqwest::Client::new(),
			keys: Arc::new(RwLock::new(HashMap::new())),
			last_refresh: Arc::new(Mutex::new(None)),
			min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
		}
	}

	pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
		self.min_refresh_interval = interval;
		self
	}

	/// Replace the cached keys. Keys without a `kid` are skipped.
	pub async fn replace(&self, set: JwkSet) -> usize {
		let fresh: HashMap<String, Jwk> = set
			.keys
			.into_iter()
			.filter_map(|jwk| jwk.common.key_id.clone().map(|kid| (kid, jwk)))
			.collect();
		let count = fresh.len();
		*self.keys.write().await = fresh;
		count
	}

	async fn cached(&self, kid: &str) -> Option<Jwk> {
		self.keys.read().await.get(kid).cloned()
	}

	async fn get(&self, kid: &str) -> Result<Jwk, TokenError> {
		if let Some(jwk) = self.cached(kid).await {
			return Ok(jwk);
		}

		let mut last_refresh = self.last_refresh.lock().await;

		// Another request may have refreshed while we waited for the lock.
		if let Some(jwk) = self.cached(kid).await {
			return Ok(jwk);
		}

		if let Some(at) = *last_refresh {
			if at.elapsed() < self.min_refresh_interval {
				debug!(kid, "signing key not cached, JWKS refresh on cooldown");
				return Err(TokenError::KeyNotFound(kid.to_string()));
			}
		}

		debug!(kid, "signing key not cached, refreshing JWKS");
		*last_refresh = Some(Instant::now());
		self.fetch().await?;
		drop(last_refresh);

		self.cached(kid)
			.await
			.ok_or_else(|| TokenError::KeyNotFound(kid.to_string()))
	}

	#[instrument(skip(self), fields(url = %self.url))]
	async fn fetch(&self) -> Result<(), TokenError> {
		let response = self
			.http
			.get(&self.url)
			.send()
			.await
			.map_err(|e| TokenError::JwksFetch(e.to_string()))?;

		if !response.status().is_success() {
			return Err(TokenError::JwksFetch(format!(
				"JWKS endpoint returned status {}",
				response.status()
			)));
		}

		let set: JwkSet = response
			.json()
			.await
			.map_err(|e| TokenError::JwksFetch(format!("malformed JWKS document: {e}")))?;

		let count = self.replace(set).await;
		info!(keys = count, "JWKS cache refreshed");
		Ok(())
	}
}

enum KeySource {
	Static(DecodingKey),
	Jwks(JwksCache),
}

/// Verifies session tokens and returns their claims.
pub struct IdentityTokenVerifier {
	keys: KeySource,
	issuer: Option<String>,
	authorized_parties: Vec<String>,
	leeway_secs: u64,
}

impl std::fmt::Debug for IdentityTokenVerifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let source = match &self.keys {
			KeySource::Static(_) => "pem",
			KeySource::Jwks(_) => "jwks",
		};
		f.debug_struct("IdentityTokenVerifier")
			.field("key_source", &source)
			.field("issuer", &self.issuer)
			.field("authorized_parties", &self.authorized_parties)
			.field("leeway_secs", &self.leeway_secs)
			.finish()
	}
}

impl IdentityTokenVerifier {
	pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
		let keys = match (&config.public_key_pem, &config.jwks_url) {
			(Some(pem), _) => KeySource::Static(DecodingKey::from_rsa_pem(pem.expose().as_bytes())?),
			(None, Some(url)) => KeySource::Jwks(JwksCache::new(url.clone())),
			(None, None) => {
				return Err(TokenError::InvalidKey(
					"no public key or JWKS URL configured".to_string(),
				))
			}
		};

		Ok(Self {
			keys,
			issuer: config.issuer.clone(),
			authorized_parties: config.authorized_parties.clone(),
			leeway_secs: config.leeway_secs,
		})
	}

	/// Build a verifier around an existing JWKS cache.
	pub fn with_jwks(cache: JwksCache, config: &AuthConfig) -> Self {
		Self {
			keys: KeySource::Jwks(cache),
			issuer: config.issuer.clone(),
			authorized_parties: config.authorized_parties.clone(),
			leeway_secs: config.leeway_secs,
		}
	}

	#[instrument(level = "debug", skip_all)]
	pub async fn verify(&self, token: &str) -> Result<IdentityClaims, TokenError> {
		let header = decode_header(token)?;
		if !RSA_ALGORITHMS.contains(&header.alg) {
			return Err(TokenError::UnsupportedAlgorithm(header.alg));
		}

		let key = match &self.keys {
			KeySource::Static(key) => key.clone(),
			KeySource::Jwks(cache) => {
				let kid = header.kid.as_deref().ok_or(TokenError::MissingKid)?;
				let jwk = cache.get(kid).await?;
				DecodingKey::from_jwk(&jwk).map_err(|e| TokenError::InvalidKey(e.to_string()))?
			}
		};

		let claims = decode::<IdentityClaims>(token, &key, &self.validation(header.alg))
			.map_err(|e| {
				debug!(kind = ?e.kind(), "session token rejected");
				TokenError::from(e)
			})?
			.claims;

		self.check_authorized_party(&claims)?;
		Ok(claims)
	}

	fn validation(&self, alg: Algorithm) -> Validation {
		let mut validation = Validation::new(alg);
		validation.algorithms = vec![alg];
		validation.leeway = self.leeway_secs;
		validation.validate_nbf = true;
		validation.validate_aud = false;
		validation.set_required_spec_claims(&["exp", "sub"]);
		if let Some(issuer) = &self.issuer {
			validation.set_issuer(&[issuer]);
		}
		validation
	}

	/// A token without `azp` passes; one naming an unlisted party does not.
	fn check_authorized_party(&self, claims: &IdentityClaims) -> Result<(), TokenError> {
		if self.authorized_parties.is_empty() {
			return Ok(());
		}
		match &claims.azp {
			Some(azp) if !self.authorized_parties.iter().any(|p| p == azp) => {
				warn!(azp = %azp, "session token minted for an unlisted party");
				Err(TokenError::UnauthorizedParty(azp.clone()))
			}
			_ => Ok(()),
		}
	}
}
