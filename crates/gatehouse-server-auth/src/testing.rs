// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test fixtures: a throwaway RSA key pair and a session-token signer.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::token::IdentityClaims;

pub const SIGNING_KEY_PEM: &str = include_str!("../testdata/signing_key.pem");
pub const VERIFYING_KEY_PEM: &str = include_str!("../testdata/verifying_key.pem");
pub const FOREIGN_SIGNING_KEY_PEM: &str = include_str!("../testdata/foreign_signing_key.pem");
/// JWKS document publishing the public half of [`SIGNING_KEY_PEM`].
pub const JWKS_JSON: &str = include_str!("../testdata/jwks.json");
pub const TEST_KID: &str = "gatehouse-test-1";

/// Claims for `sub` valid for the next hour.
pub fn claims_for(sub: &str) -> IdentityClaims {
	let now = chrono::Utc::now().timestamp();
	IdentityClaims {
		sub: sub.to_string(),
		exp: now + 3600,
		nbf: Some(now - 5),
		iat: Some(now),
		iss: None,
		azp: None,
		sid: Some(format!("sess_{sub}")),
	}
}

pub fn sign_token(claims: &IdentityClaims) -> String {
	sign_token_with_key(claims, SIGNING_KEY_PEM, None)
}

pub fn sign_token_with_kid(claims: &IdentityClaims, kid: &str) -> String {
	sign_token_with_key(claims, SIGNING_KEY_PEM, Some(kid))
}

pub fn sign_token_with_key(claims: &IdentityClaims, pem: &str, kid: Option<&str>) -> String {
	let mut header = Header::new(Algorithm::RS256);
	header.kid = kid.map(str::to_string);
	let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("test signing key is valid PEM");
	encode(&header, claims, &key).expect("signing test token")
}
