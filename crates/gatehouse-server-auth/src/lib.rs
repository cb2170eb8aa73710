// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Accounts and authentication for Gatehouse.
//!
//! - [`types`]: [`User`], [`UserId`] and the [`AccountStatus`] gate
//! - [`token`]: session-token verification against a PEM key or JWKS
//! - [`middleware`]: [`AuthContext`] and bearer-token extraction
//! - [`admin`]: the single-admin [`AdminPolicy`]

pub mod admin;
pub mod middleware;
pub mod token;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use admin::AdminPolicy;
pub use middleware::{extract_bearer_token, AuthContext, Identity};
pub use token::{IdentityClaims, IdentityTokenVerifier, JwksCache, TokenError};
pub use types::{AccountStatus, UnknownStatus, User, UserId};
