// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Self-service routes. Key invariant: pending accounts can read their own
//! status but cannot use anything gated on approval.

use axum::http::{Method, StatusCode};
use gatehouse_server_api::MAX_PUBLIC_KEY_BYTES;
use gatehouse_server_auth::testing;
use serde_json::json;

use super::support::{json_body, run_authz_cases, stranger_token, AuthzCase, TestApp};

#[tokio::test]
async fn me_requires_authentication() {
	let app = TestApp::new().await;

	let response = app.get("/user/me", None).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let body = json_body(response).await;
	assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn me_rejects_bad_tokens() {
	let app = TestApp::new().await;
	let sub = app.fixtures.approved.user.external_id.clone();

	let mut expired = testing::claims_for(&sub);
	expired.exp = chrono::Utc::now().timestamp() - 3600;
	let foreign =
		testing::sign_token_with_key(&testing::claims_for(&sub), testing::FOREIGN_SIGNING_KEY_PEM, None);

	let cases = vec![
		AuthzCase {
			name: "garbage_token",
			method: Method::GET,
			path: "/user/me".to_string(),
			token: Some("not-a-jwt".to_string()),
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "expired_token",
			method: Method::GET,
			path: "/user/me".to_string(),
			token: Some(testing::sign_token(&expired)),
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "foreign_key",
			method: Method::GET,
			path: "/user/me".to_string(),
			token: Some(foreign),
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn me_returns_status_for_pending_and_approved() {
	let app = TestApp::new().await;

	let response = app
		.get("/user/me", Some(&app.fixtures.pending.token()))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["email"], "pending@example.com");
	assert_eq!(body["status"], "pending");

	let response = app
		.get("/user/me", Some(&app.fixtures.approved.token()))
		.await;
	assert_eq!(json_body(response).await["status"], "approved");
}

#[tokio::test]
async fn me_without_local_account_is_not_found() {
	let app = TestApp::new().await;

	let response = app.get("/user/me", Some(&stranger_token())).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(json_body(response).await["message"], "User not found");
}

#[tokio::test]
async fn public_key_requires_approval() {
	let app = TestApp::new().await;

	let cases = vec![
		AuthzCase {
			name: "anonymous",
			method: Method::PUT,
			path: "/user/me/public-key".to_string(),
			token: None,
			body: Some(json!({ "public_key": "ssh-ed25519 AAAA" })),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "pending_user",
			method: Method::PUT,
			path: "/user/me/public-key".to_string(),
			token: Some(app.fixtures.pending.token()),
			body: Some(json!({ "public_key": "ssh-ed25519 AAAA" })),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "no_local_account",
			method: Method::PUT,
			path: "/user/me/public-key".to_string(),
			token: Some(stranger_token()),
			body: Some(json!({ "public_key": "ssh-ed25519 AAAA" })),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "approved_user",
			method: Method::PUT,
			path: "/user/me/public-key".to_string(),
			token: Some(app.fixtures.approved.token()),
			body: Some(json!({ "public_key": "ssh-ed25519 AAAA" })),
			expected_status: StatusCode::OK,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn pending_rejection_names_the_reason() {
	let app = TestApp::new().await;

	let response = app
		.put(
			"/user/me/public-key",
			Some(&app.fixtures.pending.token()),
			json!({ "public_key": "ssh-ed25519 AAAA" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let body = json_body(response).await;
	assert_eq!(body["error"], "pending_approval");
	assert_eq!(body["message"], "Account pending approval");
}

#[tokio::test]
async fn public_key_is_stored_and_returned() {
	let app = TestApp::new().await;
	let token = app.fixtures.approved.token();

	let response = app
		.put(
			"/user/me/public-key",
			Some(&token),
			json!({ "public_key": "  ssh-ed25519 AAAAC3Nz  " }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["public_key"], "ssh-ed25519 AAAAC3Nz");

	let response = app.get("/user/me", Some(&token)).await;
	assert_eq!(json_body(response).await["public_key"], "ssh-ed25519 AAAAC3Nz");
}

#[tokio::test]
async fn public_key_validation() {
	let app = TestApp::new().await;
	let token = app.fixtures.approved.token();

	let response = app
		.put("/user/me/public-key", Some(&token), json!({ "public_key": "   " }))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let oversized = "k".repeat(MAX_PUBLIC_KEY_BYTES + 1);
	let response = app
		.put("/user/me/public-key", Some(&token), json!({ "public_key": oversized }))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_uses_error_shape() {
	let app = TestApp::new().await;

	let response = app
		.put(
			"/user/me/public-key",
			Some(&app.fixtures.approved.token()),
			json!({ "nope": 1 }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body = json_body(response).await;
	assert_eq!(body["error"], "bad_request");
	assert!(body["message"].as_str().unwrap().contains("public_key"));
}
