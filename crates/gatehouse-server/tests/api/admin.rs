// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for admin routes.
//!
//! Key invariant: ALL admin routes require the caller's email to equal the
//! configured admin email.

use axum::http::{Method, StatusCode};
use gatehouse_server_auth::{AccountStatus, UserId};

use super::support::{
	create_test_user, json_body, run_authz_cases, stranger_token, test_config, AuthzCase, TestApp,
};

#[tokio::test]
async fn admin_routes_reject_non_admins() {
	let app = TestApp::new().await;
	let target = app.fixtures.pending.user.id.to_string();

	let mut cases = Vec::new();
	for (method, path) in [
		(Method::GET, "/admin/pending".to_string()),
		(Method::POST, format!("/admin/approve/{target}")),
		(Method::DELETE, format!("/admin/reject/{target}")),
	] {
		cases.push(AuthzCase {
			name: "anonymous",
			method: method.clone(),
			path: path.clone(),
			token: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		});
		cases.push(AuthzCase {
			name: "approved_non_admin",
			method: method.clone(),
			path: path.clone(),
			token: Some(app.fixtures.approved.token()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		});
		cases.push(AuthzCase {
			name: "pending_non_admin",
			method: method.clone(),
			path: path.clone(),
			token: Some(app.fixtures.pending.token()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		});
		cases.push(AuthzCase {
			name: "no_local_account",
			method,
			path,
			token: Some(stranger_token()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		});
	}

	run_authz_cases(&app, &cases).await;

	// Nothing above may have changed the target.
	let user = app
		.state
		.user_store
		.get_user_by_id(&app.fixtures.pending.user.id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(user.status, AccountStatus::Pending);
}

#[tokio::test]
async fn forbidden_message_is_stable() {
	let app = TestApp::new().await;

	let response = app
		.get("/admin/pending", Some(&app.fixtures.approved.token()))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(
		json_body(response).await["message"],
		"Access denied. Admin only."
	);
}

#[tokio::test]
async fn pending_list_is_oldest_first() {
	let app = TestApp::new().await;
	let later = create_test_user(&app.state, "user_later", "later@example.com", false).await;

	let response = app
		.get("/admin/pending", Some(&app.fixtures.admin.token()))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;
	let ids: Vec<&str> = body
		.as_array()
		.unwrap()
		.iter()
		.map(|u| u["id"].as_str().unwrap())
		.collect();
	assert_eq!(
		ids,
		vec![
			app.fixtures.pending.user.id.to_string().as_str(),
			later.user.id.to_string().as_str()
		]
	);
	assert!(body
		.as_array()
		.unwrap()
		.iter()
		.all(|u| u["status"] == "pending"));
}

#[tokio::test]
async fn approve_moves_user_out_of_pending() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin.token();
	let target = &app.fixtures.pending;

	let response = app
		.post(&format!("/admin/approve/{}", target.user.id), Some(&admin))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;
	assert_eq!(body["message"], "User approved");
	assert_eq!(body["user"]["status"], "approved");

	let response = app.get("/admin/pending", Some(&admin)).await;
	assert!(json_body(response).await.as_array().unwrap().is_empty());

	// The newly approved user can now use gated endpoints.
	let response = app
		.put(
			"/user/me/public-key",
			Some(&target.token()),
			serde_json::json!({ "public_key": "ssh-ed25519 AAAA" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn approve_twice_is_a_no_op() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin.token();
	let path = format!("/admin/approve/{}", app.fixtures.pending.user.id);

	assert_eq!(app.post(&path, Some(&admin)).await.status(), StatusCode::OK);
	let response = app.post(&path, Some(&admin)).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["user"]["status"], "approved");
}

#[tokio::test]
async fn reject_deletes_user() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin.token();
	let target = &app.fixtures.pending;

	let response = app
		.delete(&format!("/admin/reject/{}", target.user.id), Some(&admin))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		json_body(response).await["message"],
		"User rejected and deleted"
	);

	let response = app.get("/user/me", Some(&target.token())).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let response = app
		.delete(&format!("/admin/reject/{}", target.user.id), Some(&admin))
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
	let app = TestApp::new().await;
	let admin = app.fixtures.admin.token();
	let unknown = UserId::generate();

	let cases = vec![
		AuthzCase {
			name: "approve_unknown",
			method: Method::POST,
			path: format!("/admin/approve/{unknown}"),
			token: Some(admin.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "reject_unknown",
			method: Method::DELETE,
			path: format!("/admin/reject/{unknown}"),
			token: Some(admin.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "approve_malformed",
			method: Method::POST,
			path: "/admin/approve/not-a-uuid".to_string(),
			token: Some(admin.clone()),
			body: None,
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "reject_malformed",
			method: Method::DELETE,
			path: "/admin/reject/42".to_string(),
			token: Some(admin),
			body: None,
			expected_status: StatusCode::BAD_REQUEST,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn admin_email_matches_case_insensitively() {
	let mut config = test_config();
	config.auth.admin_email = Some("  ADMIN@Gatehouse.Test ".to_string());
	let app = TestApp::with_config(config).await;

	let response = app
		.get("/admin/pending", Some(&app.fixtures.admin.token()))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn no_admin_configured_denies_everyone() {
	let mut config = test_config();
	config.auth.admin_email = None;
	let app = TestApp::with_config(config).await;

	let response = app
		.get("/admin/pending", Some(&app.fixtures.admin.token()))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
