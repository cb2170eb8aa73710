// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity webhook tests. Signatures are produced with the same secret the
//! server is configured with.

use axum::http::StatusCode;
use gatehouse_common_webhook::{WebhookSecret, HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP};
use gatehouse_server_auth::AccountStatus;
use serde_json::json;

use super::support::{json_body, test_config, TestApp, WEBHOOK_SECRET};

fn user_created(id: &str, email: &str, username: Option<&str>) -> serde_json::Value {
	json!({
		"type": "user.created",
		"data": {
			"id": id,
			"email_addresses": [{ "id": "idn_1", "email_address": email }],
			"primary_email_address_id": "idn_1",
			"username": username,
		}
	})
}

#[tokio::test]
async fn user_created_inserts_pending_user() {
	let app = TestApp::new().await;

	let response = app
		.post_webhook(&user_created("user_new", "new@example.com", Some("newbie")))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["message"], "Webhook received");

	let user = app
		.state
		.user_store
		.get_user_by_external_id("user_new")
		.await
		.unwrap()
		.unwrap();
	assert_eq!(user.email, "new@example.com");
	assert_eq!(user.username, "newbie");
	assert_eq!(user.status, AccountStatus::Pending);

	let response = app
		.get("/admin/pending", Some(&app.fixtures.admin.token()))
		.await;
	let pending = json_body(response).await;
	assert!(pending
		.as_array()
		.unwrap()
		.iter()
		.any(|u| u["external_id"] == "user_new"));
}

#[tokio::test]
async fn username_falls_back_to_email() {
	let app = TestApp::new().await;

	let response = app
		.post_webhook(&user_created("user_nameless", "nameless@example.com", None))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let user = app
		.state
		.user_store
		.get_user_by_external_id("user_nameless")
		.await
		.unwrap()
		.unwrap();
	assert_eq!(user.username, "nameless@example.com");
}

#[tokio::test]
async fn primary_email_is_preferred() {
	let app = TestApp::new().await;
	let payload = json!({
		"type": "user.created",
		"data": {
			"id": "user_multi",
			"email_addresses": [
				{ "id": "idn_a", "email_address": "old@example.com" },
				{ "id": "idn_b", "email_address": "primary@example.com" }
			],
			"primary_email_address_id": "idn_b",
			"username": "multi"
		}
	});

	assert_eq!(app.post_webhook(&payload).await.status(), StatusCode::OK);
	let user = app
		.state
		.user_store
		.get_user_by_external_id("user_multi")
		.await
		.unwrap()
		.unwrap();
	assert_eq!(user.email, "primary@example.com");
}

#[tokio::test]
async fn duplicate_user_created_is_acknowledged() {
	let app = TestApp::new().await;
	let payload = user_created("user_dup", "dup@example.com", Some("dup"));

	assert_eq!(app.post_webhook(&payload).await.status(), StatusCode::OK);
	let response = app.post_webhook(&payload).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["message"], "User already exists");
}

#[tokio::test]
async fn duplicate_existing_user_keeps_status() {
	let app = TestApp::new().await;
	let approved = &app.fixtures.approved.user;

	let response = app
		.post_webhook(&user_created(&approved.external_id, &approved.email, Some("other")))
		.await;
	assert_eq!(json_body(response).await["message"], "User already exists");

	let user = app
		.state
		.user_store
		.get_user_by_id(&approved.id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(user.status, AccountStatus::Approved);
}

#[tokio::test]
async fn username_collision_is_conflict() {
	let app = TestApp::new().await;

	let response = app
		.post_webhook(&user_created("user_clash", "clash@example.com", Some("approved")))
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(json_body(response).await["error"], "conflict");
}

#[tokio::test]
async fn missing_email_is_rejected() {
	let app = TestApp::new().await;
	let payload = json!({
		"type": "user.created",
		"data": { "id": "user_noemail", "email_addresses": [] }
	});

	let response = app.post_webhook(&payload).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(response).await["message"],
		"Invalid payload: missing email"
	);
}

#[tokio::test]
async fn user_updated_refreshes_identity_only() {
	let app = TestApp::new().await;
	let approved = &app.fixtures.approved.user;
	let payload = json!({
		"type": "user.updated",
		"data": {
			"id": approved.external_id,
			"email_addresses": [{ "id": "idn_1", "email_address": "renamed@example.com" }],
			"primary_email_address_id": "idn_1",
			"username": "renamed"
		}
	});

	assert_eq!(app.post_webhook(&payload).await.status(), StatusCode::OK);

	let user = app
		.state
		.user_store
		.get_user_by_id(&approved.id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(user.email, "renamed@example.com");
	assert_eq!(user.username, "renamed");
	assert_eq!(user.status, AccountStatus::Approved);
}

#[tokio::test]
async fn user_updated_for_unknown_user_is_ignored() {
	let app = TestApp::new().await;
	let payload = json!({
		"type": "user.updated",
		"data": {
			"id": "user_ghost",
			"email_addresses": [{ "email_address": "ghost@example.com" }]
		}
	});

	assert_eq!(app.post_webhook(&payload).await.status(), StatusCode::OK);
	assert!(app
		.state
		.user_store
		.get_user_by_external_id("user_ghost")
		.await
		.unwrap()
		.is_none());
}

#[tokio::test]
async fn user_updated_without_email_for_unknown_user_is_ignored() {
	let app = TestApp::new().await;
	let payload = json!({
		"type": "user.updated",
		"data": { "id": "user_ghost", "email_addresses": [] }
	});

	let response = app.post_webhook(&payload).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["message"], "Webhook received");
}

#[tokio::test]
async fn user_updated_without_email_keeps_stored_address() {
	let app = TestApp::new().await;
	let approved = &app.fixtures.approved.user;
	let payload = json!({
		"type": "user.updated",
		"data": {
			"id": approved.external_id,
			"email_addresses": [],
			"username": "phone_only"
		}
	});

	assert_eq!(app.post_webhook(&payload).await.status(), StatusCode::OK);

	let user = app
		.state
		.user_store
		.get_user_by_id(&approved.id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(user.email, approved.email);
	assert_eq!(user.username, "phone_only");
	assert_eq!(user.status, AccountStatus::Approved);
}

#[tokio::test]
async fn user_deleted_removes_record() {
	let app = TestApp::new().await;
	let pending = &app.fixtures.pending.user;
	let payload = json!({
		"type": "user.deleted",
		"data": { "id": pending.external_id, "deleted": true }
	});

	assert_eq!(app.post_webhook(&payload).await.status(), StatusCode::OK);
	assert!(app
		.state
		.user_store
		.get_user_by_id(&pending.id)
		.await
		.unwrap()
		.is_none());

	// Deleting again is still acknowledged.
	assert_eq!(app.post_webhook(&payload).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn other_events_are_ignored() {
	let app = TestApp::new().await;
	let payload = json!({ "type": "session.created", "data": { "id": "sess_1" } });

	let response = app.post_webhook(&payload).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["message"], "Webhook received");
}

#[tokio::test]
async fn missing_headers_are_rejected() {
	let app = TestApp::new().await;
	let body = serde_json::to_vec(&user_created("user_x", "x@example.com", None)).unwrap();

	let response = app
		.post_webhook_raw(body, &[(HEADER_ID, "msg_1".to_string())])
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["message"], "Missing svix headers");
}

#[tokio::test]
async fn tampered_body_fails_verification() {
	let app = TestApp::new().await;
	let signed = serde_json::to_vec(&user_created("user_x", "x@example.com", None)).unwrap();
	let sent = serde_json::to_vec(&user_created("user_y", "y@example.com", None)).unwrap();
	let timestamp = chrono::Utc::now().timestamp();
	let signature = WebhookSecret::parse(WEBHOOK_SECRET)
		.unwrap()
		.sign("msg_1", timestamp, &signed)
		.unwrap();

	let response = app
		.post_webhook_raw(
			sent,
			&[
				(HEADER_ID, "msg_1".to_string()),
				(HEADER_TIMESTAMP, timestamp.to_string()),
				(HEADER_SIGNATURE, signature),
			],
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(response).await["message"],
		"Webhook verification failed"
	);
	assert!(app
		.state
		.user_store
		.get_user_by_external_id("user_y")
		.await
		.unwrap()
		.is_none());
}

#[tokio::test]
async fn stale_timestamp_fails_verification() {
	let app = TestApp::new().await;
	let body = serde_json::to_vec(&user_created("user_old", "old@example.com", None)).unwrap();
	let timestamp = chrono::Utc::now().timestamp() - 3600;
	let signature = WebhookSecret::parse(WEBHOOK_SECRET)
		.unwrap()
		.sign("msg_old", timestamp, &body)
		.unwrap();

	let response = app
		.post_webhook_raw(
			body,
			&[
				(HEADER_ID, "msg_old".to_string()),
				(HEADER_TIMESTAMP, timestamp.to_string()),
				(HEADER_SIGNATURE, signature),
			],
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_garbage_is_invalid_payload() {
	let app = TestApp::new().await;
	let body = b"not json".to_vec();
	let timestamp = chrono::Utc::now().timestamp();
	let signature = WebhookSecret::parse(WEBHOOK_SECRET)
		.unwrap()
		.sign("msg_bad", timestamp, &body)
		.unwrap();

	let response = app
		.post_webhook_raw(
			body,
			&[
				(HEADER_ID, "msg_bad".to_string()),
				(HEADER_TIMESTAMP, timestamp.to_string()),
				(HEADER_SIGNATURE, signature),
			],
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["message"], "Invalid payload");
}

#[tokio::test]
async fn unconfigured_secret_is_server_error() {
	let mut config = test_config();
	config.webhook.signing_secret = None;
	let app = TestApp::with_config(config).await;

	let response = app
		.post_webhook(&user_created("user_z", "z@example.com", None))
		.await;
	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(json_body(response).await["error"], "not_configured");
}
