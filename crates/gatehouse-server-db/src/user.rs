// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! User repository.
//!
//! Records are created from identity-provider webhooks and move from
//! `pending` to `approved` under admin review. Rejection deletes the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_server_auth::{AccountStatus, User, UserId};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::{conflict_on_unique, DbError};

const USER_COLUMNS: &str =
	"id, external_id, email, username, public_key, status, created_at, updated_at";

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(
		&self,
		external_id: &str,
		email: &str,
		username: &str,
	) -> Result<User, DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError>;
	async fn list_pending_users(&self) -> Result<Vec<User>, DbError>;
	async fn approve_user(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn delete_user(&self, id: &UserId) -> Result<bool, DbError>;
	async fn delete_user_by_external_id(&self, external_id: &str) -> Result<bool, DbError>;
	async fn update_identity(
		&self,
		external_id: &str,
		email: &str,
		username: &str,
	) -> Result<Option<User>, DbError>;
	async fn set_public_key(&self, id: &UserId, public_key: &str)
		-> Result<Option<User>, DbError>;
	async fn health_check(&self) -> Result<(), DbError>;
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(
		&self,
		external_id: &str,
		email: &str,
		username: &str,
	) -> Result<User, DbError> {
		self.create_user(external_id, email, username).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_external_id(external_id).await
	}

	async fn list_pending_users(&self) -> Result<Vec<User>, DbError> {
		self.list_pending_users().await
	}

	async fn approve_user(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.approve_user(id).await
	}

	async fn delete_user(&self, id: &UserId) -> Result<bool, DbError> {
		self.delete_user(id).await
	}

	async fn delete_user_by_external_id(&self, external_id: &str) -> Result<bool, DbError> {
		self.delete_user_by_external_id(external_id).await
	}

	async fn update_identity(
		&self,
		external_id: &str,
		email: &str,
		username: &str,
	) -> Result<Option<User>, DbError> {
		self.update_identity(external_id, email, username).await
	}

	async fn set_public_key(
		&self,
		id: &UserId,
		public_key: &str,
	) -> Result<Option<User>, DbError> {
		self.set_public_key(id, public_key).await
	}

	async fn health_check(&self) -> Result<(), DbError> {
		self.health_check().await
	}
}

#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new `pending` user.
	///
	/// # Errors
	/// `DbError::Conflict` if the external id or username is taken.
	#[tracing::instrument(skip(self, email, username))]
	pub async fn create_user(
		&self,
		external_id: &str,
		email: &str,
		username: &str,
	) -> Result<User, DbError> {
		let now = Utc::now();
		let user = User {
			id: UserId::generate(),
			external_id: external_id.to_string(),
			email: email.to_string(),
			username: username.to_string(),
			public_key: None,
			status: AccountStatus::Pending,
			created_at: now,
			updated_at: now,
		};

		sqlx::query(
			r#"
			INSERT INTO users (id, external_id, email, username, public_key, status, created_at, updated_at)
			VALUES (?, ?, ?, ?, NULL, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.external_id)
		.bind(&user.email)
		.bind(&user.username)
		.bind(user.status.as_str())
		.bind(now.to_rfc3339())
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| conflict_on_unique(e, "user"))?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(user)
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(parse_user_row).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE external_id = ?"
		))
		.bind(external_id)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_user_row).transpose()
	}

	/// Pending users, oldest registration first.
	#[tracing::instrument(skip(self))]
	pub async fn list_pending_users(&self) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE status = 'pending' ORDER BY created_at ASC, id ASC"
		))
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_user_row).collect()
	}

	/// Mark a user approved. Approving an approved user changes nothing.
	///
	/// # Returns
	/// `None` if no user has this id.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn approve_user(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.transition(id, AccountStatus::Approved).await
	}

	/// Move a user to `next` if the account lifecycle allows it.
	///
	/// # Errors
	/// `DbError::Conflict` for a move the lifecycle forbids, such as approved
	/// back to pending.
	async fn transition(&self, id: &UserId, next: AccountStatus) -> Result<Option<User>, DbError> {
		let Some(current) = self.get_user_by_id(id).await? else {
			return Ok(None);
		};

		if !current.status.can_transition_to(next) {
			return Err(DbError::Conflict(format!(
				"cannot move user from {} to {next}",
				current.status
			)));
		}
		if current.status == next {
			return Ok(Some(current));
		}

		// Guarded on the old status so a concurrent change is not overwritten.
		let result = sqlx::query(
			r#"
			UPDATE users SET status = ?, updated_at = ?
			WHERE id = ? AND status = ?
			"#,
		)
		.bind(next.as_str())
		.bind(Utc::now().to_rfc3339())
		.bind(id.to_string())
		.bind(current.status.as_str())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() > 0 {
			tracing::debug!(user_id = %id, from = %current.status, to = %next, "user status changed");
		}

		self.get_user_by_id(id).await
	}

	/// # Returns
	/// `true` if a row was deleted.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn delete_user(&self, id: &UserId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self))]
	pub async fn delete_user_by_external_id(&self, external_id: &str) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM users WHERE external_id = ?")
			.bind(external_id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Refresh email and username from the identity provider. Status is kept.
	#[tracing::instrument(skip(self, email, username))]
	pub async fn update_identity(
		&self,
		external_id: &str,
		email: &str,
		username: &str,
	) -> Result<Option<User>, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE users SET email = ?, username = ?, updated_at = ?
			WHERE external_id = ?
			"#,
		)
		.bind(email)
		.bind(username)
		.bind(Utc::now().to_rfc3339())
		.bind(external_id)
		.execute(&self.pool)
		.await
		.map_err(|e| conflict_on_unique(e, "username"))?;

		if result.rows_affected() == 0 {
			return Ok(None);
		}
		self.get_user_by_external_id(external_id).await
	}

	#[tracing::instrument(skip(self, public_key), fields(user_id = %id))]
	pub async fn set_public_key(
		&self,
		id: &UserId,
		public_key: &str,
	) -> Result<Option<User>, DbError> {
		let result = sqlx::query("UPDATE users SET public_key = ?, updated_at = ? WHERE id = ?")
			.bind(public_key)
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Ok(None);
		}
		self.get_user_by_id(id).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn health_check(&self) -> Result<(), DbError> {
		sqlx::query("SELECT 1").execute(&self.pool).await?;
		Ok(())
	}
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

fn parse_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id_str: String = row.get("id");
	let status_str: String = row.get("status");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	let id = Uuid::parse_str(&id_str)
		.map_err(|e| DbError::Internal(format!("Invalid user id UUID: {e}")))?;
	let status = status_str
		.parse::<AccountStatus>()
		.map_err(|e| DbError::Internal(e.to_string()))?;

	Ok(User {
		id: UserId::new(id),
		external_id: row.get("external_id"),
		email: row.get("email"),
		username: row.get("username"),
		public_key: row.get("public_key"),
		status,
		created_at: parse_timestamp(&created_at_str, "created_at")?,
		updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
	})
}
