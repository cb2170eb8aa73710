// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Database setup: pool creation and embedded migrations.

use sqlx::sqlite::SqlitePool;

use crate::error::ServerError;

pub use gatehouse_server_db::{create_pool, DbError, UserRepository, UserStore};

/// Apply the embedded schema. Safe to run on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), ServerError> {
	let m1 = include_str!("../migrations/001_create_users.sql");
	for stmt in m1.split(';').filter(|s| !s.trim().is_empty()) {
		if let Err(e) = sqlx::query(stmt).execute(pool).await {
			if !e.to_string().contains("already exists") {
				return Err(e.into());
			}
		}
	}

	tracing::debug!("database migrations applied");
	Ok(())
}
