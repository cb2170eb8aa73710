// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for Gatehouse.

pub mod error;
pub mod pool;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{DbError, Result};
pub use pool::create_pool;
pub use user::{UserRepository, UserStore};
