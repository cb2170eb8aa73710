// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod admin;
pub mod common;
pub mod users;
pub mod webhooks;

pub use admin::ApproveUserResponse;
pub use common::MessageResponse;
pub use users::{MeResponse, UpdatePublicKeyRequest, UserResponse, MAX_PUBLIC_KEY_BYTES};
pub use webhooks::{DeletedObjectData, EmailAddress, IdentityEvent, IdentityEventType, IdentityUserData};
