// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization checks on top of an authenticated [`User`].
//!
//! - `require_authenticated` - any user produced by the authorizer
//! - `require_admin` - member of the configured admin group

use super::error::AuthError;
use super::user::User;

/// Any successfully authenticated user passes.
pub fn require_authenticated(user: User) -> User {
    user
}

/// The user must be a member of `admin_group_id`.
pub fn require_admin(user: User, admin_group_id: &str) -> Result<User, AuthError> {
    if user.is_member_of(admin_group_id) {
        Ok(user)
    } else {
        tracing::debug!(user_id = %user.id, "User is not in the admin group");
        Err(AuthError::ForbiddenAccess)
    }
}
