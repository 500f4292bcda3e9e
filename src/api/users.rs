// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AdminOnly, Auth, User};

/// Public view of the authenticated user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    /// Entra object id
    pub id: String,
    /// Display name
    pub name: String,
    /// Group object ids
    pub groups: Vec<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            groups: user.groups,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub message: String,
    pub user: UserSummary,
}

/// Greet any authenticated user.
#[utoipa::path(
    get,
    path = "/user",
    tag = "Users",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_user(Auth(user): Auth) -> Json<UserResponse> {
    Json(UserResponse {
        message: "You're a user.".to_string(),
        user: user.into(),
    })
}

/// Greet a member of the admin group.
#[utoipa::path(
    get,
    path = "/admin",
    tag = "Users",
    responses(
        (status = 200, description = "Authenticated admin", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - not in the admin group"),
    )
)]
pub async fn get_admin(AdminOnly(user): AdminOnly) -> Json<UserResponse> {
    Json(UserResponse {
        message: "You're an admin.".to_string(),
        user: user.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_exposes_groups_as_groups() {
        let user = User {
            id: "object-456".to_string(),
            name: "Ada".to_string(),
            given_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            tenant_id: "tenant".to_string(),
            groups: vec!["g1".to_string()],
            ipaddr: String::new(),
        };

        let body = serde_json::to_value(UserSummary::from(user)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "id": "object-456", "name": "Ada", "groups": ["g1"] })
        );
    }
}
