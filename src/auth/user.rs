// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated user representation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::claims::VerifiedClaims;
use super::error::AuthError;

/// Authenticated user extracted from a verified Entra access token.
///
/// Built fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Entra object id (`oid`), or the subject (`sub`) when the token has no `oid`
    pub id: String,

    /// Display name (`name`)
    pub name: String,

    /// Given name (`given_name`, falling back to `preferred_username`)
    pub given_name: String,

    /// Email address (`email`)
    pub email: String,

    /// Issuing tenant (`tid`)
    pub tenant_id: String,

    /// Group object ids (`groups`)
    pub groups: Vec<String>,

    /// Caller IP address as seen by Entra (`ipaddr`)
    pub ipaddr: String,
}

impl User {
    /// Create from verified claims.
    pub fn from_claims(claims: &VerifiedClaims) -> Result<Self, AuthError> {
        let id = claims
            .get_str("oid")
            .or_else(|| claims.subject())
            .ok_or_else(|| {
                tracing::debug!("Verified claims carry neither oid nor sub");
                AuthError::MissingSubject
            })?;

        let text = |name: &str| claims.get_str(name).unwrap_or_default().to_string();

        let given_name = claims
            .get_str("given_name")
            .or_else(|| claims.get_str("preferred_username"))
            .unwrap_or_default()
            .to_string();

        // Non-string entries are dropped rather than failing the request.
        let groups = match claims.get("groups") {
            Some(Value::Array(groups)) => groups
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            id: id.to_string(),
            name: text("name"),
            given_name,
            email: text("email"),
            tenant_id: text("tid"),
            groups,
            ipaddr: text("ipaddr"),
        })
    }

    /// Check if the user belongs to `group_id`.
    pub fn is_member_of(&self, group_id: &str) -> bool {
        self.groups.iter().any(|g| g == group_id)
    }
}
