// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Validates Microsoft Entra ID access tokens for this API.
//!
//! ## Auth Flow
//!
//! 1. The SPA signs the user in with Entra ID and requests an access token
//!    for `api://{client_id}/access_as_user`
//! 2. The SPA sends `Authorization: Bearer <access token>`
//! 3. This server:
//!    - Checks the `scp` claim for the required scopes (unverified, no I/O)
//!    - Looks up the signing key by `kid`, fetching the tenant's key set on a miss
//!    - Verifies the RS256 signature and `aud`, `exp`, `iss`, `iat`, `nbf`, `sub`
//!    - Maps the claims to a [`User`] (`oid`, name, groups, ...)
//! 4. Admin routes additionally require the configured admin group
//!
//! ## Errors
//!
//! Every validation failure is a `401` with a distinct `detail`; missing
//! admin group membership is a `403`.

pub mod authorizer;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod keys;
pub mod scopes;
pub mod user;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use authorizer::EntraAuthorizer;
pub use claims::VerifiedClaims;
pub use error::AuthError;
pub use extractor::{bearer_token, AdminOnly, Auth};
pub use gate::{require_admin, require_authenticated};
pub use keys::{KeyResolver, SigningKeyCache};
pub use scopes::{check_scopes, DEFAULT_SCOPE};
pub use user::User;
pub use verifier::TokenVerifier;
