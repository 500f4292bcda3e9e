// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Entra API Auth - bearer-token validation for Microsoft Entra ID
//!
//! Protects an HTTP API with access tokens issued to a single-page
//! application by Microsoft Entra ID (Azure AD).
//!
//! ## Modules
//!
//! - `api` - HTTP routes (Axum), CORS and OpenAPI docs
//! - `auth` - Signing-key cache, token verification, user mapping, admin gate
//! - `config` - Environment-driven settings
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod state;
