// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::EntraAuthorizer;
use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub authorizer: EntraAuthorizer,
    /// Group whose members may use admin routes
    pub admin_group_id: Arc<str>,
}

impl AppState {
    pub fn new(authorizer: EntraAuthorizer, admin_group_id: impl Into<Arc<str>>) -> Self {
        Self {
            authorizer,
            admin_group_id: admin_group_id.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            EntraAuthorizer::from_settings(settings)?,
            settings.admin_group_id.as_str(),
        ))
    }
}
