// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Settings are read from the environment (and an optional `.env` file) once
//! at startup and are immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_ENV` | Deployment environment name | `development` |
//! | `ENTRA_INSTANCE` | Identity provider base URL | `https://login.microsoftonline.com` |
//! | `AZURE_TENANT_ID` | Entra tenant (directory) id | Required |
//! | `AZURE_CLIENT_ID` | API application (client) id | Required |
//! | `API_AUDIENCE` | Expected `aud` claim | `api://{AZURE_CLIENT_ID}` |
//! | `ADMIN_GROUP_ID` | Group object id granting admin routes | Required |
//! | `ENTRA_ISSUER` | Trusted `iss` claim | Unset (presence only) |
//! | `REQUIRED_SCOPES` | Space-separated scopes every token must carry | `access_as_user` |
//! | `ORIGIN` | CORS allowed origin | Unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWKS_TIMEOUT_SECS` | Timeout for discovery and key-set requests (> 0) | `10` |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance for `exp`, `nbf` and `iat` | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::keys::DEFAULT_FETCH_TIMEOUT;
use crate::auth::scopes::DEFAULT_SCOPE;
use crate::auth::verifier::DEFAULT_LEEWAY;

pub const APP_ENV_ENV: &str = "APP_ENV";
pub const ENTRA_INSTANCE_ENV: &str = "ENTRA_INSTANCE";
pub const TENANT_ID_ENV: &str = "AZURE_TENANT_ID";
pub const CLIENT_ID_ENV: &str = "AZURE_CLIENT_ID";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const ADMIN_GROUP_ID_ENV: &str = "ADMIN_GROUP_ID";
pub const ENTRA_ISSUER_ENV: &str = "ENTRA_ISSUER";
pub const REQUIRED_SCOPES_ENV: &str = "REQUIRED_SCOPES";
pub const ORIGIN_ENV: &str = "ORIGIN";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWKS_TIMEOUT_ENV: &str = "JWKS_TIMEOUT_SECS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Public Entra ID cloud.
pub const DEFAULT_ENTRA_INSTANCE: &str = "https://login.microsoftonline.com";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_env: String,
    pub entra_instance: Url,
    pub tenant_id: String,
    pub client_id: String,
    pub api_audience: String,
    pub admin_group_id: String,
    pub issuer: Option<String>,
    pub required_scopes: Vec<String>,
    pub origin: Option<String>,
    pub addr: SocketAddr,
    pub jwks_timeout: Duration,
    /// Seconds of clock skew tolerated on time-based claims
    pub jwt_leeway: u64,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let entra_instance = Url::parse(
            &get(ENTRA_INSTANCE_ENV).unwrap_or_else(|| DEFAULT_ENTRA_INSTANCE.to_string()),
        )
        .map_err(|_| ConfigError::Invalid(ENTRA_INSTANCE_ENV))?;

        let tenant_id = required(TENANT_ID_ENV)?;
        let client_id = required(CLIENT_ID_ENV)?;
        let admin_group_id = required(ADMIN_GROUP_ID_ENV)?;
        let api_audience = get(API_AUDIENCE_ENV).unwrap_or_else(|| format!("api://{client_id}"));

        let required_scopes = get(REQUIRED_SCOPES_ENV)
            .map(|scopes| scopes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| vec![DEFAULT_SCOPE.to_string()]);

        let host: IpAddr = get(HOST_ENV)
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid(HOST_ENV))?;
        let port: u16 = match get(PORT_ENV) {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid(PORT_ENV))?,
            None => 8080,
        };

        let jwks_timeout = match get(JWKS_TIMEOUT_ENV) {
            Some(secs) => match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid(JWKS_TIMEOUT_ENV)),
            },
            None => DEFAULT_FETCH_TIMEOUT,
        };

        let jwt_leeway = match get(JWT_LEEWAY_ENV) {
            Some(secs) => secs.parse().map_err(|_| ConfigError::Invalid(JWT_LEEWAY_ENV))?,
            None => DEFAULT_LEEWAY,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(_) => return Err(ConfigError::Invalid(LOG_FORMAT_ENV)),
        };

        Ok(Self {
            app_env: get(APP_ENV_ENV).unwrap_or_else(|| "development".to_string()),
            entra_instance,
            tenant_id,
            client_id,
            api_audience,
            admin_group_id,
            issuer: get(ENTRA_ISSUER_ENV),
            required_scopes,
            origin: get(ORIGIN_ENV),
            addr: SocketAddr::new(host, port),
            jwks_timeout,
            jwt_leeway,
            log_format,
        })
    }
}
