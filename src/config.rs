/*
 * Responsibility
 * - Load settings from the environment (listen address, verification key, issuer/audience,
 *   authority mapping, request timeout)
 * - Validate them up front (startup fails on missing/invalid values)
 */
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::services::auth::authority::{DEFAULT_AUTHORITY_PREFIX, ROLE_PREFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Unreadable { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Unreadable { key, reason } => {
                write!(f, "unreadable configuration: {}: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_leeway_seconds: u64,
    pub access_jwt_public_key_pem: String,

    /// `None` → `scope`, then `scp`.
    pub authorities_claim_name: Option<String>,
    pub authority_prefix: String,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let auth_issuer = var("AUTH_ISSUER").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;
        let auth_audience = var("AUTH_AUDIENCE").ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let access_token_leeway_seconds = match var("ACCESS_TOKEN_LEEWAY_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let access_jwt_public_key_pem = match var("ACCESS_JWT_PUBLIC_KEY_PEM") {
            Some(pem) => pem.replace("\\n", "\n"),
            None => {
                let path = var("ACCESS_JWT_PUBLIC_KEY_PATH")
                    .ok_or(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"))?;
                std::fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
                    key: "ACCESS_JWT_PUBLIC_KEY_PATH",
                    reason: e.to_string(),
                })?
            }
        };

        // The `roles` profile reads `authorities` with a `ROLE_` prefix.
        let roles_profile = match var("AUTH_PROFILE").as_deref() {
            None => false,
            Some(p) if p.eq_ignore_ascii_case("roles") => true,
            Some(_) => return Err(ConfigError::Invalid("AUTH_PROFILE")),
        };

        let authorities_claim_name = var("AUTHORITIES_CLAIM_NAME")
            .or_else(|| roles_profile.then(|| "authorities".to_string()));

        let authority_prefix = lookup("AUTHORITY_PREFIX").unwrap_or_else(|| {
            if roles_profile {
                ROLE_PREFIX.to_string()
            } else {
                DEFAULT_AUTHORITY_PREFIX.to_string()
            }
        });

        let request_timeout = match var("REQUEST_TIMEOUT_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            None => Duration::from_secs(30),
        };

        Ok(Self {
            addr,
            app_env,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            access_jwt_public_key_pem,
            authorities_claim_name,
            authority_prefix,
            request_timeout,
        })
    }
}
