//! Factory: build `AuthService` from application `Config`.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::services::auth::AuthService;
use crate::services::auth::authority::AuthoritiesConverter;
use crate::services::auth::key::VerificationKey;
use crate::services::auth::validator::TokenValidator;

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>> {
    let key = VerificationKey::from_pem(&config.access_jwt_public_key_pem)
        .context("loading access token verification key")?;
    tracing::info!(family = ?key.family(), "loaded access token verification key");

    let validator = TokenValidator::with_defaults(
        key,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )
    .context("building token validator")?;

    let converter = AuthoritiesConverter::new(
        config.authorities_claim_name.clone(),
        config.authority_prefix.clone(),
    );

    Ok(Arc::new(AuthService::new(validator, converter)))
}
