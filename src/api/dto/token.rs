use serde::Serialize;

use crate::api::extractors::AuthCtx;
use crate::services::auth::authority::Authorities;
use crate::services::auth::token::VerifiedToken;

/// `{"token": {"header": {...}, "claims": {...}}, "authorities": [...]}`
///
/// The signature is not part of `VerifiedToken`, so it cannot leak here.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: VerifiedToken,
    pub authorities: Authorities,
}

impl From<AuthCtx> for TokenResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            token: ctx.token,
            authorities: ctx.authorities,
        }
    }
}
