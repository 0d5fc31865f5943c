/*
 * Responsibility
 * - The authenticated context handlers see
 * - The middleware verifies and authorizes, stores this in request extensions, and handlers
 *   receive only this type (no ambient security context)
 */

use crate::services::auth::Authentication;
use crate::services::auth::authority::Authorities;
use crate::services::auth::token::VerifiedToken;

/// Context attached to an authenticated, authorized request.
///
/// - `token`: header + claims of the verified token (no signature)
/// - `authorities`: derived once from the configured authority claim
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub token: VerifiedToken,
    pub authorities: Authorities,
}

impl From<Authentication> for AuthCtx {
    fn from(authentication: Authentication) -> Self {
        let (token, authorities) = authentication.into_parts();
        Self { token, authorities }
    }
}
