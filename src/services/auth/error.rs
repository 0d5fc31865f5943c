//! Errors surfaced by bearer-token parsing, validation and authorization.
//!
//! Messages are safe to return to clients: they never contain signature bytes,
//! key material or the raw token.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or malformed bearer token")]
    MissingBearerToken,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid signature")]
    SignatureInvalid,

    #[error("token expired: {0}")]
    TokenExpired(String),

    #[error("token not yet valid: {0}")]
    TokenNotYetValid(String),

    #[error("unknown issuer")]
    UnknownIssuer,

    #[error("audience mismatch")]
    AudienceMismatch,

    #[error("claim '{claim}' rejected")]
    ClaimRejected { claim: String },

    #[error("insufficient authority: requires {0}")]
    InsufficientAuthority(String),
}

impl AuthError {
    /// Stable machine-readable code, used in JSON error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingBearerToken => "MISSING_BEARER_TOKEN",
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::UnsupportedAlgorithm(_) => "UNSUPPORTED_ALGORITHM",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::TokenExpired(_) => "TOKEN_EXPIRED",
            Self::TokenNotYetValid(_) => "TOKEN_NOT_YET_VALID",
            Self::UnknownIssuer => "UNKNOWN_ISSUER",
            Self::AudienceMismatch => "AUDIENCE_MISMATCH",
            Self::ClaimRejected { .. } => "CLAIM_REJECTED",
            Self::InsufficientAuthority(_) => "INSUFFICIENT_AUTHORITY",
        }
    }

    /// `true` for authorization failures (403); everything else is an authentication failure (401).
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::InsufficientAuthority(_))
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedToken(detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_insufficient_authority_is_forbidden() {
        assert!(AuthError::InsufficientAuthority("SCOPE_write".into()).is_forbidden());
        assert!(!AuthError::SignatureInvalid.is_forbidden());
        assert!(!AuthError::TokenExpired("exp".into()).is_forbidden());
        assert!(!AuthError::MissingBearerToken.is_forbidden());
    }

    #[test]
    fn display_does_not_echo_signature() {
        let msg = AuthError::SignatureInvalid.to_string();
        assert_eq!(msg, "invalid signature");
    }
}
