use super::authority::{Authorities, AuthoritiesConverter};
use super::error::AuthError;
use super::parser;
use super::token::VerifiedToken;
use super::validator::TokenValidator;

/// A verified token together with the authorities derived from it.
///
/// This is what the authorization gate and handlers receive; there is no ambient
/// security context.
#[derive(Debug, Clone, PartialEq)]
pub struct Authentication {
    token: VerifiedToken,
    authorities: Authorities,
}

impl Authentication {
    pub(super) fn new(token: VerifiedToken, authorities: Authorities) -> Self {
        Self { token, authorities }
    }

    pub fn token(&self) -> &VerifiedToken {
        &self.token
    }

    pub fn authorities(&self) -> &Authorities {
        &self.authorities
    }

    pub fn into_parts(self) -> (VerifiedToken, Authorities) {
        (self.token, self.authorities)
    }
}

/// Access-token authenticator: parse → validate → derive authorities.
#[derive(Debug, Clone)]
pub struct AuthService {
    validator: TokenValidator,
    converter: AuthoritiesConverter,
}

impl AuthService {
    pub fn new(validator: TokenValidator, converter: AuthoritiesConverter) -> Self {
        Self {
            validator,
            converter,
        }
    }

    /// Entry-point for middleware.
    pub fn authenticate(&self, raw_token: &str) -> Result<Authentication, AuthError> {
        let unverified = parser::parse(raw_token)?;
        let token = self.validator.validate(&unverified)?;
        let authorities = self.converter.convert(token.claims());

        Ok(Authentication::new(token, authorities))
    }
}
