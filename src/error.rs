/*
 * Responsibility
 * - App-wide AppError
 * - IntoResponse (HTTP status / JSON error body / WWW-Authenticate)
 * - Authentication failures → 401, authorization failures → 403
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::error::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("not found")]
    NotFound,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(e) if e.is_forbidden() => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Auth(e) => e.code(),
            AppError::NotFound => "NOT_FOUND",
            AppError::Internal => "INTERNAL_SERVER_ERROR",
        }
    }

    /// RFC 6750 challenge for auth failures.
    fn challenge(&self) -> Option<HeaderValue> {
        let AppError::Auth(err) = self else {
            return None;
        };

        let bare = HeaderValue::from_static("Bearer");
        let error_code = match err {
            AuthError::MissingBearerToken => return Some(bare),
            e if e.is_forbidden() => "insufficient_scope",
            _ => "invalid_token",
        };

        // Quotes would break the quoted-string; header parsing rejects control characters.
        let description = err.to_string().replace(['"', '\\'], "'");
        let value = format!(r#"Bearer error="{error_code}", error_description="{description}""#);

        Some(HeaderValue::from_str(&value).unwrap_or(bare))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let challenge = self.challenge();

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge_of(err: AuthError) -> String {
        let response = AppError::from(err).into_response();
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn maps_auth_errors_to_401_and_403() {
        assert_eq!(
            AppError::from(AuthError::SignatureInvalid).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::MalformedToken("x".into()))
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::InsufficientAuthority("hasRole('admin')".into()))
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn challenges_follow_bearer_scheme() {
        assert_eq!(challenge_of(AuthError::MissingBearerToken), "Bearer");
        assert_eq!(
            challenge_of(AuthError::UnknownIssuer),
            r#"Bearer error="invalid_token", error_description="unknown issuer""#
        );
        assert!(
            challenge_of(AuthError::InsufficientAuthority("hasAuthority('SCOPE_write')".into()))
                .starts_with(r#"Bearer error="insufficient_scope""#)
        );
    }

    #[test]
    fn hostile_header_text_falls_back_to_bare_challenge() {
        let err = AuthError::UnsupportedAlgorithm("RS256\r\nX-Injected: 1".into());
        assert_eq!(challenge_of(err), "Bearer");
    }

    #[test]
    fn not_found_has_no_challenge() {
        let response = AppError::NotFound.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
