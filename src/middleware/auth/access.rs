//! Access token (JWT) verification + route authorization → AuthCtx in extensions.
//!
//! - `Authorization: Bearer <jwt>` is required on every route this layer wraps.
//! - Signature / exp / nbf / iat / iss / aud are checked by `AuthService`.
//! - The path is then checked against the `RoutePolicy` table.
//! - Handlers read the result through `AuthCtxExtractor`.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Apply authentication + authorization to every route (and the fallback) of `router`.
///
/// ```ignore
/// let router = api::routes();
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).inspect_err(|err| {
        tracing::warn!(code = err.code(), "missing or malformed authorization header");
    })?;

    let authentication = match state.auth.authenticate(token) {
        Ok(authentication) => authentication,
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "access token verification failed");
            return Err(err.into());
        }
    };

    let path = req.uri().path();
    if let Err(err) = state.policy.authorize(path, &authentication) {
        tracing::info!(
            path,
            sub = authentication.token().subject(),
            error = %err,
            "access denied"
        );
        return Err(err.into());
    }

    req.extensions_mut().insert(AuthCtx::from(authentication));

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <b64token>` (scheme is case-insensitive, RFC 6750 §2.1).
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingBearerToken)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MissingBearerToken)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::MissingBearerToken);
    }

    let token = token.trim();
    if !is_b64token(token) {
        return Err(AuthError::MissingBearerToken);
    }

    Ok(token)
}

fn is_b64token(token: &str) -> bool {
    let body = token.trim_end_matches('=');
    !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'+' | b'/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingBearerToken)
        );
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer ", "Bearer a b", "Bearer ===", "abc.def.ghi"] {
            assert_eq!(
                bearer_token(&headers(value)),
                Err(AuthError::MissingBearerToken),
                "{value:?}"
            );
        }
    }
}
