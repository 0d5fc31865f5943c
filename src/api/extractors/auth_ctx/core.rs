use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::AuthError;

use super::AuthCtx;

/// Verified caller for handlers behind the access middleware.
///
/// A request without an `AuthCtx` never went through the gate; it is answered
/// like a request without a bearer token.
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S: Send + Sync> FromRequestParts<S> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::Auth(AuthError::MissingBearerToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::routing::get;
    use tower::ServiceExt;

    async fn subject(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        ctx.token.subject().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn ungated_route_is_unauthorized() {
        let app = Router::new().route("/", get(subject));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
