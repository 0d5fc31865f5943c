/*
 * Responsibility
 * - GET /token: show how the presented token was decoded and which authorities it grants
 */
use axum::Json;

use crate::api::dto::token::TokenResponse;
use crate::api::extractors::AuthCtxExtractor;

pub async fn token(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<TokenResponse> {
    Json(TokenResponse::from(ctx))
}
