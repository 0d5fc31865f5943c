/*
 * Responsibility
 * - URL structure of the API (routes)
 * - Authorization table for those routes (route_policy); both live here so they change together
 */
pub mod dto;
pub mod extractors;
pub mod handlers;

use axum::{Router, routing::get};

use crate::services::auth::policy::{PolicyError, Requirement, RoutePolicy};
use crate::state::AppState;

use handlers::{
    demo::{admin, read, user, write},
    not_found,
    token::token,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/token", get(token))
        .route("/read", get(read))
        .route("/write", get(write))
        .route("/user", get(user))
        .route("/admin", get(admin))
        .fallback(not_found)
}

/// First match wins; anything unlisted (including `/token`) needs an authenticated token.
pub fn route_policy() -> Result<RoutePolicy, PolicyError> {
    RoutePolicy::builder()
        .route("/read/**", Requirement::has_authority("SCOPE_read"))
        .route("/write/**", Requirement::has_authority("SCOPE_write"))
        .route("/user/**", Requirement::has_any_role(["user", "admin"]))
        .route("/admin/**", Requirement::has_role("admin"))
        .route("/token", Requirement::Authenticated)
        .build()
}
