//! Bearer-token (JWT) resource server: every route requires a verified access token,
//! and a per-path policy decides which scopes or roles may reach it.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;
