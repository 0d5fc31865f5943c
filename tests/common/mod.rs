#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use jwt_resource_server::app::{build_router, build_state};
use jwt_resource_server::config::{AppEnv, Config};
pub use jwt_resource_server::test_support::*;
use serde_json::Value;
use tower::ServiceExt;

pub fn config(public_key_pem: &str) -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        app_env: AppEnv::Development,
        auth_issuer: ISSUER.to_string(),
        auth_audience: AUDIENCE.to_string(),
        access_token_leeway_seconds: 0,
        access_jwt_public_key_pem: public_key_pem.to_string(),
        authorities_claim_name: None,
        authority_prefix: "SCOPE_".to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

/// Config for the `roles` profile: `authorities` claim, `ROLE_` prefix.
pub fn roles_config(public_key_pem: &str) -> Config {
    Config {
        authorities_claim_name: Some("authorities".to_string()),
        authority_prefix: "ROLE_".to_string(),
        ..config(public_key_pem)
    }
}

pub fn app(config: &Config) -> Router {
    let state = build_state(config).expect("build state");
    build_router(state, config.request_timeout)
}

pub async fn get(app: Router, path: &str, token: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
