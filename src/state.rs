/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - auth: AuthService (key, validator pipeline, authority mapping)
 *   - policy: RoutePolicy (per-path authorization table)
 * - Clone is cheap (Arc inside); nothing in here is mutated after startup
 */
use std::sync::Arc;

use crate::services::auth::{AuthService, RoutePolicy};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, policy: Arc<RoutePolicy>) -> Self {
        Self { auth, policy }
    }
}
