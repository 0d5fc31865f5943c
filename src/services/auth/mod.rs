//! Bearer-token authentication and authorization.
//!
//! Request flow: raw token → [`parser`] → [`validator`] → [`authority`] →
//! [`policy`] → handler.

pub mod access_jwt;
pub mod authority;
pub mod error;
pub mod factory;
pub mod key;
pub mod parser;
pub mod policy;
pub mod token;
pub mod validator;

pub use access_jwt::{AuthService, Authentication};
pub use error::AuthError;
pub use factory::build_auth_service;
pub use policy::{Requirement, RoutePolicy};
