//! Per-route authorization.
//!
//! A [`RoutePolicy`] is an ordered list of `(pattern, requirement)` rules. The first
//! rule whose pattern matches the request path decides; when none matches, any
//! authenticated request is allowed.
//!
//! Role requirements look for `<role_prefix><role>` (`ROLE_admin`), so authorities
//! derived with the default `SCOPE_` prefix never satisfy a role check and vice
//! versa, unless the prefixes are configured to coincide.

use std::fmt;

use thiserror::Error;

use super::access_jwt::Authentication;
use super::authority::{Authorities, ROLE_PREFIX};
use super::error::AuthError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("invalid path pattern '{0}': must start with '/'")]
    NotAbsolute(String),
    #[error("invalid path pattern '{0}': '**' is only allowed as the last segment")]
    InnerDoubleWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    // `*`: exactly one segment
    Any,
}

/// Path pattern: literal segments, `*` for one segment, optional trailing `/**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    any_suffix: bool,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PolicyError> {
        if !pattern.starts_with('/') {
            return Err(PolicyError::NotAbsolute(pattern.to_string()));
        }

        let mut parts: Vec<&str> = split_path(pattern).collect();
        let any_suffix = parts.last() == Some(&"**");
        if any_suffix {
            parts.pop();
        }
        if parts.contains(&"**") {
            return Err(PolicyError::InnerDoubleWildcard(pattern.to_string()));
        }

        let segments = parts
            .into_iter()
            .map(|p| match p {
                "*" => Segment::Any,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            any_suffix,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();

        let length_ok = if self.any_suffix {
            path.len() >= self.segments.len()
        } else {
            path.len() == self.segments.len()
        };

        length_ok
            && self.segments.iter().zip(&path).all(|(seg, part)| match seg {
                Segment::Any => true,
                Segment::Literal(lit) => lit == part,
            })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// What a matched route demands of the caller's authorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    HasAuthority(String),
    HasAnyAuthority(Vec<String>),
    HasRole(String),
    HasAnyRole(Vec<String>),
}

impl Requirement {
    pub fn has_authority(authority: impl Into<String>) -> Self {
        Self::HasAuthority(authority.into())
    }

    pub fn has_any_authority<I, S>(authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::HasAnyAuthority(authorities.into_iter().map(Into::into).collect())
    }

    pub fn has_role(role: impl Into<String>) -> Self {
        Self::HasRole(role.into())
    }

    pub fn has_any_role<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::HasAnyRole(roles.into_iter().map(Into::into).collect())
    }

    fn is_satisfied(&self, authorities: &Authorities, role_prefix: &str) -> bool {
        let has_role = |role: &String| authorities.contains(&format!("{role_prefix}{role}"));

        match self {
            Self::Authenticated => true,
            Self::HasAuthority(a) => authorities.contains(a),
            Self::HasAnyAuthority(list) => list.iter().any(|a| authorities.contains(a)),
            Self::HasRole(role) => has_role(role),
            Self::HasAnyRole(roles) => roles.iter().any(has_role),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted = |items: &[String]| {
            items
                .iter()
                .map(|i| format!("'{i}'"))
                .collect::<Vec<_>>()
                .join(",")
        };
        match self {
            Self::Authenticated => write!(f, "authenticated"),
            Self::HasAuthority(a) => write!(f, "hasAuthority('{a}')"),
            Self::HasAnyAuthority(list) => write!(f, "hasAnyAuthority({})", quoted(list)),
            Self::HasRole(role) => write!(f, "hasRole('{role}')"),
            Self::HasAnyRole(roles) => write!(f, "hasAnyRole({})", quoted(roles)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pattern: PathPattern,
    requirement: Requirement,
}

#[derive(Debug, Default)]
pub struct RoutePolicyBuilder {
    rules: Vec<(String, Requirement)>,
    role_prefix: Option<String>,
}

impl RoutePolicyBuilder {
    pub fn route(mut self, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push((pattern.to_string(), requirement));
        self
    }

    /// Prefix role requirements are checked under (default `ROLE_`).
    pub fn role_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.role_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<RoutePolicy, PolicyError> {
        let rules = self
            .rules
            .into_iter()
            .map(|(pattern, requirement)| {
                Ok(RouteRule {
                    pattern: PathPattern::parse(&pattern)?,
                    requirement,
                })
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;

        Ok(RoutePolicy {
            rules,
            role_prefix: self.role_prefix.unwrap_or_else(|| ROLE_PREFIX.to_string()),
        })
    }
}

static AUTHENTICATED: Requirement = Requirement::Authenticated;

/// Immutable after startup.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
    role_prefix: String,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    /// First matching rule's requirement, or [`Requirement::Authenticated`].
    pub fn requirement_for(&self, path: &str) -> &Requirement {
        self.matching_rule(path)
            .map(|rule| &rule.requirement)
            .unwrap_or(&AUTHENTICATED)
    }

    /// ALLOW → `Ok(())`; DENY → [`AuthError::InsufficientAuthority`].
    pub fn authorize(&self, path: &str, authentication: &Authentication) -> Result<(), AuthError> {
        let rule = self.matching_rule(path);
        let requirement = rule.map_or(&AUTHENTICATED, |r| &r.requirement);

        tracing::debug!(
            path,
            pattern = rule.map(|r| r.pattern.as_str()),
            requirement = %requirement,
            "route policy matched"
        );

        if requirement.is_satisfied(authentication.authorities(), &self.role_prefix) {
            Ok(())
        } else {
            Err(AuthError::InsufficientAuthority(requirement.to_string()))
        }
    }

    fn matching_rule(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.pattern.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::token::{Claims, JoseHeader, VerifiedToken};
    use serde_json::Map;

    fn policy() -> RoutePolicy {
        RoutePolicy::builder()
            .route("/read/**", Requirement::has_authority("SCOPE_read"))
            .route("/write/**", Requirement::has_authority("SCOPE_write"))
            .route("/user/**", Requirement::has_any_role(["user", "admin"]))
            .route("/admin/**", Requirement::has_role("admin"))
            .build()
            .unwrap()
    }

    fn authenticated(authorities: &[&str]) -> Authentication {
        let header = JoseHeader {
            alg: "EdDSA".into(),
            kid: None,
            typ: None,
            extra: Map::new(),
        };
        Authentication::new(
            VerifiedToken::new(header, Claims::default()),
            authorities.iter().copied().collect(),
        )
    }

    #[test]
    fn trailing_double_wildcard_matches_prefix_and_subpaths() {
        let p = PathPattern::parse("/read/**").unwrap();
        assert!(p.matches("/read"));
        assert!(p.matches("/read/"));
        assert!(p.matches("/read/a/b"));
        assert!(!p.matches("/reader"));
        assert!(!p.matches("/"));
    }

    #[test]
    fn exact_and_single_segment_patterns() {
        let exact = PathPattern::parse("/token").unwrap();
        assert!(exact.matches("/token"));
        assert!(exact.matches("/token/"));
        assert!(!exact.matches("/token/x"));

        let star = PathPattern::parse("/items/*/edit").unwrap();
        assert!(star.matches("/items/42/edit"));
        assert!(!star.matches("/items/edit"));

        assert!(PathPattern::parse("/**").unwrap().matches("/anything/at/all"));
    }

    #[test]
    fn rejects_invalid_patterns() {
        assert_eq!(
            PathPattern::parse("read/**"),
            Err(PolicyError::NotAbsolute("read/**".into()))
        );
        assert_eq!(
            PathPattern::parse("/a/**/b"),
            Err(PolicyError::InnerDoubleWildcard("/a/**/b".into()))
        );
    }

    #[test]
    fn read_scope_allows_read_but_not_write() {
        let auth = authenticated(&["SCOPE_read"]);
        assert_eq!(policy().authorize("/read", &auth), Ok(()));
        assert_eq!(
            policy().authorize("/write", &auth),
            Err(AuthError::InsufficientAuthority(
                "hasAuthority('SCOPE_write')".into()
            ))
        );
    }

    #[test]
    fn any_authority_accepts_one_of_the_listed() {
        let policy = RoutePolicy::builder()
            .route(
                "/reports/**",
                Requirement::has_any_authority(["SCOPE_read", "SCOPE_audit"]),
            )
            .build()
            .unwrap();

        assert!(policy.authorize("/reports/q3", &authenticated(&["SCOPE_audit"])).is_ok());
        assert!(policy.authorize("/reports", &authenticated(&["SCOPE_read"])).is_ok());
        assert_eq!(
            policy.authorize("/reports", &authenticated(&["SCOPE_write", "ROLE_read"])),
            Err(AuthError::InsufficientAuthority(
                "hasAnyAuthority('SCOPE_read','SCOPE_audit')".into()
            ))
        );
    }

    #[test]
    fn admin_role_reaches_user_but_user_role_not_admin() {
        let admin = authenticated(&["ROLE_admin"]);
        let user = authenticated(&["ROLE_user"]);

        assert!(policy().authorize("/user", &admin).is_ok());
        assert!(policy().authorize("/admin", &admin).is_ok());
        assert!(policy().authorize("/user", &user).is_ok());
        assert!(policy().authorize("/admin", &user).is_err());
    }

    #[test]
    fn scope_and_role_namespaces_stay_apart() {
        // A scope named "admin" is SCOPE_admin, not ROLE_admin.
        let scoped = authenticated(&["SCOPE_admin", "SCOPE_user"]);
        assert!(policy().authorize("/admin", &scoped).is_err());
        assert!(policy().authorize("/user", &scoped).is_err());

        // A role named "read" does not grant SCOPE_read.
        let role = authenticated(&["ROLE_read"]);
        assert!(policy().authorize("/read", &role).is_err());
    }

    #[test]
    fn namespaces_can_be_unified_explicitly() {
        let shared = RoutePolicy::builder()
            .route("/admin/**", Requirement::has_role("admin"))
            .role_prefix("SCOPE_")
            .build()
            .unwrap();
        assert!(shared
            .authorize("/admin", &authenticated(&["SCOPE_admin"]))
            .is_ok());
    }

    #[test]
    fn first_match_wins() {
        let policy = RoutePolicy::builder()
            .route("/docs/public/**", Requirement::Authenticated)
            .route("/docs/**", Requirement::has_authority("SCOPE_docs"))
            .build()
            .unwrap();
        let nobody = authenticated(&[]);

        assert!(policy.authorize("/docs/public/intro", &nobody).is_ok());
        assert!(policy.authorize("/docs/private", &nobody).is_err());
    }

    #[test]
    fn unmatched_paths_only_require_authentication() {
        let nobody = authenticated(&[]);
        assert_eq!(policy().requirement_for("/token"), &Requirement::Authenticated);
        assert!(policy().authorize("/token", &nobody).is_ok());
        assert!(policy().authorize("/somewhere/else", &nobody).is_ok());
    }

    #[test]
    fn requirement_renders_like_an_expression() {
        assert_eq!(
            Requirement::has_any_role(["user", "admin"]).to_string(),
            "hasAnyRole('user','admin')"
        );
        assert_eq!(Requirement::has_role("admin").to_string(), "hasRole('admin')");
    }
}
