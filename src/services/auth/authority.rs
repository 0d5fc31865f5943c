//! Authorities derived from a verified token's claims.
//!
//! Each authority is `<prefix><value>`, e.g. `SCOPE_read` from `"scope": "read"`,
//! or `ROLE_admin` from `"authorities": ["admin"]` under the roles profile.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::token::Claims;

pub const DEFAULT_AUTHORITY_PREFIX: &str = "SCOPE_";
pub const ROLE_PREFIX: &str = "ROLE_";

/// Claims consulted, in order, when no claim name is configured.
const WELL_KNOWN_AUTHORITIES_CLAIMS: [&str; 2] = ["scope", "scp"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Authorities(BTreeSet<String>);

impl Authorities {
    pub fn contains(&self, authority: &str) -> bool {
        self.0.contains(authority)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Authorities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Maps one claim to a prefixed authority set.
#[derive(Debug, Clone)]
pub struct AuthoritiesConverter {
    claim_name: Option<String>,
    prefix: String,
}

impl Default for AuthoritiesConverter {
    fn default() -> Self {
        Self {
            claim_name: None,
            prefix: DEFAULT_AUTHORITY_PREFIX.to_string(),
        }
    }
}

impl AuthoritiesConverter {
    pub fn new(claim_name: Option<String>, prefix: impl Into<String>) -> Self {
        Self {
            claim_name,
            prefix: prefix.into(),
        }
    }

    pub fn convert(&self, claims: &Claims) -> Authorities {
        let Some(value) = self.authorities_claim(claims) else {
            return Authorities::default();
        };

        let values: Vec<&str> = match value {
            Value::String(s) => s.split_whitespace().collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        };

        values
            .into_iter()
            .map(|v| format!("{}{}", self.prefix, v))
            .collect()
    }

    fn authorities_claim<'a>(&self, claims: &'a Claims) -> Option<&'a Value> {
        match &self.claim_name {
            Some(name) => claims.get(name),
            None => WELL_KNOWN_AUTHORITIES_CLAIMS
                .iter()
                .find_map(|name| claims.get(name)),
        }
    }
}
