//! Bearer token values.
//!
//! A token starts life as an [`UnverifiedToken`] (structurally decoded, not trusted)
//! and becomes a [`VerifiedToken`] only by passing the
//! [`TokenValidator`](super::validator::TokenValidator) pipeline. Only verified
//! tokens can reach the authorization gate or handlers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AuthError;

/// JOSE header: algorithm and key-id metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoseHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Claim name → claim value, exactly as decoded from the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// A claim that may be a single string or a list of strings (`aud`).
    /// Non-string list members are skipped.
    pub fn string_list(&self, name: &str) -> Vec<&str> {
        match self.0.get(name) {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// NumericDate claim (`exp`, `nbf`, `iat`). Absent → `Ok(None)`; present but not a
    /// number of seconds → malformed.
    pub fn timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>, AuthError> {
        let Some(value) = self.0.get(name) else {
            return Ok(None);
        };

        let seconds = value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.floor() as i64))
            .ok_or_else(|| AuthError::malformed(format!("'{name}' is not a numeric date")))?;

        DateTime::from_timestamp(seconds, 0)
            .map(Some)
            .ok_or_else(|| AuthError::malformed(format!("'{name}' is out of range")))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Structurally decoded token. Nothing in here is trusted yet.
#[derive(Clone)]
pub struct UnverifiedToken {
    header: JoseHeader,
    claims: Claims,
    signing_input: String,
    signature: String,
}

impl UnverifiedToken {
    pub(super) fn new(
        header: JoseHeader,
        claims: Claims,
        signing_input: String,
        signature: String,
    ) -> Self {
        Self {
            header,
            claims,
            signing_input,
            signature,
        }
    }

    pub fn header(&self) -> &JoseHeader {
        &self.header
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// `header.payload` exactly as received; this is what the signature covers.
    pub(super) fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// The base64url signature segment exactly as received.
    pub(super) fn signature(&self) -> &str {
        &self.signature
    }

    pub(super) fn verified(&self) -> VerifiedToken {
        VerifiedToken::new(self.header.clone(), self.claims.clone())
    }
}

impl fmt::Debug for UnverifiedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Signature bytes stay out of logs.
        f.debug_struct("UnverifiedToken")
            .field("header", &self.header)
            .field("claims", &self.claims)
            .field("signature_len", &self.signature.len())
            .finish()
    }
}

/// A token whose signature and claims passed validation. Carries no signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedToken {
    header: JoseHeader,
    claims: Claims,
}

impl VerifiedToken {
    pub(super) fn new(header: JoseHeader, claims: Claims) -> Self {
        Self { header, claims }
    }

    pub fn header(&self) -> &JoseHeader {
        &self.header
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.string("sub")
    }
}
