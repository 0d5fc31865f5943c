//! Token validation pipeline.
//!
//! The pipeline always runs in this order and stops at the first failure:
//! 1. signature (with the configured [`VerificationKey`])
//! 2. timestamps (`exp`, `nbf`, `iat`)
//! 3. issuer
//! 4. audience
//! 5. caller-registered claim checks, in registration order
//!
//! A pipeline must contain exactly one expiry check; [`TokenValidatorBuilder::build`]
//! refuses anything else so a misconfiguration fails at startup.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use serde_json::Value;
use thiserror::Error;

use super::error::AuthError;
use super::key::VerificationKey;
use super::token::{Claims, UnverifiedToken, VerifiedToken};

pub type ValidationResult = Result<VerifiedToken, AuthError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("token validator has no expiry check")]
    MissingExpiryCheck,
    #[error("token validator has {0} expiry checks, expected exactly one")]
    DuplicateExpiryCheck(usize),
}

/// Position of a check in the pipeline. Built-ins sort before custom checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckKind {
    Timestamp,
    Issuer,
    Audience,
    Custom,
}

/// One step of the claims pipeline.
pub trait ClaimCheck: Send + Sync {
    fn kind(&self) -> CheckKind {
        CheckKind::Custom
    }

    fn check(&self, claims: &Claims, now: DateTime<Utc>) -> Result<(), AuthError>;
}

/// `exp` / `nbf` / `iat` against the current time, with a clock-skew allowance.
#[derive(Debug, Clone, Copy)]
pub struct TimestampCheck {
    leeway: TimeDelta,
}

impl TimestampCheck {
    pub fn new(leeway_seconds: u64) -> Self {
        let leeway = TimeDelta::seconds(leeway_seconds.min(u64::from(u32::MAX)) as i64);
        Self { leeway }
    }
}

impl Default for TimestampCheck {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ClaimCheck for TimestampCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Timestamp
    }

    fn check(&self, claims: &Claims, now: DateTime<Utc>) -> Result<(), AuthError> {
        let exp = claims
            .timestamp("exp")?
            .ok_or_else(|| AuthError::TokenExpired("missing 'exp' claim".into()))?;

        let skewed_past = now.checked_sub_signed(self.leeway).unwrap_or(now);
        if skewed_past > exp {
            return Err(AuthError::TokenExpired(format!(
                "expired at {}",
                exp.to_rfc3339()
            )));
        }

        let skewed_future = now.checked_add_signed(self.leeway).unwrap_or(now);
        for name in ["nbf", "iat"] {
            if let Some(at) = claims.timestamp(name)? {
                if skewed_future < at {
                    return Err(AuthError::TokenNotYetValid(format!(
                        "'{name}' is {}",
                        at.to_rfc3339()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// `iss` must equal the expected issuer exactly.
#[derive(Debug, Clone)]
pub struct IssuerCheck {
    expected: String,
}

impl IssuerCheck {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl ClaimCheck for IssuerCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Issuer
    }

    fn check(&self, claims: &Claims, _now: DateTime<Utc>) -> Result<(), AuthError> {
        match claims.string("iss") {
            Some(iss) if iss == self.expected => Ok(()),
            _ => Err(AuthError::UnknownIssuer),
        }
    }
}

/// `aud` (string or list) must contain the expected audience.
#[derive(Debug, Clone)]
pub struct AudienceCheck {
    expected: String,
}

impl AudienceCheck {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl ClaimCheck for AudienceCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Audience
    }

    fn check(&self, claims: &Claims, _now: DateTime<Utc>) -> Result<(), AuthError> {
        if claims.string_list("aud").contains(&self.expected.as_str()) {
            Ok(())
        } else {
            Err(AuthError::AudienceMismatch)
        }
    }
}

/// Caller-supplied predicate over a single claim. A missing claim fails.
pub struct ClaimPredicate {
    claim: String,
    predicate: Box<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl ClaimPredicate {
    pub fn new(
        claim: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            claim: claim.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl fmt::Debug for ClaimPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimPredicate")
            .field("claim", &self.claim)
            .finish_non_exhaustive()
    }
}

impl ClaimCheck for ClaimPredicate {
    fn check(&self, claims: &Claims, _now: DateTime<Utc>) -> Result<(), AuthError> {
        match claims.get(&self.claim) {
            Some(value) if (self.predicate)(value) => Ok(()),
            _ => Err(AuthError::ClaimRejected {
                claim: self.claim.clone(),
            }),
        }
    }
}

pub struct TokenValidatorBuilder {
    key: VerificationKey,
    checks: Vec<Arc<dyn ClaimCheck>>,
}

impl TokenValidatorBuilder {
    pub fn check(mut self, check: impl ClaimCheck + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn build(mut self) -> Result<TokenValidator, PipelineError> {
        let expiry_checks = self
            .checks
            .iter()
            .filter(|c| c.kind() == CheckKind::Timestamp)
            .count();
        match expiry_checks {
            0 => return Err(PipelineError::MissingExpiryCheck),
            1 => {}
            n => return Err(PipelineError::DuplicateExpiryCheck(n)),
        }

        // Stable: custom checks keep their registration order.
        self.checks.sort_by_key(|c| c.kind());

        Ok(TokenValidator {
            key: self.key,
            checks: self.checks,
        })
    }
}

/// Immutable after construction; safe to share across request tasks.
#[derive(Clone)]
pub struct TokenValidator {
    key: VerificationKey,
    checks: Vec<Arc<dyn ClaimCheck>>,
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<CheckKind> = self.checks.iter().map(|c| c.kind()).collect();
        f.debug_struct("TokenValidator")
            .field("key", &self.key)
            .field("checks", &kinds)
            .finish()
    }
}

impl TokenValidator {
    pub fn builder(key: VerificationKey) -> TokenValidatorBuilder {
        TokenValidatorBuilder {
            key,
            checks: Vec::new(),
        }
    }

    /// Signature + timestamps + issuer + audience.
    pub fn with_defaults(
        key: VerificationKey,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, PipelineError> {
        Self::builder(key)
            .check(TimestampCheck::new(leeway_seconds))
            .check(IssuerCheck::new(issuer))
            .check(AudienceCheck::new(audience))
            .build()
    }

    pub fn validate(&self, token: &UnverifiedToken) -> ValidationResult {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &UnverifiedToken, now: DateTime<Utc>) -> ValidationResult {
        self.verify_signature(token)?;

        for check in &self.checks {
            check.check(token.claims(), now)?;
        }

        Ok(token.verified())
    }

    fn verify_signature(&self, token: &UnverifiedToken) -> Result<(), AuthError> {
        let declared = token.header().alg.as_str();
        let alg = Algorithm::from_str(declared)
            .ok()
            .filter(|alg| self.key.family().accepts(*alg))
            .ok_or_else(|| AuthError::UnsupportedAlgorithm(declared.to_string()))?;

        // Bytes as received: the header is never re-parsed or re-encoded here.
        let verified = jsonwebtoken::crypto::verify(
            token.signature(),
            token.signing_input().as_bytes(),
            self.key.decoding_key(),
            alg,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidKeyFormat => {
                AuthError::UnsupportedAlgorithm(declared.to_string())
            }
            other => {
                tracing::debug!(kind = ?other, "signature verification failed");
                AuthError::SignatureInvalid
            }
        })?;

        if verified {
            Ok(())
        } else {
            Err(AuthError::SignatureInvalid)
        }
    }
}
