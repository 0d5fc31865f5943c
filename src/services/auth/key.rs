use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("public key pem is not an RSA, EC or Ed25519 public key")]
    UnsupportedPem,
    #[error("EC public key is not on P-256 or P-384")]
    UnsupportedCurve,
}

/// Named curve of an EC public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
}

impl EcCurve {
    /// Curve from the length of an uncompressed SEC1 point (`0x04 || x || y`).
    fn from_point(point: &[u8]) -> Option<Self> {
        match point {
            [0x04, rest @ ..] if rest.len() == 64 => Some(Self::P256),
            [0x04, rest @ ..] if rest.len() == 96 => Some(Self::P384),
            _ => None,
        }
    }
}

/// Asymmetric key family of the configured verification key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    Ec(EcCurve),
    Ed,
}

impl KeyFamily {
    /// Whether a header algorithm may be verified with a key of this family.
    /// Symmetric algorithms are never accepted.
    pub fn accepts(self, alg: Algorithm) -> bool {
        match self {
            Self::Rsa => matches!(
                alg,
                Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512
            ),
            Self::Ec(EcCurve::P256) => alg == Algorithm::ES256,
            Self::Ec(EcCurve::P384) => alg == Algorithm::ES384,
            Self::Ed => matches!(alg, Algorithm::EdDSA),
        }
    }
}

/// Public verification key.
///
/// - Key material is not printable via Debug.
#[derive(Clone)]
pub struct VerificationKey {
    key: DecodingKey,
    family: KeyFamily,
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl VerificationKey {
    /// Load a PEM public key, detecting its family (RSA, then EC, then Ed25519).
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let bytes = pem.as_bytes();

        if let Ok(key) = DecodingKey::from_rsa_pem(bytes) {
            return Ok(Self::new(key, KeyFamily::Rsa));
        }
        if let Ok(key) = DecodingKey::from_ec_pem(bytes) {
            let curve = EcCurve::from_point(key.as_bytes()).ok_or(KeyError::UnsupportedCurve)?;
            return Ok(Self::new(key, KeyFamily::Ec(curve)));
        }
        if let Ok(key) = DecodingKey::from_ed_pem(bytes) {
            return Ok(Self::new(key, KeyFamily::Ed));
        }

        Err(KeyError::UnsupportedPem)
    }

    fn new(key: DecodingKey, family: KeyFamily) -> Self {
        Self { key, family }
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub(super) fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }
}
