//! Fixtures shared by the unit tests and the router tests (`test-utils` feature).
//! Token minting lives here only; the server itself never issues tokens.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

pub const ED25519_PRIVATE: &str = include_str!("../tests/fixtures/ed25519_private.pem");
pub const ED25519_PUBLIC: &str = include_str!("../tests/fixtures/ed25519_public.pem");
pub const OTHER_ED25519_PRIVATE: &str =
    include_str!("../tests/fixtures/other_ed25519_private.pem");
pub const RSA_PRIVATE: &str = include_str!("../tests/fixtures/rsa_private.pem");
pub const RSA_PUBLIC: &str = include_str!("../tests/fixtures/rsa_public.pem");
pub const EC_P256_PRIVATE: &str = include_str!("../tests/fixtures/ec_p256_private.pem");
pub const EC_P256_PUBLIC: &str = include_str!("../tests/fixtures/ec_p256_public.pem");
pub const EC_P384_PUBLIC: &str = include_str!("../tests/fixtures/ec_p384_public.pem");

pub const ISSUER: &str = "https://issuer.test";
pub const AUDIENCE: &str = "resource-server";

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims that pass every built-in check, merged with `extra` (extra wins).
pub fn claims_with(extra: Value) -> Value {
    let now = now();
    let mut claims = json!({
        "iss": ISSUER,
        "aud": [AUDIENCE],
        "sub": "alice",
        "iat": now - 10,
        "exp": now + 300,
    });
    if let (Some(base), Value::Object(extra)) = (claims.as_object_mut(), extra) {
        base.extend(extra);
    }
    claims
}

pub fn claims_with_scope(scope: &str) -> Value {
    claims_with(json!({ "scope": scope }))
}

/// Claims carrying an `authorities` list (roles profile).
pub fn claims_with_authorities(authorities: &[&str]) -> Value {
    let mut claims = claims_with_scope("");
    claims["authorities"] = json!(authorities);
    claims
}

fn encoding_key(alg: Algorithm, private_pem: &str) -> EncodingKey {
    match alg {
        Algorithm::EdDSA => EncodingKey::from_ed_pem(private_pem.as_bytes()),
        Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(private_pem.as_bytes()),
        _ => EncodingKey::from_rsa_pem(private_pem.as_bytes()),
    }
    .expect("fixture private key")
}

pub fn sign(alg: Algorithm, private_pem: &str, claims: &Value) -> String {
    jsonwebtoken::encode(&Header::new(alg), claims, &encoding_key(alg, private_pem))
        .expect("sign fixture token")
}

/// Sign with an arbitrary JOSE header (any JSON values, not only strings).
/// The header must carry `alg`, and `alg` selects the signing algorithm.
pub fn sign_with_header(header: &Value, private_pem: &str, claims: &Value) -> String {
    let alg = header["alg"]
        .as_str()
        .and_then(|alg| alg.parse::<Algorithm>().ok())
        .expect("header with a known alg");
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap()),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap()),
    );
    let signature = jsonwebtoken::crypto::sign(
        signing_input.as_bytes(),
        &encoding_key(alg, private_pem),
        alg,
    )
    .expect("sign fixture token");

    format!("{signing_input}.{signature}")
}

pub fn sign_ed(claims: &Value) -> String {
    sign(Algorithm::EdDSA, ED25519_PRIVATE, claims)
}

/// A token with an arbitrary header and a junk signature.
pub fn forge(header: &Value, claims: &Value) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap()),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap()),
        URL_SAFE_NO_PAD.encode(b"not-a-signature"),
    )
}

/// Flip one bit of the decoded signature and re-encode it.
pub fn flip_signature_bit(token: &str, byte: usize, bit: u8) -> String {
    let (signing_input, signature) = token.rsplit_once('.').expect("compact token");
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).expect("base64url signature");
    let idx = byte % bytes.len();
    bytes[idx] ^= 1 << (bit % 8);
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(bytes))
}
