//! Structural decoding of compact bearer tokens (`header.payload.signature`).
//!
//! No trust decisions are made here.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use super::error::AuthError;
use super::token::{JoseHeader, UnverifiedToken};

/// Decode a raw token string into an [`UnverifiedToken`].
pub fn parse(raw: &str) -> Result<UnverifiedToken, AuthError> {
    let mut segments = raw.split('.');
    let (Some(header_segment), Some(payload_segment), Some(signature_segment), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::malformed(
            "expected three dot-separated segments",
        ));
    };

    let header_json = decode_segment(header_segment, "header")?;
    let payload_json = decode_segment(payload_segment, "payload")?;
    decode_segment(signature_segment, "signature")?;

    let header: JoseHeader = serde_json::from_slice(&header_json)
        .map_err(|_| AuthError::malformed("header is not a valid JOSE header object"))?;
    let claims: Map<String, Value> = serde_json::from_slice(&payload_json)
        .map_err(|_| AuthError::malformed("payload is not a JSON object"))?;

    Ok(UnverifiedToken::new(
        header,
        claims.into(),
        format!("{header_segment}.{payload_segment}"),
        signature_segment.to_string(),
    ))
}

fn decode_segment(segment: &str, name: &'static str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::malformed(format!("{name} is not base64url")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn compact(header: &Value, payload: &Value, signature: &[u8]) -> String {
        format!(
            "{}.{}.{}",
            segment(header),
            segment(payload),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    #[test]
    fn decodes_header_and_claims_exactly() {
        let payload = json!({
            "iss": "https://issuer.example",
            "aud": ["api", "other"],
            "exp": 1_900_000_000,
            "iat": 1_800_000_000,
            "scope": "read write",
            "nested": {"k": [1, 2, 3]},
        });
        let raw = compact(
            &json!({"alg": "RS256", "kid": "key-1", "typ": "JWT"}),
            &payload,
            b"sig",
        );

        let token = parse(&raw).unwrap();

        assert_eq!(token.header().alg, "RS256");
        assert_eq!(token.header().kid.as_deref(), Some("key-1"));
        assert_eq!(token.header().typ.as_deref(), Some("JWT"));
        assert_eq!(&Value::Object(token.claims().as_map().clone()), &payload);
    }

    #[test]
    fn keeps_unknown_header_parameters() {
        let raw = compact(&json!({"alg": "EdDSA", "x5t": "abc"}), &json!({}), b"");
        let token = parse(&raw).unwrap();
        assert_eq!(token.header().extra.get("x5t"), Some(&json!("abc")));
    }

    #[test]
    fn rejects_wrong_segment_count() {
        for raw in ["", "abc", "a.b", "a.b.c.d", "a.b.c.d.e"] {
            assert!(
                matches!(parse(raw), Err(AuthError::MalformedToken(_))),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_bad_base64() {
        let good = segment(&json!({"alg": "EdDSA"}));
        let raw = format!("{good}.***.{good}");
        assert!(matches!(parse(&raw), Err(AuthError::MalformedToken(_))));

        let padded = format!("{good}=.{good}.");
        assert!(matches!(parse(&padded), Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn signature_segment_must_be_base64url() {
        // Structural: a signature segment that cannot be decoded is malformed
        // before any key is consulted.
        let header = segment(&json!({"alg": "EdDSA"}));
        let payload = segment(&json!({}));
        for signature in ["ab.c", "a+b", "a/b", "abc=", "a"] {
            let raw = format!("{header}.{payload}.{signature}");
            assert!(
                matches!(parse(&raw), Err(AuthError::MalformedToken(_))),
                "{signature:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_non_object_segments() {
        let raw = compact(&json!({"alg": "EdDSA"}), &json!(["not", "a", "map"]), b"s");
        assert!(matches!(parse(&raw), Err(AuthError::MalformedToken(_))));

        let raw = compact(&json!("header"), &json!({}), b"s");
        assert!(matches!(parse(&raw), Err(AuthError::MalformedToken(_))));

        // header without `alg`
        let raw = compact(&json!({"typ": "JWT"}), &json!({}), b"s");
        assert!(matches!(parse(&raw), Err(AuthError::MalformedToken(_))));
    }

    #[test]
    fn rejects_non_json_payload() {
        let header = segment(&json!({"alg": "EdDSA"}));
        let raw = format!("{header}.{}.", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(matches!(parse(&raw), Err(AuthError::MalformedToken(_))));
    }
}
