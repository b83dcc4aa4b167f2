//! Svix webhook signature verification.
//!
//! Clerk delivers webhooks through Svix, which signs each request with
//! HMAC-SHA256 over `"{svix-id}.{svix-timestamp}.{body}"`.
//! Reference: https://docs.svix.com/receiving/verifying-payloads/how-manual

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

pub const SVIX_ID_HEADER: &str = "svix-id";
pub const SVIX_TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const SVIX_SIGNATURE_HEADER: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";

/// Reasons a signature can be rejected.
///
/// These are logged but never sent back to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("signing secret is not valid base64")]
    InvalidSecret,

    #[error("timestamp is not a unix epoch value")]
    InvalidTimestamp,

    #[error("message timestamp too old")]
    TimestampTooOld,

    #[error("message timestamp too new")]
    TimestampTooNew,

    #[error("no matching signature found")]
    NoMatchingSignature,
}

/// The three Svix headers, all guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignatureHeaders {
    /// Pull the Svix headers out of a request, or `None` if any is missing.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Some(Self {
            id: get(SVIX_ID_HEADER)?,
            timestamp: get(SVIX_TIMESTAMP_HEADER)?,
            signature: get(SVIX_SIGNATURE_HEADER)?,
        })
    }
}

/// Verifies that a webhook payload was signed with the shared secret.
pub trait Verifier: Send + Sync {
    fn verify(
        &self,
        secret: &str,
        headers: &SignatureHeaders,
        payload: &[u8],
    ) -> Result<(), VerifyError>;
}

/// Svix `v1` signature verifier.
#[derive(Debug, Clone)]
pub struct SvixVerifier {
    tolerance_secs: u64,
}

impl SvixVerifier {
    pub fn new(tolerance_secs: u64) -> Self {
        Self { tolerance_secs }
    }

    fn check_timestamp(&self, timestamp: &str, now: u64) -> Result<(), VerifyError> {
        let webhook_time: u64 = timestamp
            .parse()
            .map_err(|_| VerifyError::InvalidTimestamp)?;

        if now > webhook_time && now - webhook_time > self.tolerance_secs {
            warn!(
                webhook_time = webhook_time,
                current_time = now,
                tolerance_secs = self.tolerance_secs,
                "svix_signature_stale"
            );
            return Err(VerifyError::TimestampTooOld);
        }

        if webhook_time > now && webhook_time - now > self.tolerance_secs {
            warn!(
                webhook_time = webhook_time,
                current_time = now,
                tolerance_secs = self.tolerance_secs,
                "svix_signature_from_future"
            );
            return Err(VerifyError::TimestampTooNew);
        }

        Ok(())
    }
}

impl Default for SvixVerifier {
    fn default() -> Self {
        Self::new(300)
    }
}

impl Verifier for SvixVerifier {
    fn verify(
        &self,
        secret: &str,
        headers: &SignatureHeaders,
        payload: &[u8],
    ) -> Result<(), VerifyError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        self.check_timestamp(&headers.timestamp, now)?;

        let expected = sign(secret, &headers.id, &headers.timestamp, payload)?;

        // The header may carry several space-separated "version,signature" pairs
        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .any(|(_, candidate)| constant_time_compare(&expected, candidate));

        if !matched {
            warn!(
                svix_id = %headers.id,
                candidates = headers.signature.split_whitespace().count(),
                "svix_signature_mismatch"
            );
            return Err(VerifyError::NoMatchingSignature);
        }

        Ok(())
    }
}

/// Compute the base64 `v1` signature for a payload.
pub fn sign(
    secret: &str,
    msg_id: &str,
    timestamp: &str,
    payload: &[u8],
) -> Result<String, VerifyError> {
    let key = decode_secret(secret)?;

    let mut mac = HmacSha256::new_from_slice(&key).map_err(|_| VerifyError::InvalidSecret)?;
    mac.update(format!("{}.{}.", msg_id, timestamp).as_bytes());
    mac.update(payload);

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn decode_secret(secret: &str) -> Result<Vec<u8>, VerifyError> {
    let encoded = secret.trim();
    let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);

    STANDARD.decode(encoded).map_err(|_| {
        warn!("svix_signature_invalid_secret");
        VerifyError::InvalidSecret
    })
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    // "test-signing-key" in base64
    const SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleQ==";

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn signed_headers(payload: &[u8], timestamp: u64) -> SignatureHeaders {
        let timestamp = timestamp.to_string();

        let mut mac = HmacSha256::new_from_slice(b"test-signing-key").unwrap();
        mac.update(format!("msg_123.{}.", timestamp).as_bytes());
        mac.update(payload);
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        SignatureHeaders {
            id: "msg_123".to_string(),
            timestamp,
            signature: format!("v1,{}", signature),
        }
    }

    #[test]
    fn test_verify_signature_valid() {
        let payload = br#"{"type":"user.created"}"#;
        let headers = signed_headers(payload, now());

        assert_eq!(SvixVerifier::default().verify(SECRET, &headers, payload), Ok(()));
    }

    #[test]
    fn test_verify_signature_without_prefix() {
        let payload = br#"{"type":"user.created"}"#;
        let headers = signed_headers(payload, now());

        assert_eq!(
            SvixVerifier::default().verify("dGVzdC1zaWduaW5nLWtleQ==", &headers, payload),
            Ok(())
        );
    }

    #[test]
    fn test_verify_signature_among_several() {
        let payload = br#"{"type":"user.deleted"}"#;
        let mut headers = signed_headers(payload, now());
        headers.signature = format!("v1,bm9wZQ== v2,abc {}", headers.signature);

        assert_eq!(SvixVerifier::default().verify(SECRET, &headers, payload), Ok(()));
    }

    #[test]
    fn test_verify_signature_tampered_body() {
        let headers = signed_headers(br#"{"type":"user.created"}"#, now());

        assert_eq!(
            SvixVerifier::default().verify(SECRET, &headers, br#"{"type":"user.deleted"}"#),
            Err(VerifyError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let payload = br#"{}"#;
        let headers = signed_headers(payload, now());

        assert_eq!(
            SvixVerifier::default().verify("whsec_b3RoZXIta2V5", &headers, payload),
            Err(VerifyError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_signature_stale() {
        let payload = br#"{}"#;
        let headers = signed_headers(payload, now() - 3600);

        assert_eq!(
            SvixVerifier::default().verify(SECRET, &headers, payload),
            Err(VerifyError::TimestampTooOld)
        );
    }

    #[test]
    fn test_verify_signature_future() {
        let payload = br#"{}"#;
        let headers = signed_headers(payload, now() + 3600);

        assert_eq!(
            SvixVerifier::default().verify(SECRET, &headers, payload),
            Err(VerifyError::TimestampTooNew)
        );
    }

    #[test]
    fn test_verify_signature_invalid_timestamp() {
        let mut headers = signed_headers(b"{}", now());
        headers.timestamp = "not-a-number".to_string();

        assert_eq!(
            SvixVerifier::default().verify(SECRET, &headers, b"{}"),
            Err(VerifyError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_verify_signature_invalid_secret() {
        let headers = signed_headers(b"{}", now());

        assert_eq!(
            SvixVerifier::default().verify("whsec_%%%", &headers, b"{}"),
            Err(VerifyError::InvalidSecret)
        );
    }

    #[test]
    fn test_headers_require_all_three() {
        let mut map = HeaderMap::new();
        map.insert(SVIX_ID_HEADER, HeaderValue::from_static("msg_1"));
        map.insert(SVIX_TIMESTAMP_HEADER, HeaderValue::from_static("123"));
        assert_eq!(SignatureHeaders::from_headers(&map), None);

        map.insert(SVIX_SIGNATURE_HEADER, HeaderValue::from_static(""));
        assert_eq!(SignatureHeaders::from_headers(&map), None);

        map.insert(SVIX_SIGNATURE_HEADER, HeaderValue::from_static("v1,abc"));
        let headers = SignatureHeaders::from_headers(&map).unwrap();
        assert_eq!(headers.id, "msg_1");
        assert_eq!(headers.signature, "v1,abc");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
