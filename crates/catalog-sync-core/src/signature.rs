//! Webhook signatures.
//!
//! The commerce platform signs every delivery with HMAC-SHA256 over the raw
//! request body, keyed with the shared webhook secret, and sends the digest
//! base64-encoded in the [`SIGNATURE_HEADER`] header. The digest must be
//! computed over the exact bytes received; re-serializing the parsed JSON
//! would change them.
//!
//! Comparison is constant-time over the encoded digest.
//!
//! # Example
//!
//! ```rust
//! use catalog_sync_core::signature::{sign, verify};
//!
//! let body = br#"{"id":101}"#;
//! let signature = sign(body, b"secret");
//! assert!(verify(body, &signature, b"secret"));
//! assert!(!verify(body, &signature, b"other"));
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 signature.
pub const SIGNATURE_HEADER: &str = "x-shopify-hmac-sha256";

/// Outcome of checking one delivery.
///
/// Keeps the expected digest so that a rejection can be logged with both
/// values side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    pub valid: bool,
    pub expected: String,
}

/// Base64-encoded HMAC-SHA256 of `body` keyed with `secret`.
///
/// An empty secret is a valid (if useless) key.
pub fn sign(body: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Check `provided` against the signature of `body`.
pub fn check(body: &[u8], provided: &str, secret: &[u8]) -> SignatureCheck {
    let expected = sign(body, secret);
    let valid = constant_time_eq(expected.as_bytes(), provided.as_bytes());
    SignatureCheck { valid, expected }
}

/// `true` when `provided` is the signature of `body` under `secret`.
///
/// A missing header should be passed as `""`, which never matches.
pub fn verify(body: &[u8], provided: &str, secret: &[u8]) -> bool {
    check(body, provided, secret).valid
}

/// Compares without short-circuiting on the first differing byte.
///
/// Returns early on a length mismatch; digest length is not secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
