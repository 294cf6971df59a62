//! HMAC-SHA256 webhook signatures
//!
//! The sender signs the exact raw request body with the shared secret and
//! delivers the lowercase hex digest out-of-band (usually a header).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 of `payload` keyed by `secret`
pub fn sign(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check `signature_hex` against the expected signature of `payload`.
///
/// The comparison runs in constant time over the content. A length
/// mismatch returns `false` straight away, which reveals nothing about
/// the expected digest. Malformed hex is just a mismatch.
pub fn verify(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
    let expected = sign(secret, payload);
    expected.as_bytes().ct_eq(signature_hex.as_bytes()).into()
}
