//! X-Line-Signature: base64(HMAC-SHA256(channel secret, raw request body)).

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Signature LINE would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> String {
    mac(secret, body)
        .map(|m| base64::engine::general_purpose::STANDARD.encode(m.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Constant-time check of a header value against the body. Bad base64 fails verification.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Some(mac) = mac(secret, body) else {
        return false;
    };
    mac.verify_slice(&expected).is_ok()
}
