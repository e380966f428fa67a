//! Opaque session token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Bytes of randomness in a session token (256 bits).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Generate a cryptographically random opaque session token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; SESSION_TOKEN_BYTES] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}
