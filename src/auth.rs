//! Credential hashing and opaque identifier generation.
//!
//! Password hashes are PBKDF2-HMAC-SHA256 with a per-record random salt:
//! the stored column is `hex(salt) || hex(digest)` with a 16-byte salt, so
//! the first 32 hex characters recover the salt at verification time.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

/// KDF iteration count. Slow on purpose.
const PBKDF2_ROUNDS: u32 = 100_000;

/// Salt length in bytes; encoded as 32 hex characters.
const SALT_LEN: usize = 16;

/// Derived digest length in bytes.
const DIGEST_LEN: usize = 32;

/// Entropy in a user identifier.
const USER_ID_LEN: usize = 16;

/// Entropy in a session token: 32 bytes = 256 bits.
const TOKEN_LEN: usize = 32;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ROUNDS, &mut digest);

    format!("{}{}", hex::encode(salt), hex::encode(digest))
}

/// Verify a password against a stored hash.
///
/// Recomputes the digest with the stored salt and compares in constant time.
/// A stored value too short to contain a salt verifies as false, not as an
/// error.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let salt_hex_len = SALT_LEN * 2;
    if stored.len() <= salt_hex_len {
        return false;
    }
    let Ok(salt) = hex::decode(&stored[..salt_hex_len]) else {
        return false;
    };
    let Ok(expected) = hex::decode(&stored[salt_hex_len..]) else {
        return false;
    };

    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ROUNDS, &mut digest);

    constant_time_eq(&digest, &expected)
}

/// Generate an unguessable user identifier (URL-safe).
pub fn generate_user_id() -> String {
    random_urlsafe(USER_ID_LEN)
}

/// Generate a session token with 256 bits of entropy (URL-safe).
pub fn generate_session_token() -> String {
    random_urlsafe(TOKEN_LEN)
}

fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time byte comparison: always examines every byte, accumulating
/// differences without short-circuiting.
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
