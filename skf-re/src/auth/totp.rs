//! Time-based one-time password (RFC 6238) second factor
//!
//! # Parameters
//!
//! - HMAC-SHA1, 6 digits, 30-second time step (the defaults every common
//!   authenticator app ships with)
//! - Secrets are 20 random bytes, base32 encoded without padding
//! - Verification accepts one step of clock skew on either side
//!
//! The engine stores only the secret and an enabled flag; it never
//! interprets the submitted code beyond this check.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use skf_common::{Error, Result};
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

const DIGITS: u32 = 6;
const STEP_SECONDS: u64 = 30;
const SKEW_STEPS: i64 = 1;
const ISSUER: &str = "SketchFactor";

/// Generate a fresh base32-encoded secret
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &bytes)
}

/// Compute the code for a secret at a given Unix time
///
/// # Examples
///
/// ```
/// use skf_re::auth::totp::code_at;
///
/// // RFC 6238 test vector: ASCII secret "12345678901234567890" at T = 59
/// let secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
/// assert_eq!(code_at(secret, 59).unwrap(), "287082");
/// ```
pub fn code_at(secret: &str, unix_time: u64) -> Result<String> {
    let key = decode_secret(secret)?;
    hotp(&key, unix_time / STEP_SECONDS)
}

/// Check a submitted code against a secret, allowing one step of skew
pub fn verify_code(secret: &str, code: &str) -> bool {
    let key = match decode_secret(secret) {
        Ok(key) => key,
        Err(_) => return false,
    };

    let step = (unix_now() / STEP_SECONDS) as i64;

    for delta in -SKEW_STEPS..=SKEW_STEPS {
        let counter = step + delta;
        if counter < 0 {
            continue;
        }
        if let Ok(expected) = hotp(&key, counter as u64) {
            if expected == code {
                return true;
            }
        }
    }

    false
}

/// Onboarding URI for authenticator apps
pub fn otpauth_uri(email: &str, secret: &str) -> String {
    format!(
        "otpauth://totp/{issuer}:{email}?secret={secret}&issuer={issuer}&algorithm=SHA1&digits={digits}&period={period}",
        issuer = ISSUER,
        email = email,
        secret = secret,
        digits = DIGITS,
        period = STEP_SECONDS,
    )
}

fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, secret)
        .ok_or_else(|| Error::InvalidInput("malformed second-factor secret".to_string()))
}

/// HOTP (RFC 4226) with dynamic truncation
fn hotp(key: &[u8], counter: u64) -> Result<String> {
    let mut mac =
        HmacSha1::new_from_slice(key).map_err(|e| Error::Internal(e.to_string()))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | (digest[offset + 3] as u32);

    let code = binary % 10u32.pow(DIGITS);
    Ok(format!("{:0width$}", code, width = DIGITS as usize))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
