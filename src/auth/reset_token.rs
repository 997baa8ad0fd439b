//! Signed, single-use password reset tokens.
//!
//! A token is `<hex random>.<hex HMAC-SHA256(random)>`. Only the SHA-256 of the
//! random half is persisted, so a leaked table cannot be turned back into a
//! token that passes signature verification.

use chrono::Duration;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of entropy in the random half.
pub const RANDOM_BYTES: usize = 32;

pub const SEPARATOR: char = '.';

pub fn lifetime() -> Duration {
    Duration::hours(1)
}

/// A freshly minted token: `signed` goes into the email, `token_hash` into the database.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub signed: String,
    pub token_hash: String,
}

#[derive(Clone)]
pub struct ResetTokenSigner {
    secret: String,
}

impl std::fmt::Debug for ResetTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenSigner").finish_non_exhaustive()
    }
}

impl ResetTokenSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn issue(&self) -> Result<IssuedResetToken, String> {
        let bytes: [u8; RANDOM_BYTES] = rand::random();
        let raw = hex::encode(bytes);
        let signature = self.sign(&raw)?;

        Ok(IssuedResetToken {
            signed: format!("{raw}{SEPARATOR}{signature}"),
            token_hash: hash_raw(&raw),
        })
    }

    /// Check the signature and return the raw random half.
    pub fn verify(&self, signed: &str) -> Result<String, String> {
        let (raw, signature) = signed
            .split_once(SEPARATOR)
            .ok_or_else(|| "Invalid token format".to_string())?;

        if raw.len() != RANDOM_BYTES * 2
            || signature.contains(SEPARATOR)
            || hex::decode(raw).is_err()
        {
            return Err("Invalid token format".to_string());
        }

        let expected = self.sign(raw)?;
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(raw.to_string())
        } else {
            Err("Invalid token signature".to_string())
        }
    }

    fn sign(&self, raw: &str) -> Result<String, String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| format!("Invalid reset token secret: {e}"))?;
        mac.update(raw.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Storage/lookup key for the raw random half.
pub fn hash_raw(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}
