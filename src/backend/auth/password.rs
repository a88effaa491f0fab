/**
 * Credential Hashing
 *
 * One-way password hashing and verification using bcrypt. Hashes are salted
 * per call, so hashing the same plaintext twice yields different strings that
 * both verify.
 *
 * bcrypt only reads 72 key bytes, and one of them is the terminating NUL.
 * Longer plaintexts are refused instead of being cut short, so two passwords
 * that share a long prefix can never verify against each other.
 *
 * Nothing in this module logs plaintext input.
 */

use bcrypt::{non_truncating_hash, non_truncating_verify, BcryptError};
use thiserror::Error;

/// bcrypt cost factor used for every stored credential.
pub const HASH_COST: u32 = 10;

/// Longest plaintext, in bytes, that bcrypt can hash without truncation.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Credential hashing errors
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The plaintext does not fit in a bcrypt key.
    #[error("password is {len} bytes long; at most {max} bytes are allowed", max = MAX_PASSWORD_BYTES)]
    TooLong { len: usize },

    /// The hashing library failed (RNG failure, invalid cost, ...).
    #[error("failed to hash credential: {0}")]
    Hashing(#[from] BcryptError),
}

/// Hash a plaintext password with the fixed cost factor.
///
/// # Errors
///
/// * `CredentialError::TooLong` - the plaintext is longer than
///   [`MAX_PASSWORD_BYTES`]; callers report this as a bad request
/// * `CredentialError::Hashing` - bcrypt cannot produce a hash. The caller
///   must treat this as an internal failure and never fall back to storing
///   anything weaker.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    hash_password_with_cost(plaintext, HASH_COST)
}

pub(crate) fn hash_password_with_cost(plaintext: &str, cost: u32) -> Result<String, CredentialError> {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(CredentialError::TooLong {
            len: plaintext.len(),
        });
    }
    Ok(non_truncating_hash(plaintext, cost)?)
}

/// Verify a plaintext password against a stored hash.
///
/// A plaintext too long to have been hashed never matches. A malformed hash
/// is reported at `warn` and treated as a mismatch.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    match non_truncating_verify(plaintext, stored_hash) {
        Ok(valid) => valid,
        Err(BcryptError::Truncation(_)) => false,
        Err(e) => {
            tracing::warn!("Stored credential hash is malformed: {}", e);
            false
        }
    }
}
