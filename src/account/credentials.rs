//! Credential sealing for the `credential_secret` column.
//!
//! Sealed form: `sha256$<iterations>$<salt-hex>$<digest-hex>`. Values without
//! the `sha256$` prefix are treated as plain secrets, so rows written under
//! [`CredentialMode::Plain`] keep verifying after switching to hashing.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Salt byte length for credential hashing.
const SALT_BYTES: usize = 16;

/// Default number of SHA-256 iterations for secret stretching.
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;

const SEALED_PREFIX: &str = "sha256";

/// How `credential_secret` is kept at rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    /// Stored verbatim and compared byte-for-byte.
    Plain,
    /// Iterated, salted SHA-256; matched in constant time after lookup.
    #[default]
    SaltedHash,
}

impl CredentialMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::SaltedHash => "salted_hash",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    mode: CredentialMode,
    iterations: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(CredentialMode::default(), DEFAULT_HASH_ITERATIONS)
    }
}

impl CredentialHasher {
    pub fn new(mode: CredentialMode, iterations: u32) -> Self {
        Self {
            mode,
            iterations: iterations.max(1),
        }
    }

    pub fn mode(&self) -> CredentialMode {
        self.mode
    }

    /// Produce the at-rest form of a plain secret.
    pub fn seal(&self, secret: &str) -> String {
        match self.mode {
            CredentialMode::Plain => secret.to_string(),
            CredentialMode::SaltedHash => {
                let salt = generate_salt();
                let digest = hash_secret(secret, &salt, self.iterations);
                format!("{SEALED_PREFIX}${}${salt}${digest}", self.iterations)
            }
        }
    }

    /// Check a candidate secret against a stored value.
    pub fn verify(&self, candidate: &str, stored: &str) -> bool {
        match parse_sealed(stored) {
            Some((iterations, salt, digest)) => {
                let attempt = hash_secret(candidate, salt, iterations);
                constant_time_eq(attempt.as_bytes(), digest.as_bytes())
            }
            None => constant_time_eq(candidate.as_bytes(), stored.as_bytes()),
        }
    }

    /// Burn the same work as a real verification so unknown identifiers
    /// take as long as wrong secrets.
    pub fn verify_dummy(&self, candidate: &str) {
        if self.mode == CredentialMode::SaltedHash {
            let _ = hash_secret(candidate, "00000000000000000000000000000000", self.iterations);
        }
    }
}

fn parse_sealed(stored: &str) -> Option<(u32, &str, &str)> {
    let mut parts = stored.splitn(4, '$');
    if parts.next()? != SEALED_PREFIX {
        return None;
    }
    let iterations = parts.next()?.parse::<u32>().ok()?;
    let salt = parts.next()?;
    let digest = parts.next()?;
    if iterations == 0 || salt.is_empty() || digest.is_empty() {
        return None;
    }
    Some((iterations, salt, digest))
}

/// Generate a random salt (hex-encoded).
fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a secret with salt using iterated SHA-256.
fn hash_secret(secret: &str, salt: &str, iterations: u32) -> String {
    let mut hash = Sha256::new();
    hash.update(salt.as_bytes());
    hash.update(secret.as_bytes());
    let mut result = hash.finalize();

    for _ in 1..iterations {
        let mut h = Sha256::new();
        h.update(result);
        h.update(salt.as_bytes());
        result = h.finalize();
    }

    hex::encode(result)
}

/// Constant-time byte comparison.
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
