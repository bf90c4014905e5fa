//! Credential Authentication
//!
//! Players authenticate with an opaque bearer token handed out at signup.
//! The server keeps only a domain-separated SHA-256 digest of each token; the
//! raw value exists in memory just long enough to be returned to the client
//! or looked up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::hash::{hash_with_domain, to_hex, CREDENTIAL_DOMAIN};
use crate::core::rng::RandomSource;

/// Token length in characters.
pub const CREDENTIAL_LENGTH: usize = 32;

/// Token alphabet.
const CREDENTIAL_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A bearer token.
///
/// `Debug` is redacted so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token presented by a client.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generate a fresh random token.
    pub fn generate(rng: &mut dyn RandomSource) -> Self {
        let token = (0..CREDENTIAL_LENGTH)
            .map(|_| {
                let idx = rng.next_below(CREDENTIAL_ALPHABET.len() as u64) as usize;
                CREDENTIAL_ALPHABET[idx] as char
            })
            .collect();
        Self(token)
    }

    /// Hex digest stored in place of the token.
    pub fn digest(&self) -> String {
        to_hex(&hash_with_domain(CREDENTIAL_DOMAIN, self.0.as_bytes()))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;

    #[test]
    fn test_generated_token_shape() {
        let mut rng = DeterministicRng::new(11);
        let credential = Credential::generate(&mut rng);

        // The token reaches its owner only through the signup response.
        let token = serde_json::to_value(&credential).unwrap();
        let token = token.as_str().unwrap();
        assert_eq!(token.len(), CREDENTIAL_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_differ() {
        let mut rng = DeterministicRng::new(11);
        let first = Credential::generate(&mut rng);
        let second = Credential::generate(&mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn test_digest_is_stable_and_not_the_token() {
        let credential = Credential::new("abc123");
        let digest = credential.digest();
        assert_eq!(digest, Credential::new("abc123").digest());
        assert_ne!(digest, Credential::new("abc124").digest());
        assert_eq!(digest.len(), 64);
        assert!(!digest.contains("abc123"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        let shown = format!("{credential:?}");
        assert!(!shown.contains("super-secret"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let credential = Credential::new("tok");
        assert_eq!(serde_json::to_string(&credential).unwrap(), "\"tok\"");
    }
}
