//! Keyed token verifiers.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// Computes and checks HMAC-SHA256 verifiers for API token material.
///
/// Only the verifier is persisted, so a leaked database does not yield usable tokens
/// without the pepper.
#[derive(Clone)]
pub struct TokenVerifier {
    pepper: Vec<u8>,
}

/// Errors raised while computing token verifiers.
#[derive(Debug, Error)]
pub enum TokenVerifierError {
    #[error("token pepper must not be empty")]
    EmptyPepper,

    #[error("token pepper has an invalid length")]
    InvalidKey,
}

impl TokenVerifier {
    /// # Errors
    ///
    /// Returns an error if the pepper is empty.
    pub fn new(pepper: impl Into<Vec<u8>>) -> Result<Self, TokenVerifierError> {
        let pepper = pepper.into();

        if pepper.is_empty() {
            return Err(TokenVerifierError::EmptyPepper);
        }

        Ok(Self { pepper })
    }

    /// Compute the hex-encoded verifier for `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HMAC cannot be keyed.
    pub fn sign(&self, input: &[u8]) -> Result<String, TokenVerifierError> {
        let mut mac = self.mac()?;

        mac.update(input);

        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check `input` against a stored hex verifier in constant time.
    ///
    /// # Errors
    ///
    /// Returns an error if the HMAC cannot be keyed.
    pub fn verify(&self, input: &[u8], verifier: &str) -> Result<bool, TokenVerifierError> {
        let Ok(expected) = hex::decode(verifier) else {
            return Ok(false);
        };

        let mut mac = self.mac()?;

        mac.update(input);

        Ok(mac.verify_slice(&expected).is_ok())
    }

    fn mac(&self) -> Result<HmacSha256, TokenVerifierError> {
        HmacSha256::new_from_slice(&self.pepper).map_err(|_| TokenVerifierError::InvalidKey)
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenVerifier(**redacted**)")
    }
}

impl Drop for TokenVerifier {
    fn drop(&mut self) {
        self.pepper.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_input_verifies() {
        let verifier = TokenVerifier::new("pepper").expect("pepper is valid");
        let signature = verifier.sign(b"material").expect("signing succeeds");

        assert_eq!(signature.len(), 64);
        assert!(verifier.verify(b"material", &signature).expect("verify runs"));
    }

    #[test]
    fn tampered_input_is_rejected() {
        let verifier = TokenVerifier::new("pepper").expect("pepper is valid");
        let signature = verifier.sign(b"material").expect("signing succeeds");

        assert!(!verifier.verify(b"materiaL", &signature).expect("verify runs"));
        assert!(!verifier.verify(b"material", "not-hex").expect("verify runs"));
    }

    #[test]
    fn different_peppers_disagree() {
        let one = TokenVerifier::new("one").expect("pepper is valid");
        let two = TokenVerifier::new("two").expect("pepper is valid");
        let signature = one.sign(b"material").expect("signing succeeds");

        assert!(!two.verify(b"material", &signature).expect("verify runs"));
    }

    #[test]
    fn empty_pepper_is_rejected() {
        assert!(matches!(
            TokenVerifier::new(Vec::new()),
            Err(TokenVerifierError::EmptyPepper)
        ));
    }
}
