//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from key handling and payload construction.
///
/// These are structural, caller-fixable failures. Decryption outcomes are
/// reported separately through [`DecryptError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Public key bytes are malformed or not a point on the curve
    #[error("invalid public key: {reason}")]
    InvalidPublicKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Secret key bytes are malformed or out of scalar range
    #[error("invalid secret key: {reason}")]
    InvalidSecretKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Conversation key inputs were rejected before curve arithmetic
    #[error("key derivation failed: {reason}")]
    KeyDerivation {
        /// Which input was rejected
        reason: String,
    },

    /// Random source never produced a valid scalar
    #[error("key generation failed after {attempts} attempts")]
    KeyGeneration {
        /// Number of candidate scalars drawn
        attempts: usize,
    },

    /// Supplied public key does not belong to the supplied secret key
    #[error("public key does not match secret key")]
    KeyMismatch,

    /// Plaintext or padded buffer violates the payload format
    #[error("payload format error: {reason}")]
    PayloadFormat {
        /// Which constraint was violated
        reason: String,
    },
}

impl CryptoError {
    /// Returns true if this error was caused by malformed caller input.
    ///
    /// Only [`CryptoError::KeyGeneration`] points at the environment (a broken
    /// random source) rather than at the arguments.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::KeyGeneration { .. })
    }
}

/// Opaque decryption failure.
///
/// Deliberately carries no reason: a malformed envelope, an unknown version,
/// a wrong key and a tampered ciphertext are indistinguishable to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid payload")]
pub struct DecryptError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_generation_is_not_input_error() {
        assert!(!CryptoError::KeyGeneration { attempts: 16 }.is_input_error());
    }

    #[test]
    fn format_errors_are_input_errors() {
        assert!(CryptoError::PayloadFormat { reason: "too long".to_string() }.is_input_error());
        assert!(CryptoError::KeyMismatch.is_input_error());
        assert!(
            CryptoError::KeyDerivation { reason: "bad length".to_string() }.is_input_error()
        );
    }

    #[test]
    fn decrypt_error_display_has_no_detail() {
        assert_eq!(DecryptError.to_string(), "invalid payload");
    }

    #[test]
    fn error_display() {
        let err = CryptoError::KeyGeneration { attempts: 3 };
        assert_eq!(err.to_string(), "key generation failed after 3 attempts");
    }
}
