//! Conversation key derivation using ECDH and HKDF

use hkdf::Hkdf;
use secp256k1::ecdh::shared_secret_point;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{
    error::CryptoError,
    keys::{PublicKey, SecretKey},
};

/// Salt used for conversation key extraction
const CONVERSATION_KEY_SALT: &[u8] = b"nip44-v2";

/// Size of a conversation key in bytes
pub const CONVERSATION_KEY_SIZE: usize = 32;

/// Symmetric key shared by exactly two parties.
///
/// Derived on demand and never cached by this crate. Zeroized on drop.
///
/// # Security
///
/// - Symmetric: `derive(a, B) == derive(b, A)` for any two key pairs
/// - Deterministic: same inputs always produce the same key
/// - Independent of public key parity: only the x coordinate of the shared
///   point is used
#[derive(Clone)]
pub struct ConversationKey([u8; CONVERSATION_KEY_SIZE]);

impl ConversationKey {
    /// Derive the conversation key between `secret` and `public`.
    pub fn derive(secret: &SecretKey, public: &PublicKey) -> Self {
        let mut shared_point = shared_secret_point(&public.to_even_point(), &secret.to_secp());

        // First 32 bytes of the uncompressed product are the x coordinate
        let (prk, _) =
            Hkdf::<Sha256>::extract(Some(CONVERSATION_KEY_SALT), &shared_point[..32]);
        shared_point.zeroize();

        let mut key = [0u8; CONVERSATION_KEY_SIZE];
        key.copy_from_slice(&prk);
        Self(key)
    }

    /// Derive a conversation key from raw byte inputs.
    ///
    /// `secret` must be a 32-byte scalar in curve range and `public` a 32-byte
    /// x-only or 33-byte compressed point. Inputs are validated before any
    /// curve arithmetic.
    pub fn derive_from_slices(secret: &[u8], public: &[u8]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(secret)
            .map_err(|e| CryptoError::KeyDerivation { reason: e.to_string() })?;
        let public = PublicKey::from_slice(public)
            .map_err(|e| CryptoError::KeyDerivation { reason: e.to_string() })?;

        Ok(Self::derive(&secret, &public))
    }

    /// Wrap existing key bytes (test vectors, externally cached keys).
    pub fn from_bytes(bytes: [u8; CONVERSATION_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; CONVERSATION_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConversationKey(<redacted>)")
    }
}

impl Drop for ConversationKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
