//! Authenticated payload encryption using ChaCha20 and HMAC-SHA256
//!
//! Each payload uses one-time message keys expanded from the conversation key
//! and a fresh 32-byte nonce:
//!
//! - ChaCha20 (IETF, 96-bit nonce, counter 0) over the padded plaintext
//! - HMAC-SHA256 over `nonce || ciphertext`, verified before decryption
//! - Base64 text encoding of `version || nonce || ciphertext || mac`

use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20::{
    ChaCha20,
    cipher::{KeyIvInit, StreamCipher},
};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use super::{
    conversation::ConversationKey,
    padding::{LENGTH_PREFIX_SIZE, pad, padded_len, unpad},
};
use crate::error::{CryptoError, DecryptError};

type HmacSha256 = Hmac<Sha256>;

/// Current payload format version
pub const VERSION: u8 = 2;

/// Size of the per-payload random nonce
pub const NONCE_SIZE: usize = 32;

/// Size of the HMAC-SHA256 tag
pub const MAC_SIZE: usize = 32;

/// First character of payloads using a future, unsupported encoding
const UNSUPPORTED_MARKER: char = '#';

/// Bounds on the base64 text form (1-byte and 65535-byte plaintexts)
const MIN_ENCODED_LEN: usize = 132;
const MAX_ENCODED_LEN: usize = 87472;

/// Bounds on the decoded binary form
const MIN_DECODED_LEN: usize = 99;
const MAX_DECODED_LEN: usize = 65603;

/// HKDF-Expand output: chacha key (32) || chacha nonce (12) || hmac key (32)
const MESSAGE_KEYS_SIZE: usize = 76;

/// One-time keys for a single payload.
///
/// Derived from a conversation key and the payload nonce. Never reused across
/// nonces; zeroized on drop.
pub struct MessageKeys {
    chacha_key: [u8; 32],
    chacha_nonce: [u8; 12],
    hmac_key: [u8; 32],
}

impl MessageKeys {
    /// Expand the message keys for `nonce` under `conversation_key`.
    pub fn derive(conversation_key: &ConversationKey, nonce: &[u8; NONCE_SIZE]) -> Self {
        let Ok(hkdf) = Hkdf::<Sha256>::from_prk(conversation_key.as_bytes()) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 PRK length");
        };

        let mut okm = [0u8; MESSAGE_KEYS_SIZE];
        let Ok(()) = hkdf.expand(nonce, &mut okm) else {
            unreachable!("76 bytes is a valid HKDF-SHA256 output length");
        };

        let mut keys = Self { chacha_key: [0u8; 32], chacha_nonce: [0u8; 12], hmac_key: [0u8; 32] };
        keys.chacha_key.copy_from_slice(&okm[0..32]);
        keys.chacha_nonce.copy_from_slice(&okm[32..44]);
        keys.hmac_key.copy_from_slice(&okm[44..76]);
        okm.zeroize();

        keys
    }

    /// ChaCha20 key
    pub fn chacha_key(&self) -> &[u8; 32] {
        &self.chacha_key
    }

    /// ChaCha20 nonce
    pub fn chacha_nonce(&self) -> &[u8; 12] {
        &self.chacha_nonce
    }

    /// HMAC-SHA256 key
    pub fn hmac_key(&self) -> &[u8; 32] {
        &self.hmac_key
    }

    fn apply_keystream(&self, buf: &mut [u8]) {
        let mut cipher = ChaCha20::new((&self.chacha_key).into(), (&self.chacha_nonce).into());
        cipher.apply_keystream(buf);
    }

    fn authenticator(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> HmacSha256 {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.hmac_key) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(nonce);
        mac.update(ciphertext);
        mac
    }

    fn mac(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> [u8; MAC_SIZE] {
        self.authenticator(nonce, ciphertext).finalize().into_bytes().into()
    }

    /// Constant-time tag comparison
    fn verify_mac(
        &self,
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
        tag: &[u8; MAC_SIZE],
    ) -> bool {
        self.authenticator(nonce, ciphertext).verify_slice(tag).is_ok()
    }
}

impl std::fmt::Debug for MessageKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MessageKeys(<redacted>)")
    }
}

impl Drop for MessageKeys {
    fn drop(&mut self) {
        self.chacha_key.zeroize();
        self.chacha_nonce.zeroize();
        self.hmac_key.zeroize();
    }
}

/// A structurally valid version 2 payload.
///
/// Obtaining one through [`EncryptedPayload::parse`] only proves the shape;
/// authenticity is checked by [`decrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Per-payload random nonce
    pub nonce: [u8; NONCE_SIZE],
    /// Encrypted padded plaintext
    pub ciphertext: Vec<u8>,
    /// HMAC-SHA256 over nonce and ciphertext
    pub mac: [u8; MAC_SIZE],
}

impl EncryptedPayload {
    /// Parse the base64 text form, enforcing version and length bounds.
    ///
    /// Performs no key derivation. All failures are the opaque
    /// [`DecryptError`].
    pub fn parse(payload: &str) -> Result<Self, DecryptError> {
        if payload.is_empty() || payload.starts_with(UNSUPPORTED_MARKER) {
            return Err(DecryptError);
        }
        if !(MIN_ENCODED_LEN..=MAX_ENCODED_LEN).contains(&payload.len()) {
            return Err(DecryptError);
        }

        let decoded = STANDARD.decode(payload).map_err(|_| DecryptError)?;
        if !(MIN_DECODED_LEN..=MAX_DECODED_LEN).contains(&decoded.len()) {
            return Err(DecryptError);
        }

        let Some((&version, rest)) = decoded.split_first() else {
            return Err(DecryptError);
        };
        if version != VERSION {
            return Err(DecryptError);
        }

        let Some((nonce, rest)) = rest.split_first_chunk::<NONCE_SIZE>() else {
            return Err(DecryptError);
        };
        let Some((ciphertext, mac)) = rest.split_last_chunk::<MAC_SIZE>() else {
            return Err(DecryptError);
        };

        // Ciphertext must be exactly one padding bucket plus the length prefix
        let Some(body_len) = ciphertext.len().checked_sub(LENGTH_PREFIX_SIZE) else {
            return Err(DecryptError);
        };
        if padded_len(body_len).ok() != Some(body_len) {
            return Err(DecryptError);
        }

        Ok(Self { nonce: *nonce, ciphertext: ciphertext.to_vec(), mac: *mac })
    }

    /// Binary form: `version || nonce || ciphertext || mac`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + NONCE_SIZE + self.ciphertext.len() + MAC_SIZE);
        bytes.push(VERSION);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes.extend_from_slice(&self.mac);
        bytes
    }

    /// Base64 text form used on the wire.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }
}

/// Encrypt `plaintext` with a fresh nonce drawn from `fill_random`.
///
/// `fill_random` MUST be backed by a CSPRNG: nonce reuse under one
/// conversation key breaks confidentiality.
///
/// # Errors
///
/// - `PayloadFormat`: plaintext longer than 65535 bytes
pub fn encrypt(
    plaintext: &str,
    conversation_key: &ConversationKey,
    mut fill_random: impl FnMut(&mut [u8]),
) -> Result<String, CryptoError> {
    let mut nonce = [0u8; NONCE_SIZE];
    fill_random(&mut nonce);
    encrypt_with_nonce(plaintext, conversation_key, nonce)
}

/// Encrypt `plaintext` under an explicit nonce.
///
/// Deterministic. Intended for reproducing reference vectors; production
/// code goes through [`encrypt`].
///
/// # Errors
///
/// - `PayloadFormat`: plaintext longer than 65535 bytes
pub fn encrypt_with_nonce(
    plaintext: &str,
    conversation_key: &ConversationKey,
    nonce: [u8; NONCE_SIZE],
) -> Result<String, CryptoError> {
    let keys = MessageKeys::derive(conversation_key, &nonce);

    let mut ciphertext = pad(plaintext.as_bytes())?;
    keys.apply_keystream(&mut ciphertext);
    let mac = keys.mac(&nonce, &ciphertext);

    Ok(EncryptedPayload { nonce, ciphertext, mac }.encode())
}

/// Decrypt and authenticate a payload.
///
/// Shape and version are checked before any key derivation; the MAC is
/// verified in constant time before any decryption. Every failure is the
/// same [`DecryptError`].
pub fn decrypt(payload: &str, conversation_key: &ConversationKey) -> Result<String, DecryptError> {
    let EncryptedPayload { nonce, ciphertext, mac } = EncryptedPayload::parse(payload)?;

    let keys = MessageKeys::derive(conversation_key, &nonce);
    if !keys.verify_mac(&nonce, &ciphertext, &mac) {
        return Err(DecryptError);
    }

    let mut padded = ciphertext;
    keys.apply_keystream(&mut padded);

    let plaintext = unpad(&padded).map(<[u8]>::to_vec);
    padded.zeroize();

    String::from_utf8(plaintext?).map_err(|_| DecryptError)
}
