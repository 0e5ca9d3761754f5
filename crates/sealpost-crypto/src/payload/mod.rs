//! Versioned encrypted payloads
//!
//! This module implements the payload format used by every encrypted layer of
//! the envelope pipeline (seal content and gift wrap content):
//!
//! ```text
//! Conversation Key (ECDH + HKDF-Extract)
//!        │
//!        ▼ HKDF-Expand(nonce)
//! MessageKeys
//!        │
//!        ▼ pad(plaintext) → ChaCha20 → HMAC-SHA256
//! base64(0x02 || nonce[32] || ciphertext || mac[32])
//! ```
//!
//! # Security Properties
//!
//! - Length hiding: plaintexts are padded to power-of-two derived buckets
//! - Integrity: MAC covers the nonce and the full ciphertext
//! - Fail closed: structural checks happen before any key derivation

pub mod conversation;
pub mod encryption;
pub mod padding;

pub use conversation::ConversationKey;
pub use encryption::{
    EncryptedPayload, MAC_SIZE, MessageKeys, NONCE_SIZE, VERSION, decrypt, encrypt,
    encrypt_with_nonce,
};
pub use padding::{MAX_PLAINTEXT_SIZE, pad, padded_len, unpad};
