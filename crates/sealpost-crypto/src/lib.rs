//! Sealpost Cryptographic Primitives
//!
//! Cryptographic building blocks for the Sealpost envelope pipeline. Pure
//! functions with deterministic outputs. Callers provide random bytes for
//! deterministic testing.
//!
//! # Key Lifecycle
//!
//! Two parties share a conversation key derived from one side's secret scalar
//! and the other side's public point. Every encryption draws a fresh 32-byte
//! nonce, from which one-time message keys are expanded.
//!
//! ```text
//! secret(A) x public(B)
//!        │
//!        ▼ ECDH (x coordinate)
//! Shared Secret
//!        │
//!        ▼ HKDF-Extract(salt = "nip44-v2")
//! Conversation Key
//!        │
//!        ▼ HKDF-Expand(info = nonce, 76 bytes)
//! Message Keys (chacha key, chacha nonce, hmac key)
//!        │
//!        ▼ pad → ChaCha20 → HMAC-SHA256(nonce || ciphertext)
//! base64(version || nonce || ciphertext || mac)
//! ```
//!
//! Message keys are used for exactly one encryption operation and are
//! zeroized as soon as they are dropped.
//!
//! # Security
//!
//! Confidentiality:
//! - Conversation key is symmetric: `derive(a, B) == derive(b, A)`
//! - Nonce reuse under one conversation key is forbidden; callers supply
//!   CSPRNG output for every encryption
//!
//! Authenticity:
//! - HMAC-SHA256 covers nonce and ciphertext
//! - MAC is verified in constant time before any decryption happens
//!
//! Length hiding:
//! - Plaintext is padded to a small set of bucket sizes before encryption
//!
//! Oracle resistance:
//! - Every decryption failure (bad shape, unknown version, MAC mismatch, bad
//!   padding, bad UTF-8) yields the same opaque [`DecryptError`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod keys;
pub mod payload;

pub use error::{CryptoError, DecryptError};
pub use keys::{Keys, PublicKey, SecretKey};
pub use payload::{
    ConversationKey, EncryptedPayload, MessageKeys, NONCE_SIZE, VERSION, decrypt, encrypt,
    encrypt_with_nonce, pad, padded_len, unpad,
};
