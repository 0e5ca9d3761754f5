//! Fuzz target for payload decryption
//!
//! Feeds arbitrary strings and byte-level mutations of an honest payload to
//! `decrypt`.
//!
//! # Invariants
//!
//! - Decryption never panics
//! - Every failure is the same opaque error
//! - A payload decrypts only if it is byte-identical to the honest one

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sealpost_crypto::{ConversationKey, decrypt, encrypt_with_nonce};

#[derive(Debug, Arbitrary)]
enum Input {
    /// Arbitrary text parsed as a payload
    Raw(String),
    /// Honest payload with one character replaced
    Mutated { plaintext: String, nonce: [u8; 32], index: usize, replacement: u8 },
}

fuzz_target!(|input: Input| {
    let conversation_key = ConversationKey::from_bytes([7u8; 32]);

    match input {
        Input::Raw(payload) => {
            let _ = decrypt(&payload, &conversation_key);
        },
        Input::Mutated { plaintext, nonce, index, replacement } => {
            let Ok(payload) = encrypt_with_nonce(&plaintext, &conversation_key, nonce) else {
                return;
            };
            assert_eq!(decrypt(&payload, &conversation_key).as_deref(), Ok(plaintext.as_str()));

            let mut bytes = payload.clone().into_bytes();
            if bytes.is_empty() {
                return;
            }
            let at = index % bytes.len();
            bytes[at] = replacement;
            let Ok(mutated) = String::from_utf8(bytes) else {
                return;
            };

            if mutated != payload {
                // Base64 padding bits may decode to the same bytes
                if let Ok(recovered) = decrypt(&mutated, &conversation_key) {
                    assert_eq!(recovered, plaintext);
                }
            }
        },
    }
});
