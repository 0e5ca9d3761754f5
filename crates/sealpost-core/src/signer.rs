//! Signing and encryption capability consumed by the engines.
//!
//! The engines never require raw key material for the real identity: they ask
//! a [`Signer`] to sign records and, for seals, to run the payload cipher on
//! their behalf. External key custodians that cannot encrypt keep the default
//! `encrypt`/`decrypt`, which report [`SignerError::Unsupported`].

use sealpost_crypto::{ConversationKey, Keys, PublicKey, payload};
use sealpost_proto::{Event, UnsignedEvent};

use crate::{env::Environment, error::SignerError};

/// An identity able to sign records and optionally encrypt for peers.
pub trait Signer {
    /// Public key of this identity.
    fn public_key(&self) -> PublicKey;

    /// Compute the id of `unsigned` and sign it.
    fn sign_event(&self, unsigned: UnsignedEvent) -> Result<Event, SignerError>;

    /// Encrypt `plaintext` to `peer` under the conversation key of this
    /// identity and `peer`.
    fn encrypt(&self, peer: &PublicKey, plaintext: &str) -> Result<String, SignerError> {
        let _ = (peer, plaintext);
        Err(SignerError::Unsupported { operation: "encrypt" })
    }

    /// Decrypt a payload received from `peer`.
    fn decrypt(&self, peer: &PublicKey, payload: &str) -> Result<String, SignerError> {
        let _ = (peer, payload);
        Err(SignerError::Unsupported { operation: "decrypt" })
    }
}

/// Signer backed by local key material.
///
/// Nonces and BIP-340 auxiliary randomness come from the environment.
#[derive(Debug, Clone)]
pub struct LocalSigner<E: Environment> {
    keys: Keys,
    env: E,
}

impl<E: Environment> LocalSigner<E> {
    /// Wrap a key pair.
    pub fn new(keys: Keys, env: E) -> Self {
        Self { keys, env }
    }

    /// Underlying key pair.
    pub fn keys(&self) -> &Keys {
        &self.keys
    }
}

impl<E: Environment> Signer for LocalSigner<E> {
    fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    fn sign_event(&self, unsigned: UnsignedEvent) -> Result<Event, SignerError> {
        let mut aux_rand = [0u8; 32];
        self.env.random_bytes(&mut aux_rand);

        unsigned
            .sign_with_keys(&self.keys, &aux_rand)
            .map_err(|e| SignerError::Signing { reason: e.to_string() })
    }

    fn encrypt(&self, peer: &PublicKey, plaintext: &str) -> Result<String, SignerError> {
        let conversation_key = ConversationKey::derive(self.keys.secret_key(), peer);

        payload::encrypt(plaintext, &conversation_key, |buf| self.env.random_bytes(buf))
            .map_err(|e| SignerError::Encryption { reason: e.to_string() })
    }

    fn decrypt(&self, peer: &PublicKey, payload: &str) -> Result<String, SignerError> {
        let conversation_key = ConversationKey::derive(self.keys.secret_key(), peer);

        payload::decrypt(payload, &conversation_key).map_err(|_| SignerError::DecryptionFailed)
    }
}
