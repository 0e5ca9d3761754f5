//! Seal construction and opening.
//!
//! A seal is the middle layer of the envelope: a kind 13 record, signed by
//! the real author, whose content is the rumor encrypted to one recipient.
//!
//! # Invariants
//!
//! - Seals never carry tags
//! - The rumor author equals the seal author
//! - The authoritative sender of a message is `seal.pubkey`

use sealpost_crypto::PublicKey;
use sealpost_proto::{Event, Kind, Rumor, UnsignedEvent};
use tracing::trace;

use crate::{
    config::WrapConfig,
    env::Environment,
    error::{SealError, SignerError},
    signer::Signer,
};

/// Structural seal checks, performed before any cryptography.
///
/// # Errors
///
/// - `InvalidKind`: kind is not 13
/// - `NonEmptyTags`: the seal carries tags
pub fn validate_seal(seal: &Event) -> Result<(), SealError> {
    if seal.kind != Kind::SEAL {
        return Err(SealError::InvalidKind { kind: seal.kind.as_u16() });
    }
    if !seal.tags.is_empty() {
        return Err(SealError::NonEmptyTags { count: seal.tags.len() });
    }
    Ok(())
}

/// Builds and opens seals.
#[derive(Debug, Clone)]
pub struct SealEngine<E: Environment> {
    env: E,
    config: WrapConfig,
}

impl<E: Environment> SealEngine<E> {
    /// Create an engine.
    pub fn new(env: E, config: WrapConfig) -> Self {
        Self { env, config }
    }

    /// Encrypt `rumor` to `recipient` and sign the seal as `sender`.
    ///
    /// The rumor gets its canonical id filled in before encryption.
    ///
    /// # Errors
    ///
    /// - `SenderMismatch`: `rumor.pubkey` is not the signer's key
    /// - `MalformedRumor`: `rumor.id` is set but stale
    /// - `Signer`: encryption or signing failed
    pub fn seal(
        &self,
        rumor: &Rumor,
        sender: &impl Signer,
        recipient: &PublicKey,
    ) -> Result<Event, SealError> {
        let author = sender.public_key();
        if rumor.pubkey != author {
            return Err(SealError::SenderMismatch {
                rumor: rumor.pubkey.to_hex(),
                seal: author.to_hex(),
            });
        }

        let computed = rumor.compute_id();
        if let Some(declared) = rumor.id
            && declared != computed
        {
            return Err(SealError::MalformedRumor {
                reason: format!("declared id {declared} does not match content ({computed})"),
            });
        }

        let mut rumor = rumor.clone();
        rumor.id = Some(computed);
        let content = sender.encrypt(recipient, &rumor.as_json())?;

        let created_at = if self.config.randomize_seal_timestamp {
            self.env.backdated_now(self.config.max_backdate_secs)
        } else {
            self.env.now()
        };

        let seal = sender.sign_event(UnsignedEvent::new(
            author,
            created_at,
            Kind::SEAL,
            Vec::new(),
            content,
        ))?;

        trace!(seal_id = %seal.id, "sealed rumor");
        Ok(seal)
    }

    /// Open a seal addressed to `recipient`.
    ///
    /// Structure is checked before the signature, and the signature before
    /// any decryption.
    ///
    /// # Errors
    ///
    /// - `InvalidKind` / `NonEmptyTags`: not a well-formed seal
    /// - `InvalidSignature`: id or signature does not verify
    /// - `DecryptionFailed`: content is not a payload for this recipient
    /// - `MalformedRumor`: plaintext is not a valid rumor
    /// - `SenderMismatch`: rumor author differs from `seal.pubkey`
    pub fn unseal(&self, seal: &Event, recipient: &impl Signer) -> Result<Rumor, SealError> {
        validate_seal(seal)?;
        seal.verify().map_err(|_| SealError::InvalidSignature)?;

        let json = recipient.decrypt(&seal.pubkey, &seal.content).map_err(|e| match e {
            SignerError::DecryptionFailed => SealError::DecryptionFailed,
            other => SealError::Signer(other),
        })?;

        let rumor = Rumor::from_json(&json)
            .map_err(|e| SealError::MalformedRumor { reason: e.to_string() })?;

        if rumor.pubkey != seal.pubkey {
            return Err(SealError::SenderMismatch {
                rumor: rumor.pubkey.to_hex(),
                seal: seal.pubkey.to_hex(),
            });
        }

        Ok(rumor)
    }
}
