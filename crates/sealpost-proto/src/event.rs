//! Signed relay records.
//!
//! Every record on the wire is identified by the SHA-256 of its canonical
//! serialization and signed with BIP-340 Schnorr over that id:
//!
//! ```text
//! id  = sha256(json([0, pubkey, created_at, kind, tags, content]))
//! sig = schnorr(secret(pubkey), id)
//! ```
//!
//! # Security
//!
//! Parsing ([`Event::from_json`]) only guarantees structural validity:
//! well-formed hex ids and signatures, a valid curve point for `pubkey`,
//! string-only tags. Callers MUST call [`Event::verify`] before trusting
//! the content or the author.

use sealpost_crypto::{Keys, PublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    Tag,
    errors::{ProtocolError, Result},
    types::{EventId, Kind, Signature, Timestamp},
};

/// Canonical id serialization shared by events and rumors.
pub(crate) fn canonical_json(
    pubkey: &PublicKey,
    created_at: Timestamp,
    kind: Kind,
    tags: &[Tag],
    content: &str,
) -> String {
    let Ok(json) = serde_json::to_string(&(0u8, pubkey, created_at, kind, tags, content)) else {
        unreachable!("canonical id fields always serialize");
    };
    json
}

pub(crate) fn compute_id(
    pubkey: &PublicKey,
    created_at: Timestamp,
    kind: Kind,
    tags: &[Tag],
    content: &str,
) -> EventId {
    let digest = Sha256::digest(canonical_json(pubkey, created_at, kind, tags, content));
    EventId::from_bytes(digest.into())
}

/// A record ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedEvent {
    /// Author
    pub pubkey: PublicKey,
    /// Claimed creation time
    pub created_at: Timestamp,
    /// Record kind
    pub kind: Kind,
    /// Tags
    pub tags: Vec<Tag>,
    /// Content
    pub content: String,
}

impl UnsignedEvent {
    /// Assemble an unsigned record.
    pub fn new(
        pubkey: PublicKey,
        created_at: Timestamp,
        kind: Kind,
        tags: Vec<Tag>,
        content: impl Into<String>,
    ) -> Self {
        Self { pubkey, created_at, kind, tags, content: content.into() }
    }

    /// Compact JSON array the id is computed over.
    pub fn canonical_json(&self) -> String {
        canonical_json(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Canonical id.
    pub fn compute_id(&self) -> EventId {
        compute_id(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Sign with raw key material.
    ///
    /// `aux_rand` is the BIP-340 auxiliary randomness and should be fresh
    /// random bytes.
    ///
    /// # Errors
    ///
    /// - `KeyMismatch`: `keys` do not own `self.pubkey`
    pub fn sign_with_keys(self, keys: &Keys, aux_rand: &[u8; 32]) -> Result<Event> {
        if keys.public_key() != self.pubkey {
            return Err(ProtocolError::KeyMismatch {
                record: self.pubkey.to_hex(),
                signer: keys.public_key().to_hex(),
            });
        }

        let id = self.compute_id();
        let sig = Signature::from_bytes(keys.sign_schnorr(id.as_bytes(), aux_rand));
        Ok(self.into_event(id, sig))
    }

    /// Attach an externally produced id and signature.
    ///
    /// Performs no verification; use [`Event::verify`] on the result when
    /// the signature came from an untrusted custodian.
    pub fn into_event(self, id: EventId, sig: Signature) -> Event {
        Event {
            id,
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig,
        }
    }
}

/// A signed record as it appears on the wire.
///
/// Field order matches the usual wire layout. Unknown JSON fields are ignored;
/// missing or mistyped fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Canonical id
    pub id: EventId,
    /// Author (or ephemeral signer, for gift wraps)
    pub pubkey: PublicKey,
    /// Claimed creation time
    pub created_at: Timestamp,
    /// Record kind
    pub kind: Kind,
    /// Tags
    pub tags: Vec<Tag>,
    /// Content
    pub content: String,
    /// Schnorr signature over `id`
    pub sig: Signature,
}

impl Event {
    /// Parse a wire record.
    ///
    /// Structural validation only. See [`Event::verify`].
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ProtocolError::Malformed { record: "event", reason: e.to_string() })
    }

    /// Compact JSON object form.
    pub fn as_json(&self) -> String {
        let Ok(json) = serde_json::to_string(self) else {
            unreachable!("event fields always serialize");
        };
        json
    }

    /// Recompute the canonical id from the record fields.
    pub fn compute_id(&self) -> EventId {
        compute_id(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Check that `id` is the canonical id of the record.
    pub fn verify_id(&self) -> Result<()> {
        let computed = self.compute_id();
        if computed != self.id {
            return Err(ProtocolError::IdMismatch {
                declared: self.id.to_hex(),
                computed: computed.to_hex(),
            });
        }
        Ok(())
    }

    /// Check the Schnorr signature over `id` against `pubkey`.
    pub fn verify_signature(&self) -> Result<()> {
        if self.pubkey.verify_schnorr(self.id.as_bytes(), self.sig.as_bytes()) {
            Ok(())
        } else {
            Err(ProtocolError::InvalidSignature)
        }
    }

    /// Check both id and signature.
    pub fn verify(&self) -> Result<()> {
        self.verify_id()?;
        self.verify_signature()
    }

    /// Tags named `name`.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |tag| tag.name() == name)
    }

    /// Public keys referenced by well-formed `p` tags.
    pub fn tagged_public_keys(&self) -> impl Iterator<Item = PublicKey> + '_ {
        self.tags.iter().filter_map(Tag::as_public_key)
    }
}
