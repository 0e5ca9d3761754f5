//! Unsigned inner message records.
//!
//! A rumor has the shape of an event without a signature. It is never
//! published on its own: it only travels encrypted inside a seal, so a leaked
//! rumor cannot be attributed to its author by a third party.

use sealpost_crypto::PublicKey;
use serde::{Deserialize, Serialize};

use crate::{
    Tag,
    errors::{ProtocolError, Result},
    event::{UnsignedEvent, compute_id},
    types::{EventId, Kind, Timestamp},
};

/// Unsigned inner record carried by a seal.
///
/// # Invariants
///
/// - `id`, when present, equals the canonical id of the other fields
///   (enforced by [`Rumor::from_json`])
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rumor {
    /// Canonical id, used by higher layers to reference the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    /// Real author
    pub pubkey: PublicKey,
    /// Real creation time
    pub created_at: Timestamp,
    /// Record kind
    pub kind: Kind,
    /// Tags
    pub tags: Vec<Tag>,
    /// Content
    pub content: String,
}

impl Rumor {
    /// Assemble a rumor without an id.
    pub fn new(
        pubkey: PublicKey,
        created_at: Timestamp,
        kind: Kind,
        tags: Vec<Tag>,
        content: impl Into<String>,
    ) -> Self {
        Self { id: None, pubkey, created_at, kind, tags, content: content.into() }
    }

    /// Canonical id of the rumor fields.
    pub fn compute_id(&self) -> EventId {
        compute_id(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Fill in `id` if missing and return it.
    pub fn ensure_id(&mut self) -> EventId {
        *self.id.get_or_insert_with(|| {
            compute_id(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
        })
    }

    /// Parse and validate a rumor.
    ///
    /// Fails closed: missing or mistyped fields are rejected, and a declared
    /// `id` must match the canonical id.
    pub fn from_json(json: &str) -> Result<Self> {
        let rumor: Self = serde_json::from_str(json)
            .map_err(|e| ProtocolError::Malformed { record: "rumor", reason: e.to_string() })?;

        if let Some(declared) = rumor.id {
            let computed = rumor.compute_id();
            if declared != computed {
                return Err(ProtocolError::IdMismatch {
                    declared: declared.to_hex(),
                    computed: computed.to_hex(),
                });
            }
        }

        Ok(rumor)
    }

    /// Compact JSON object form.
    pub fn as_json(&self) -> String {
        let Ok(json) = serde_json::to_string(self) else {
            unreachable!("rumor fields always serialize");
        };
        json
    }

    /// The rumor as a record ready to be signed.
    pub fn to_unsigned(&self) -> UnsignedEvent {
        UnsignedEvent::new(
            self.pubkey,
            self.created_at,
            self.kind,
            self.tags.clone(),
            self.content.clone(),
        )
    }
}

impl From<UnsignedEvent> for Rumor {
    fn from(event: UnsignedEvent) -> Self {
        Self::new(event.pubkey, event.created_at, event.kind, event.tags, event.content)
    }
}
