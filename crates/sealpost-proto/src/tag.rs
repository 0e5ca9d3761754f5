//! Record tags.
//!
//! A tag is an array of strings whose first element, when present, names
//! it: `["p", <pubkey hex>, <relay hint>?]`. Empty tags are carried as-is
//! and have the empty name.

use sealpost_crypto::PublicKey;
use serde::{Deserialize, Serialize};

/// Name of the public key reference tag
pub const PUBLIC_KEY_TAG: &str = "p";

/// A single tag: `[name, value, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Vec<String>);

impl Tag {
    /// Build a tag from its name and values.
    pub fn new(
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut fields = vec![name.into()];
        fields.extend(values.into_iter().map(Into::into));
        Self(fields)
    }

    /// `["p", pubkey, relay_hint?]`
    pub fn public_key(public_key: &PublicKey, relay_hint: Option<&str>) -> Self {
        let mut fields = vec![PUBLIC_KEY_TAG.to_string(), public_key.to_hex()];
        if let Some(hint) = relay_hint {
            fields.push(hint.to_string());
        }
        Self(fields)
    }

    /// Tag name (first element).
    pub fn name(&self) -> &str {
        self.0.first().map_or("", String::as_str)
    }

    /// Primary value (second element).
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// All elements including the name.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Referenced public key, if this is a well-formed `p` tag.
    pub fn as_public_key(&self) -> Option<PublicKey> {
        if self.name() != PUBLIC_KEY_TAG {
            return None;
        }
        self.value().and_then(|hex| PublicKey::from_hex(hex).ok())
    }

    /// Relay hint of a `p` tag.
    pub fn relay_hint(&self) -> Option<&str> {
        if self.name() != PUBLIC_KEY_TAG {
            return None;
        }
        self.0.get(2).map(String::as_str)
    }
}
