//! Sealpost wire records
//!
//! Typed, validating representations of the JSON records exchanged with
//! relays: signed [`Event`]s (seals, gift wraps) and unsigned [`Rumor`]s
//! (the inner messages).
//!
//! # Layering
//!
//! ```text
//! Rumor     unsigned, id optional      never published
//! Seal      Event, kind 13, no tags    signed by the real author
//! GiftWrap  Event, kind 1059, one "p"  signed by a single-use key
//! ```
//!
//! # Parsing
//!
//! All parsing fails closed: a record with a missing or mistyped field, a
//! malformed hex value or an invalid curve point is rejected outright. Field
//! access never guesses.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod event;
pub mod rumor;
pub mod tag;
pub mod types;

pub use errors::{ProtocolError, Result};
pub use event::{Event, UnsignedEvent};
pub use rumor::Rumor;
pub use tag::{PUBLIC_KEY_TAG, Tag};
pub use types::{EventId, Kind, Signature, Timestamp};
