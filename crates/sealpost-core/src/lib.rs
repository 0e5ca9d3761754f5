//! Sealpost Envelope Engines
//!
//! Builds and opens the two outer layers of the envelope pipeline. A caller
//! builds a [`sealpost_proto::Rumor`]; [`SealEngine`] encrypts it to one
//! recipient under the real sender's identity; [`GiftWrapEngine`] hides the
//! seal behind a single-use key and a randomized timestamp.
//!
//! ```text
//! Rumor (unsigned, real author)
//!   │  SealEngine::seal          Signer: sender identity
//!   ▼
//! Seal (kind 13, no tags, signed by sender)
//!   │  GiftWrapEngine::wrap_many  fresh ephemeral key per recipient
//!   ▼
//! GiftWrap (kind 1059, ["p", recipient], backdated)
//! ```
//!
//! # Environment
//!
//! Engines never touch the OS directly. Randomness (ephemeral keys, payload
//! nonces, signature aux data, timestamp offsets) and the wall clock come from
//! an [`Environment`]: [`SystemEnv`] in production, a seeded simulation in
//! tests.
//!
//! # Identity
//!
//! The real sender and the receiving identity are represented by a
//! [`Signer`]. Ephemeral keys are the only raw key material the engines
//! handle themselves.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod env;
pub mod error;
pub mod gift_wrap;
pub mod seal;
pub mod signer;
pub mod system_env;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_MAX_BACKDATE_SECS, WrapConfig};
pub use env::Environment;
pub use error::{GiftWrapError, SealError, SignerError};
pub use gift_wrap::{GiftWrapEngine, GiftWrapResult, Recipient, UnwrappedGift};
pub use seal::{SealEngine, validate_seal};
pub use signer::{LocalSigner, Signer};
pub use system_env::SystemEnv;
