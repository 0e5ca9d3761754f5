//! Deterministic test harness for the Sealpost envelope pipeline.
//!
//! [`SimEnv`] implements the engine [`sealpost_core::Environment`] over a
//! seeded ChaCha20 stream and a settable clock, so every ephemeral key, nonce
//! and randomized timestamp is reproducible from a seed.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks what a relay observer can see. Capture a
//! batch of gift wraps in a [`WireSnapshot`] and run
//! [`InvariantRegistry::standard()`] against it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod invariants;
pub mod sim_env;

pub use fixtures::SendError;
pub use invariants::{
    BackdatedTimestamps, EphemeralAuthorship, Invariant, InvariantRegistry, InvariantResult,
    SingleRecipientTag, Violation, WellFormedWraps, WireSnapshot,
};
pub use sim_env::{SIM_EPOCH_SECS, SimEnv};
