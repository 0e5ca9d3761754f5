//! Fuzz target for gift wrap opening
//!
//! Parses arbitrary JSON as an event and runs it through `unwrap` for a
//! fixed recipient. A second mode re-tags the event so that every input
//! reaches signature verification and decryption.
//!
//! # Invariants
//!
//! - Parsing and unwrapping never panic
//! - Unwrapping a forged event never yields a message

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sealpost_core::{GiftWrapError, Signer};
use sealpost_harness::{SimEnv, fixtures};
use sealpost_proto::{Event, Tag};

#[derive(Debug, Arbitrary)]
struct Input {
    json: String,
    retag: bool,
}

fuzz_target!(|input: Input| {
    let Ok(mut event) = Event::from_json(&input.json) else {
        return;
    };

    let env = SimEnv::default();
    let engine = fixtures::engine(&env);
    let bob = fixtures::identity(2, &env);

    if input.retag {
        event.tags.push(Tag::public_key(&bob.public_key(), None));
    }

    match engine.unwrap(&event, &bob) {
        Ok(None) | Err(GiftWrapError::UnwrapFailed) => {},
        Ok(Some(gift)) => panic!("forged event opened: {gift:?}"),
        Err(other) => panic!("unexpected error kind: {other}"),
    }
});
