//! Property-based tests for what the wire reveals.
//!
//! Properties tested:
//! - Two sends of the same message never share an ephemeral key or content
//! - The sender's key never appears in a gift wrap
//! - Any message survives the full seal/wrap/unwrap pipeline
//! - `wrap_many` batches satisfy every standard wire invariant

use proptest::prelude::*;
use sealpost_core::{Environment, Recipient, Signer, WrapConfig};
use sealpost_harness::{InvariantRegistry, SimEnv, WireSnapshot, fixtures};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn repeated_sends_are_unlinkable(seed in any::<u64>(), content in ".{0,64}") {
        let env = SimEnv::with_seed(seed);
        let engine = fixtures::engine(&env);
        let alice = fixtures::identity(1, &env);
        let bob = fixtures::keys(2).public_key();
        let rumor = fixtures::direct_message(&alice.public_key(), &[bob], &content, &env);

        let first = fixtures::send(&engine, &alice, &rumor, &[bob]).unwrap().remove(0);
        let second = fixtures::send(&engine, &alice, &rumor, &[bob]).unwrap().remove(0);

        prop_assert_ne!(first.gift_wrap.pubkey, second.gift_wrap.pubkey);
        prop_assert_ne!(&first.gift_wrap.content, &second.gift_wrap.content);
        prop_assert_ne!(first.gift_wrap.id, second.gift_wrap.id);
    }

    #[test]
    fn sender_key_never_on_wire(seed in any::<u64>(), sender in 1u8..=20) {
        let env = SimEnv::with_seed(seed);
        let engine = fixtures::engine(&env);
        let alice = fixtures::identity(sender, &env);
        let bob = fixtures::keys(42).public_key();
        let rumor = fixtures::direct_message(&alice.public_key(), &[bob], "meet at noon", &env);

        let wrap = fixtures::send(&engine, &alice, &rumor, &[bob]).unwrap().remove(0);
        let wire = wrap.gift_wrap.as_json();

        prop_assert!(!wire.contains(&alice.public_key().to_hex()));
        prop_assert!(wire.contains(&bob.to_hex()));
    }

    #[test]
    fn any_message_survives_pipeline(seed in any::<u64>(), content in "\\PC{0,256}") {
        let env = SimEnv::with_seed(seed);
        let engine = fixtures::engine(&env);
        let alice = fixtures::identity(1, &env);
        let bob = fixtures::identity(2, &env);
        let rumor =
            fixtures::direct_message(&alice.public_key(), &[bob.public_key()], &content, &env);

        let wrap = fixtures::send(&engine, &alice, &rumor, &[bob.public_key()]).unwrap().remove(0);
        let gift = engine.unwrap(&wrap.gift_wrap, &bob).unwrap().unwrap();

        prop_assert_eq!(gift.sender, alice.public_key());
        prop_assert_eq!(gift.rumor.content, content);
    }

    #[test]
    fn wrap_many_batches_hold_invariants(seed in any::<u64>(), count in 1usize..=8) {
        let env = SimEnv::with_seed(seed);
        let engine = fixtures::engine(&env);
        let alice = fixtures::identity(1, &env);
        let bob = fixtures::keys(2).public_key();
        let rumor = fixtures::direct_message(&alice.public_key(), &[bob], "batch", &env);
        let seal = engine.seal_engine().seal(&rumor, &alice, &bob).unwrap();
        let recipients = vec![Recipient::from_public_key(&bob); count];

        let results: Vec<_> = engine
            .wrap_many(&seal, &recipients)
            .unwrap()
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        let snapshot =
            WireSnapshot::capture(alice.public_key(), env.now(), &WrapConfig::default(), &results);
        prop_assert!(InvariantRegistry::standard().check_all(&snapshot).is_ok());
    }
}
