//! Snapshot of what a relay stores for one gift wrap.

use sealpost_core::{Recipient, Signer};
use sealpost_harness::{SimEnv, fixtures};

#[test]
fn gift_wrap_wire_shape() {
    let env = SimEnv::with_seed(8);
    let engine = fixtures::engine(&env);
    let alice = fixtures::identity(1, &env);
    let bob = fixtures::keys(2).public_key();
    let rumor = fixtures::direct_message(&alice.public_key(), &[bob], "hello", &env);
    let seal = engine.seal_engine().seal(&rumor, &alice, &bob).unwrap();
    let recipient = Recipient::from_public_key(&bob).with_relay_hint("wss://relay.example.com");

    let wrap = engine.wrap_one(&seal, &recipient, None, None).unwrap().gift_wrap;
    let value: serde_json::Value = serde_json::from_str(&wrap.as_json()).unwrap();

    insta::assert_json_snapshot!(value, {
        ".id" => "[id]",
        ".pubkey" => "[ephemeral]",
        ".created_at" => "[backdated]",
        ".content" => "[payload]",
        ".sig" => "[sig]",
    }, @r#"
    {
      "content": "[payload]",
      "created_at": "[backdated]",
      "id": "[id]",
      "kind": 1059,
      "pubkey": "[ephemeral]",
      "sig": "[sig]",
      "tags": [
        [
          "p",
          "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
          "wss://relay.example.com"
        ]
      ]
    }
    "#);
}

#[test]
fn seal_wire_shape() {
    let env = SimEnv::with_seed(9);
    let engine = fixtures::engine(&env);
    let alice = fixtures::identity(1, &env);
    let bob = fixtures::keys(2).public_key();
    let rumor = fixtures::direct_message(&alice.public_key(), &[bob], "hello", &env);

    let seal = engine.seal_engine().seal(&rumor, &alice, &bob).unwrap();
    let value: serde_json::Value = serde_json::from_str(&seal.as_json()).unwrap();

    insta::assert_json_snapshot!(value, {
        ".id" => "[id]",
        ".content" => "[payload]",
        ".sig" => "[sig]",
    }, @r#"
    {
      "content": "[payload]",
      "created_at": 1700000000,
      "id": "[id]",
      "kind": 13,
      "pubkey": "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
      "sig": "[sig]",
      "tags": []
    }
    "#);
}
