//! Fuzz target for plaintext padding
//!
//! # Invariants
//!
//! - `pad` output length is `2 + padded_len(len)`
//! - `unpad(pad(x)) == x`
//! - `unpad` never panics on arbitrary buffers

#![no_main]

use libfuzzer_sys::fuzz_target;
use sealpost_crypto::{pad, padded_len, unpad};

fuzz_target!(|data: &[u8]| {
    let _ = unpad(data);

    let Ok(padded) = pad(data) else {
        assert!(data.len() > usize::from(u16::MAX));
        return;
    };
    let Ok(expected) = padded_len(data.len()) else {
        panic!("pad accepted a length padded_len rejects");
    };
    assert_eq!(padded.len(), 2 + expected);
    assert_eq!(unpad(&padded), Ok(data));
});
