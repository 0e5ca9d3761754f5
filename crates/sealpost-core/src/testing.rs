//! Deterministic environment shared by unit tests.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use sealpost_crypto::{Keys, SecretKey};

use crate::env::Environment;

/// Fixed clock used by [`TestEnv`]
pub const TEST_NOW: u64 = 1_700_000_000;

/// SplitMix64 stream over an atomic counter. Clones share the stream.
#[derive(Debug, Clone)]
pub struct TestEnv {
    state: Arc<AtomicU64>,
    now: u64,
}

impl TestEnv {
    pub fn new(seed: u64) -> Self {
        Self { state: Arc::new(AtomicU64::new(seed)), now: TEST_NOW }
    }

    fn next(&self) -> u64 {
        let mut z = self
            .state
            .fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::SeqCst)
            .wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl Environment for TestEnv {
    fn wall_clock_secs(&self) -> u64 {
        self.now
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        for chunk in buffer.chunks_mut(8) {
            let bytes = self.next().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Key pair with secret scalar `00..00 last`.
pub fn keys(last: u8) -> Keys {
    let mut bytes = [0u8; 32];
    bytes[31] = last;
    let Ok(secret) = SecretKey::from_slice(&bytes) else {
        unreachable!("small non-zero scalars are valid");
    };
    Keys::new(secret)
}
