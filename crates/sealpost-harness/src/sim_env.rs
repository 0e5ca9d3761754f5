//! Seeded simulation environment.
//!
//! Every random draw (ephemeral keys, payload nonces, signature aux data,
//! backdating offsets) comes from one ChaCha20 stream, and the clock only
//! moves when a test moves it. Two engines built from environments with the
//! same seed produce byte-identical wire records.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sealpost_core::Environment;

/// Clock value a fresh [`SimEnv`] starts at (2023-11-14 22:13:20 UTC).
pub const SIM_EPOCH_SECS: u64 = 1_700_000_000;

#[derive(Debug)]
struct SimState {
    rng: ChaCha20Rng,
    now_secs: u64,
}

/// Deterministic [`Environment`] for tests.
///
/// Clones share the RNG stream and the clock.
#[derive(Debug, Clone)]
pub struct SimEnv {
    state: Arc<Mutex<SimState>>,
}

impl SimEnv {
    /// Environment seeded with `seed`, clock at [`SIM_EPOCH_SECS`].
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                rng: ChaCha20Rng::seed_from_u64(seed),
                now_secs: SIM_EPOCH_SECS,
            })),
        }
    }

    /// Set the wall clock.
    pub fn set_time(&self, secs: u64) {
        self.lock().now_secs = secs;
    }

    /// Move the wall clock forward.
    pub fn advance(&self, secs: u64) {
        let mut state = self.lock();
        state.now_secs = state.now_secs.saturating_add(secs);
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // A panicking test thread cannot leave the state half-updated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Environment for SimEnv {
    fn wall_clock_secs(&self) -> u64 {
        self.lock().now_secs
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}
