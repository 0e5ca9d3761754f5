//! Environment abstraction for deterministic testing.
//!
//! Decouples the envelope engines from system resources (wall clock,
//! randomness). Production uses [`crate::SystemEnv`]; tests use a seeded
//! generator and a settable clock so every nonce, ephemeral key and
//! randomized timestamp is reproducible.

use sealpost_proto::Timestamp;

/// Attempts at unbiased sampling before falling back to a plain modulo.
const MAX_SAMPLING_ATTEMPTS: usize = 64;

/// Abstract environment providing wall-clock time and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production and
///   is safe to call concurrently from several threads
/// - Concurrent callers never observe the same random output
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion, incorrect simulation setup)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Seconds since the Unix epoch.
    fn wall_clock_secs(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Uniform random value in `0..=max`.
    ///
    /// Rejection sampling removes modulo bias. A source that keeps producing
    /// rejected values (only possible with a broken test RNG) degrades to a
    /// plain modulo instead of looping forever.
    fn random_u64_inclusive(&self, max: u64) -> u64 {
        if max == u64::MAX {
            return self.random_u64();
        }

        let range = max + 1;
        let threshold = range.wrapping_neg() % range;

        let mut candidate = self.random_u64();
        for _ in 1..MAX_SAMPLING_ATTEMPTS {
            if candidate >= threshold {
                break;
            }
            candidate = self.random_u64();
        }
        candidate % range
    }

    /// Current wall-clock time.
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.wall_clock_secs())
    }

    /// Current time moved back by a uniform random offset in
    /// `0..=max_backdate_secs`.
    fn backdated_now(&self, max_backdate_secs: u64) -> Timestamp {
        self.now().saturating_sub(self.random_u64_inclusive(max_backdate_secs))
    }
}
