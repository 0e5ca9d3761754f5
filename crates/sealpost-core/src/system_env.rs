//! Production Environment implementation using the system clock and OS RNG.

use crate::env::Environment;

/// Production environment using wall-clock time and cryptographic RNG.
///
/// # Security
///
/// The RNG uses getrandom, which reads the OS CSPRNG (e.g., `getrandom(2)` on
/// Linux, `BCryptGenRandom` on Windows). It is safe to share across threads
/// and suitable for payload nonces, ephemeral keys and signature auxiliary
/// randomness.
///
/// # Panics
///
/// Panics if the OS RNG fails. Continuing without functioning randomness
/// would produce predictable nonces and ephemeral keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    #[allow(clippy::expect_used)]
    fn wall_clock_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)")
            .as_secs()
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot encrypt securely");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_clock_is_recent() {
        // 2023-11-14, well before any machine running these tests
        assert!(SystemEnv::new().wall_clock_secs() > 1_700_000_000);
    }

    #[test]
    fn system_env_backdating_stays_in_window() {
        let env = SystemEnv::new();
        let window = 2 * 24 * 60 * 60;

        let now = env.now().as_secs();
        let backdated = env.backdated_now(window).as_secs();

        assert!(backdated <= env.now().as_secs());
        assert!(backdated + window >= now);
    }
}
