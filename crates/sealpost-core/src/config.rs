//! Engine configuration.

/// Default gift wrap backdating window: two days.
pub const DEFAULT_MAX_BACKDATE_SECS: u64 = 2 * 24 * 60 * 60;

/// Timestamp randomization policy shared by the seal and gift wrap engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapConfig {
    /// Gift wrap `created_at` is `now - uniform(0..=max_backdate_secs)`.
    pub max_backdate_secs: u64,
    /// Also backdate the seal's `created_at` with the same window. When
    /// false, seals carry the current time.
    pub randomize_seal_timestamp: bool,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self { max_backdate_secs: DEFAULT_MAX_BACKDATE_SECS, randomize_seal_timestamp: false }
    }
}

impl WrapConfig {
    /// Set the backdating window.
    #[must_use]
    pub fn with_max_backdate_secs(mut self, secs: u64) -> Self {
        self.max_backdate_secs = secs;
        self
    }

    /// Enable or disable seal timestamp randomization.
    #[must_use]
    pub fn with_randomized_seal_timestamp(mut self, enabled: bool) -> Self {
        self.randomize_seal_timestamp = enabled;
        self
    }
}
