//! Wire-visible state for invariant checking.
//!
//! A snapshot holds exactly what a relay observer sees after a send, plus
//! the ground truth (sender, clock, window) the invariants compare against.

use sealpost_core::{GiftWrapResult, WrapConfig};
use sealpost_crypto::PublicKey;
use sealpost_proto::{Event, Timestamp};

/// Gift wraps produced by one send, with the context needed to judge them.
#[derive(Debug, Clone)]
pub struct WireSnapshot {
    /// Real sender of the batch.
    pub sender: PublicKey,
    /// Clock reading when the batch was built.
    pub now: Timestamp,
    /// Backdating window in effect.
    pub max_backdate_secs: u64,
    /// Published records, in recipient order.
    pub wraps: Vec<Event>,
}

impl WireSnapshot {
    /// Snapshot with no wraps.
    pub fn empty(sender: PublicKey, now: Timestamp, config: &WrapConfig) -> Self {
        Self { sender, now, max_backdate_secs: config.max_backdate_secs, wraps: Vec::new() }
    }

    /// Capture the wire records of a batch.
    pub fn capture(
        sender: PublicKey,
        now: Timestamp,
        config: &WrapConfig,
        results: &[GiftWrapResult],
    ) -> Self {
        let mut snapshot = Self::empty(sender, now, config);
        snapshot.wraps.extend(results.iter().map(|r| r.gift_wrap.clone()));
        snapshot
    }

    /// Add a wire record.
    pub fn add_wrap(&mut self, wrap: Event) {
        self.wraps.push(wrap);
    }
}
