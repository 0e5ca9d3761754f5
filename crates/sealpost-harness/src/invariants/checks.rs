//! Standard invariant checks.
//!
//! These capture what a relay observer must never learn from a batch of
//! gift wraps.

use std::collections::{HashMap, HashSet};

use sealpost_proto::{Kind, PUBLIC_KEY_TAG};

use super::{Invariant, InvariantResult, Violation, WireSnapshot};

/// Every wrap is a kind 1059 record with a valid id and signature.
pub struct WellFormedWraps;

impl Invariant for WellFormedWraps {
    fn name(&self) -> &'static str {
        "well_formed_wraps"
    }

    fn check(&self, state: &WireSnapshot) -> InvariantResult {
        for (index, wrap) in state.wraps.iter().enumerate() {
            if wrap.kind != Kind::GIFT_WRAP {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("wrap {index}: kind {} instead of 1059", wrap.kind),
                });
            }
            if let Err(e) = wrap.verify() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("wrap {index}: {e}"),
                });
            }
        }
        Ok(())
    }
}

/// Every wrap carries exactly one tag, a `p` tag naming a valid key.
pub struct SingleRecipientTag;

impl Invariant for SingleRecipientTag {
    fn name(&self) -> &'static str {
        "single_recipient_tag"
    }

    fn check(&self, state: &WireSnapshot) -> InvariantResult {
        for (index, wrap) in state.wraps.iter().enumerate() {
            let [tag] = wrap.tags.as_slice() else {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("wrap {index}: {} tags", wrap.tags.len()),
                });
            };
            if tag.name() != PUBLIC_KEY_TAG || tag.as_public_key().is_none() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("wrap {index}: unexpected tag {:?}", tag.as_slice()),
                });
            }
        }
        Ok(())
    }
}

/// The real sender never signs a wrap, and no ephemeral key signs two.
pub struct EphemeralAuthorship;

impl Invariant for EphemeralAuthorship {
    fn name(&self) -> &'static str {
        "ephemeral_authorship"
    }

    fn check(&self, state: &WireSnapshot) -> InvariantResult {
        let mut seen = HashMap::with_capacity(state.wraps.len());
        for (index, wrap) in state.wraps.iter().enumerate() {
            if wrap.pubkey == state.sender {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("wrap {index}: signed by the real sender"),
                });
            }
            if let Some(first) = seen.insert(wrap.pubkey, index) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("wraps {first} and {index}: same ephemeral key"),
                });
            }
        }
        Ok(())
    }
}

/// Wrap timestamps lie in `[now - window, now]` and never repeat.
pub struct BackdatedTimestamps;

impl Invariant for BackdatedTimestamps {
    fn name(&self) -> &'static str {
        "backdated_timestamps"
    }

    fn check(&self, state: &WireSnapshot) -> InvariantResult {
        let earliest = state.now.saturating_sub(state.max_backdate_secs);
        let mut seen = HashSet::with_capacity(state.wraps.len());

        for (index, wrap) in state.wraps.iter().enumerate() {
            if wrap.created_at > state.now || wrap.created_at < earliest {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "wrap {index}: created_at {} outside [{earliest}, {}]",
                        wrap.created_at, state.now
                    ),
                });
            }
            if !seen.insert(wrap.created_at) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("wrap {index}: created_at {} repeats", wrap.created_at),
                });
            }
        }
        Ok(())
    }
}
