//! Invariant checking for wire-visible envelope state.
//!
//! Invariants are properties that must hold for every batch of gift wraps,
//! whatever the seed, recipient list or message. Example-based tests pin
//! one scenario; invariants are run against many.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = WireSnapshot::capture(sender, env.now(), &config, &results);
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{BackdatedTimestamps, EphemeralAuthorship, SingleRecipientTag, WellFormedWraps};
pub use snapshot::WireSnapshot;
use tracing::warn;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property checked against a [`WireSnapshot`].
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the snapshot.
    fn check(&self, state: &WireSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Registry with every standard wire invariant:
    ///
    /// - [`WellFormedWraps`]: kind 1059, valid id and signature
    /// - [`SingleRecipientTag`]: exactly one `p` tag
    /// - [`EphemeralAuthorship`]: sender never signs, keys never repeat
    /// - [`BackdatedTimestamps`]: inside the window, never repeat
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(WellFormedWraps);
        registry.add(SingleRecipientTag);
        registry.add(EphemeralAuthorship);
        registry.add(BackdatedTimestamps);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants, collecting every violation.
    pub fn check_all(&self, state: &WireSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        for violation in &violations {
            warn!(invariant = violation.invariant, message = %violation.message, "violation");
        }

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation.
    #[allow(clippy::panic, reason = "test assertion helper")]
    pub fn assert_all(&self, state: &WireSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
