//! Error types for the envelope engines.
//!
//! Build-side errors are typed and carry context so callers can fix their
//! input. Receive-side failures collapse into [`GiftWrapError::UnwrapFailed`]:
//! malformed or hostile wire events are expected and are simply dropped.

use thiserror::Error;

/// Errors from a [`crate::Signer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The key custodian does not offer this operation
    #[error("signer does not support {operation}")]
    Unsupported {
        /// Operation that was requested
        operation: &'static str,
    },

    /// The key custodian refused the request (e.g. user declined)
    #[error("signer rejected request: {reason}")]
    Rejected {
        /// Custodian-provided reason
        reason: String,
    },

    /// Signing failed
    #[error("signing failed: {reason}")]
    Signing {
        /// Why signing failed
        reason: String,
    },

    /// Encryption failed (e.g. plaintext too long)
    #[error("encryption failed: {reason}")]
    Encryption {
        /// Why encryption failed
        reason: String,
    },

    /// Payload did not decrypt. Deliberately carries no reason.
    #[error("decryption failed")]
    DecryptionFailed,
}

impl SignerError {
    /// Returns true if retrying the same request may succeed.
    ///
    /// Only a custodian refusal is worth retrying (the user may approve the
    /// next prompt). Everything else is deterministic.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Errors from [`crate::SealEngine`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealError {
    /// Record is not a seal
    #[error("expected seal kind 13, got {kind}")]
    InvalidKind {
        /// Kind found on the record
        kind: u16,
    },

    /// Seal carries tags (metadata leak)
    #[error("seal must have no tags, found {count}")]
    NonEmptyTags {
        /// Number of tags found
        count: usize,
    },

    /// Seal id or signature does not verify
    #[error("seal id or signature is invalid")]
    InvalidSignature,

    /// Seal content did not decrypt under the conversation key
    #[error("seal content failed to decrypt")]
    DecryptionFailed,

    /// Decrypted content is not a well-formed rumor
    #[error("malformed rumor: {reason}")]
    MalformedRumor {
        /// Parser diagnostic
        reason: String,
    },

    /// Rumor author differs from the seal signer (or the sealing key)
    #[error("rumor author {rumor} does not match seal author {seal}")]
    SenderMismatch {
        /// Pubkey claimed by the rumor
        rumor: String,
        /// Pubkey of the seal (or of the sealing signer)
        seal: String,
    },

    /// Signer failed while sealing or unsealing
    #[error(transparent)]
    Signer(#[from] SignerError),
}

impl SealError {
    /// Returns true if the seal itself is structurally wrong, as opposed to
    /// failing a cryptographic check.
    ///
    /// Structural errors are detected without any decryption.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::InvalidKind { .. } | Self::NonEmptyTags { .. })
    }
}

/// Errors from [`crate::GiftWrapEngine`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GiftWrapError {
    /// Seal fails structural validation
    #[error("invalid seal: {reason}")]
    InvalidSeal {
        /// Which check failed
        reason: String,
    },

    /// Recipient pubkey or relay hint is malformed
    #[error("invalid recipient: {reason}")]
    InvalidRecipient {
        /// Which check failed
        reason: String,
    },

    /// `wrap_many` called with an empty recipient list
    #[error("no recipients")]
    NoRecipients,

    /// A lower layer failed while building the gift wrap
    #[error("gift wrap creation failed: {reason}")]
    GiftWrapCreationFailed {
        /// Lower-layer diagnostic
        reason: String,
    },

    /// Incoming gift wrap could not be opened. Deliberately carries no
    /// reason; the cause is logged at debug level.
    #[error("unwrap failed")]
    UnwrapFailed,
}

impl GiftWrapError {
    /// Returns true if the caller can fix this by changing its input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSeal { .. } | Self::InvalidRecipient { .. } | Self::NoRecipients
        )
    }
}
