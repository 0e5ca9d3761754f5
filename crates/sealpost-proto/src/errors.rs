//! Error types for wire record parsing and verification.

use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from parsing, building or verifying wire records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// JSON is not a well-formed record of the expected type
    #[error("malformed {record}: {reason}")]
    Malformed {
        /// Record type being parsed
        record: &'static str,
        /// Parser diagnostic
        reason: String,
    },

    /// Fixed-size hex field has the wrong length or alphabet
    #[error("invalid {field}: {reason}")]
    InvalidHex {
        /// Field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Declared id does not match the canonical id of the record
    #[error("id mismatch: declared {declared}, computed {computed}")]
    IdMismatch {
        /// Id carried by the record
        declared: String,
        /// Id computed from the record fields
        computed: String,
    },

    /// Schnorr signature does not verify against the id and pubkey
    #[error("invalid signature")]
    InvalidSignature,

    /// Signing key does not own the record's pubkey
    #[error("record pubkey {record} does not match signing key {signer}")]
    KeyMismatch {
        /// Pubkey carried by the record
        record: String,
        /// Pubkey of the signing key
        signer: String,
    },
}

impl ProtocolError {
    /// Returns true if the record was well-formed but failed an integrity
    /// check (id or signature).
    ///
    /// Integrity failures indicate tampering or a broken signer rather than a
    /// parsing problem.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::IdMismatch { .. } | Self::InvalidSignature)
    }
}
