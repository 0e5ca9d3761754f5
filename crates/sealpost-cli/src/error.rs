//! CLI error type.

use sealpost_core::{GiftWrapError, SealError};
use sealpost_crypto::{CryptoError, DecryptError};
use thiserror::Error;

/// Errors surfaced by `sealpost` subcommands.
#[derive(Error, Debug)]
pub enum CliError {
    /// No secret key on the command line or in the environment
    #[error("missing secret key: pass --secret-key or set SEALPOST_SECRET_KEY")]
    MissingSecretKey,

    /// Key parsing or generation failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Payload did not decrypt
    #[error("decryption failed: {0}")]
    Decrypt(#[from] DecryptError),

    /// `--nonce` is not 32 bytes of hex
    #[error("invalid nonce: {reason}")]
    InvalidNonce {
        /// Which check failed
        reason: String,
    },

    /// Sealing failed
    #[error(transparent)]
    Seal(#[from] SealError),

    /// Gift wrapping failed
    #[error(transparent)]
    GiftWrap(#[from] GiftWrapError),

    /// Some recipients were skipped; the rest received their wrap
    #[error("{failed} of {total} recipients could not be wrapped")]
    RecipientsFailed {
        /// Recipients skipped
        failed: usize,
        /// Recipients attempted, including the sender's own copy
        total: usize,
    },

    /// Output serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading input or writing output failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns true if the invocation itself was wrong, as opposed to the
    /// data or the environment.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::MissingSecretKey | Self::InvalidNonce { .. })
            || matches!(self, Self::Crypto(e) if e.is_input_error())
            || matches!(self, Self::GiftWrap(e) if e.is_input_error())
    }
}
