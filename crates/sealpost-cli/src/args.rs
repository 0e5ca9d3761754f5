//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use sealpost_core::{DEFAULT_MAX_BACKDATE_SECS, WrapConfig};

/// Sealpost envelope tool
#[derive(Parser, Debug)]
#[command(name = "sealpost")]
#[command(about = "Encrypt payloads and seal, gift wrap and open private messages")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Hex secret key of the local identity
    #[arg(long, global = true, env = "SEALPOST_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a key pair, printed as JSON
    Keygen,

    /// Print the public key of the local identity
    Pubkey,

    /// Print the conversation key shared with a peer
    ConversationKey {
        /// Peer public key (hex)
        #[arg(long)]
        peer: String,
    },

    /// Encrypt a message to a peer
    Encrypt {
        /// Peer public key (hex)
        #[arg(long)]
        peer: String,

        /// Fixed 32-byte nonce (hex), for reproducing reference vectors
        #[arg(long)]
        nonce: Option<String>,

        /// Plaintext; read from stdin when absent
        message: Option<String>,
    },

    /// Decrypt a payload from a peer
    Decrypt {
        /// Peer public key (hex)
        #[arg(long)]
        peer: String,

        /// Base64 payload; read from stdin when absent
        payload: Option<String>,
    },

    /// Seal and gift wrap a direct message, one JSON event per recipient
    Wrap(WrapArgs),

    /// Open gift wraps read from stdin (one JSON event per line)
    Unwrap,
}

/// Arguments of `sealpost wrap`.
#[derive(Args, Debug)]
pub struct WrapArgs {
    /// Recipient public key (hex); repeat for several recipients
    #[arg(long = "to", required = true)]
    pub recipients: Vec<String>,

    /// Relay hint attached to every recipient tag
    #[arg(long)]
    pub relay_hint: Option<String>,

    /// Also wrap a copy addressed to the sender
    #[arg(long)]
    pub copy_to_self: bool,

    /// Gift wrap timestamps are backdated by up to this many seconds
    #[arg(long, default_value_t = DEFAULT_MAX_BACKDATE_SECS)]
    pub max_backdate_secs: u64,

    /// Backdate seal timestamps as well
    #[arg(long)]
    pub randomize_seal_timestamp: bool,

    /// Message text; read from stdin when absent
    pub message: Option<String>,
}

impl WrapArgs {
    /// Engine configuration selected by the flags.
    pub fn config(&self) -> WrapConfig {
        WrapConfig::default()
            .with_max_backdate_secs(self.max_backdate_secs)
            .with_randomized_seal_timestamp(self.randomize_seal_timestamp)
    }
}
