//! Sealpost command-line tool.
//!
//! Thin shell over `sealpost-core`: every subcommand reads its input from a
//! reader, writes one record per line to a writer and logs through
//! `tracing`. The binary wires these to stdin, stdout and stderr.
//!
//! ```bash
//! sealpost keygen
//! sealpost wrap --secret-key $ALICE --to $BOB "hello" > wraps.jsonl
//! sealpost unwrap --secret-key $BOB < wraps.jsonl
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod args;
pub mod commands;
pub mod error;

pub use args::{Cli, Command, WrapArgs};
pub use commands::run;
pub use error::CliError;
