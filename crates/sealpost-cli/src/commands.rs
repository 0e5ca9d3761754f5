//! Subcommand implementations.
//!
//! Commands read from a caller-supplied input and write results to a
//! caller-supplied output, one record per line. Diagnostics go through
//! `tracing` and never to the output.

use std::io::{BufRead, Write};

use sealpost_core::{
    Environment, GiftWrapEngine, LocalSigner, Recipient, Signer, UnwrappedGift, WrapConfig,
};
use sealpost_crypto::{ConversationKey, Keys, NONCE_SIZE, PublicKey, payload};
use sealpost_proto::{Event, Kind, Rumor, Tag};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    args::{Cli, Command, WrapArgs},
    error::CliError,
};

#[derive(Serialize)]
struct GeneratedKeys {
    secret_key: String,
    public_key: String,
}

#[derive(Serialize)]
struct OpenedMessage<'a> {
    sender: &'a PublicKey,
    rumor: &'a Rumor,
}

/// Run one invocation.
pub fn run<E: Environment>(
    cli: Cli,
    env: &E,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let secret = cli.secret_key.as_deref();

    match cli.command {
        Command::Keygen => keygen(env, output),
        Command::Pubkey => {
            let keys = identity(secret)?;
            writeln!(output, "{}", keys.public_key())?;
            Ok(())
        },
        Command::ConversationKey { peer } => {
            let keys = identity(secret)?;
            let peer = PublicKey::from_hex(&peer)?;
            let conversation_key = ConversationKey::derive(keys.secret_key(), &peer);
            writeln!(output, "{}", hex::encode(conversation_key.as_bytes()))?;
            Ok(())
        },
        Command::Encrypt { peer, nonce, message } => {
            let keys = identity(secret)?;
            let message = message_or_input(message, input)?;
            encrypt(env, &keys, &peer, nonce.as_deref(), &message, output)
        },
        Command::Decrypt { peer, payload } => {
            let keys = identity(secret)?;
            let payload = match payload {
                Some(payload) => payload,
                None => read_all(input)?.trim().to_string(),
            };
            let peer = PublicKey::from_hex(&peer)?;
            let conversation_key = ConversationKey::derive(keys.secret_key(), &peer);
            let plaintext = payload::decrypt(&payload, &conversation_key)?;
            writeln!(output, "{plaintext}")?;
            Ok(())
        },
        Command::Wrap(args) => {
            let keys = identity(secret)?;
            let message = message_or_input(args.message.clone(), input)?;
            wrap(env, keys, &args, &message, output)
        },
        Command::Unwrap => unwrap(env, identity(secret)?, input, output),
    }
}

fn identity(secret: Option<&str>) -> Result<Keys, CliError> {
    let secret = secret.ok_or(CliError::MissingSecretKey)?;
    Ok(Keys::parse(secret.trim())?)
}

fn keygen(env: &impl Environment, output: &mut impl Write) -> Result<(), CliError> {
    let keys = Keys::generate(|buf| env.random_bytes(buf))?;
    let generated = GeneratedKeys {
        secret_key: keys.secret_key().to_secret_hex(),
        public_key: keys.public_key().to_hex(),
    };
    writeln!(output, "{}", serde_json::to_string(&generated)?)?;
    Ok(())
}

fn encrypt(
    env: &impl Environment,
    keys: &Keys,
    peer: &str,
    nonce: Option<&str>,
    message: &str,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let peer = PublicKey::from_hex(peer)?;
    let conversation_key = ConversationKey::derive(keys.secret_key(), &peer);

    let encrypted = match nonce {
        Some(hex_nonce) => {
            let nonce = parse_nonce(hex_nonce)?;
            payload::encrypt_with_nonce(message, &conversation_key, nonce)?
        },
        None => payload::encrypt(message, &conversation_key, |buf| env.random_bytes(buf))?,
    };

    writeln!(output, "{encrypted}")?;
    Ok(())
}

fn parse_nonce(hex_nonce: &str) -> Result<[u8; NONCE_SIZE], CliError> {
    let bytes = hex::decode(hex_nonce.trim())
        .map_err(|e| CliError::InvalidNonce { reason: e.to_string() })?;
    <[u8; NONCE_SIZE]>::try_from(bytes.as_slice()).map_err(|_| CliError::InvalidNonce {
        reason: format!("expected {NONCE_SIZE} bytes, got {}", bytes.len()),
    })
}

/// Seal and wrap `message` for every valid recipient.
///
/// A recipient that fails validation, sealing or wrapping is logged and
/// skipped; the others still receive their wrap. Any skipped recipient
/// turns the final result into `RecipientsFailed`.
fn wrap<E: Environment>(
    env: &E,
    keys: Keys,
    args: &WrapArgs,
    message: &str,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let sender = LocalSigner::new(keys, env.clone());
    let engine = GiftWrapEngine::new(env.clone(), args.config());
    let mut total = args.recipients.len();
    let mut failed = 0usize;

    let mut targets = Vec::with_capacity(total + 1);
    for pubkey in &args.recipients {
        let recipient = match &args.relay_hint {
            Some(hint) => Recipient::new(pubkey.clone()).with_relay_hint(hint.clone()),
            None => Recipient::new(pubkey.clone()),
        };
        match recipient.validate() {
            Ok(key) => targets.push((recipient, key)),
            Err(e) => {
                warn!(recipient = %pubkey, reason = %e, "skipping recipient");
                failed += 1;
            },
        }
    }

    let tags = targets
        .iter()
        .map(|(_, key)| Tag::public_key(key, args.relay_hint.as_deref()))
        .collect();
    let rumor =
        Rumor::new(sender.public_key(), env.now(), Kind::PRIVATE_DIRECT_MESSAGE, tags, message);

    if args.copy_to_self {
        let me = sender.public_key();
        targets.push((Recipient::from_public_key(&me), me));
        total += 1;
    }

    for (target, key) in &targets {
        let wrapped = engine
            .seal_engine()
            .seal(&rumor, &sender, key)
            .map_err(CliError::from)
            .and_then(|seal| {
                engine.wrap_one(&seal, target, None, None).map_err(CliError::from)
            });

        match wrapped {
            Ok(wrapped) => writeln!(output, "{}", wrapped.gift_wrap.as_json())?,
            Err(e) => {
                warn!(recipient = %key, reason = %e, "skipping recipient");
                failed += 1;
            },
        }
    }

    info!(wrapped = total - failed, failed, "wrapped message");
    if failed > 0 {
        return Err(CliError::RecipientsFailed { failed, total });
    }
    Ok(())
}

fn unwrap<E: Environment>(
    env: &E,
    keys: Keys,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let me = LocalSigner::new(keys, env.clone());
    let engine = GiftWrapEngine::new(env.clone(), WrapConfig::default());
    let mut opened = 0usize;
    let mut dropped = 0usize;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match Event::from_json(line) {
            Ok(event) => event,
            Err(e) => {
                debug!(reason = %e, "skipping malformed line");
                dropped += 1;
                continue;
            },
        };

        match engine.unwrap(&event, &me) {
            Ok(Some(UnwrappedGift { sender, rumor })) => {
                let message = OpenedMessage { sender: &sender, rumor: &rumor };
                writeln!(output, "{}", serde_json::to_string(&message)?)?;
                opened += 1;
            },
            Ok(None) => {},
            Err(_) => dropped += 1,
        }
    }

    info!(opened, dropped, "unwrap finished");
    Ok(())
}

fn message_or_input(
    message: Option<String>,
    input: &mut impl BufRead,
) -> Result<String, CliError> {
    match message {
        Some(message) => Ok(message),
        None => {
            let mut text = read_all(input)?;
            if text.ends_with('\n') {
                text.pop();
                if text.ends_with('\r') {
                    text.pop();
                }
            }
            Ok(text)
        },
    }
}

fn read_all(input: &mut impl BufRead) -> Result<String, CliError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    Ok(text)
}
