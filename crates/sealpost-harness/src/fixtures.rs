//! Identities and messages for scenario tests.

use sealpost_core::{
    Environment, GiftWrapEngine, GiftWrapError, GiftWrapResult, LocalSigner, Recipient,
    SealError, Signer, WrapConfig,
};
use sealpost_crypto::{Keys, PublicKey, SecretKey};
use sealpost_proto::{Kind, Rumor, Tag};

use crate::SimEnv;

/// Key pair whose secret scalar is `n` (big-endian, zero-extended).
///
/// `keys(1)` and `keys(2)` are the identities used by the published NIP-44
/// vectors.
///
/// # Panics
///
/// If `n` is zero, which is not a valid scalar.
pub fn keys(n: u8) -> Keys {
    assert_ne!(n, 0, "scalar 0 is not a valid secret key");
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    let Ok(secret) = SecretKey::from_slice(&bytes) else {
        unreachable!("1..=255 are valid scalars");
    };
    Keys::new(secret)
}

/// Local signer for `keys(n)` drawing randomness from `env`.
pub fn identity(n: u8, env: &SimEnv) -> LocalSigner<SimEnv> {
    LocalSigner::new(keys(n), env.clone())
}

/// Kind 14 rumor from `author` tagging every recipient, dated now.
pub fn direct_message(
    author: &PublicKey,
    recipients: &[PublicKey],
    content: &str,
    env: &impl Environment,
) -> Rumor {
    let tags = recipients.iter().map(|pk| Tag::public_key(pk, None)).collect();
    Rumor::new(*author, env.now(), Kind::PRIVATE_DIRECT_MESSAGE, tags, content)
}

/// Failure anywhere on the send path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// Sealing failed
    Seal(SealError),
    /// Wrapping failed for the whole batch
    Wrap(GiftWrapError),
}

/// Seal `rumor` once per recipient and wrap each seal for its recipient.
///
/// Each recipient gets its own seal since the seal content is encrypted to
/// exactly one key.
pub fn send(
    engine: &GiftWrapEngine<SimEnv>,
    sender: &impl Signer,
    rumor: &Rumor,
    recipients: &[PublicKey],
) -> Result<Vec<GiftWrapResult>, SendError> {
    recipients
        .iter()
        .map(|recipient| -> Result<GiftWrapResult, SendError> {
            let seal =
                engine.seal_engine().seal(rumor, sender, recipient).map_err(SendError::Seal)?;
            engine
                .wrap_one(&seal, &Recipient::from_public_key(recipient), None, None)
                .map_err(SendError::Wrap)
        })
        .collect()
}

/// Engine over `env` with the default configuration.
pub fn engine(env: &SimEnv) -> GiftWrapEngine<SimEnv> {
    GiftWrapEngine::new(env.clone(), WrapConfig::default())
}
