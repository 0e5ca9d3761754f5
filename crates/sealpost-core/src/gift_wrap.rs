//! Gift wrap construction and opening.
//!
//! The gift wrap is the outer, publicly visible layer. Each recipient gets
//! a wrap signed by a single-use ephemeral key with a backdated timestamp, so
//! the wire record reveals the recipient and nothing about the sender or the
//! real send time.
//!
//! # Invariants
//!
//! - Every wrap is signed by a fresh ephemeral key, never the sender's key
//! - A wrap carries exactly one `p` tag
//! - Within one `wrap_many` call no ephemeral key or timestamp repeats
//! - Receive-side failures never reveal which check failed

use std::{collections::HashSet, fmt};

use sealpost_crypto::{ConversationKey, Keys, PublicKey, payload};
use sealpost_proto::{Event, Kind, ProtocolError, Rumor, Tag, Timestamp, UnsignedEvent};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    config::WrapConfig,
    env::Environment,
    error::{GiftWrapError, SealError, SignerError},
    seal::{SealEngine, validate_seal},
    signer::Signer,
};

/// Draws per recipient before `wrap_many` gives up on finding an unused
/// ephemeral key or timestamp.
const MAX_REDRAWS: usize = 16;

/// Hex characters in an x-only public key.
const PUBLIC_KEY_HEX_LEN: usize = 64;

/// A gift wrap destination as supplied by the caller.
///
/// Validated by [`Recipient::validate`] before any cryptography runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Hex x-only public key
    pub pubkey: String,
    /// Optional relay URL included in the `p` tag
    pub relay_hint: Option<String>,
}

impl Recipient {
    /// Recipient without a relay hint.
    pub fn new(pubkey: impl Into<String>) -> Self {
        Self { pubkey: pubkey.into(), relay_hint: None }
    }

    /// Recipient from an already parsed key.
    pub fn from_public_key(pubkey: &PublicKey) -> Self {
        Self::new(pubkey.to_hex())
    }

    /// Attach a relay hint.
    #[must_use]
    pub fn with_relay_hint(mut self, relay_hint: impl Into<String>) -> Self {
        self.relay_hint = Some(relay_hint.into());
        self
    }

    /// Check the pubkey and relay hint, returning the parsed key.
    ///
    /// # Errors
    ///
    /// `InvalidRecipient` if the pubkey is not 64 hex characters naming a
    /// curve point, or the relay hint is not a `ws://`/`wss://` URL.
    pub fn validate(&self) -> Result<PublicKey, GiftWrapError> {
        if self.pubkey.len() != PUBLIC_KEY_HEX_LEN
            || !self.pubkey.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(invalid_recipient("pubkey must be 64 hex characters"));
        }
        let pubkey = PublicKey::from_hex(&self.pubkey)
            .map_err(|_| invalid_recipient("pubkey is not a valid curve point"))?;

        if let Some(hint) = &self.relay_hint {
            if hint.is_empty() {
                return Err(invalid_recipient("relay hint is empty"));
            }
            if hint.chars().any(char::is_whitespace) {
                return Err(invalid_recipient("relay hint contains whitespace"));
            }
            let Some(host) = hint.strip_prefix("wss://").or_else(|| hint.strip_prefix("ws://"))
            else {
                return Err(invalid_recipient("relay hint must be a ws:// or wss:// URL"));
            };
            if host.is_empty() {
                return Err(invalid_recipient("relay hint has no host"));
            }
        }

        Ok(pubkey)
    }
}

/// One built gift wrap.
#[derive(Debug, Clone)]
pub struct GiftWrapResult {
    /// Wire record to publish
    pub gift_wrap: Event,
    /// Single-use key that signed the wrap. Callers discard it after
    /// publishing.
    pub ephemeral_keys: Keys,
    /// Recipient the wrap is addressed to
    pub recipient: PublicKey,
}

/// Contents of an opened gift wrap.
///
/// The wrap's own pubkey and timestamp are deliberately absent: they are
/// ephemeral and randomized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappedGift {
    /// Authenticated sender (the seal signer)
    pub sender: PublicKey,
    /// Inner message
    pub rumor: Rumor,
}

/// Reason an incoming gift wrap was dropped. Only ever logged.
#[derive(Error, Debug)]
enum OpenError {
    #[error("expected gift wrap kind 1059, got {kind}")]
    Kind { kind: u16 },

    #[error("outer record failed verification: {source}")]
    Outer { source: ProtocolError },

    #[error("content failed to decrypt: {source}")]
    Decrypt { source: SignerError },

    #[error("content is not a seal record: {source}")]
    SealRecord { source: ProtocolError },

    #[error("seal rejected: {source}")]
    Seal {
        #[from]
        source: SealError,
    },
}

/// Builds and opens gift wraps.
#[derive(Debug, Clone)]
pub struct GiftWrapEngine<E: Environment> {
    env: E,
    config: WrapConfig,
    seals: SealEngine<E>,
}

impl<E: Environment> GiftWrapEngine<E> {
    /// Create an engine. The inner seal engine shares the environment and
    /// configuration.
    pub fn new(env: E, config: WrapConfig) -> Self {
        let seals = SealEngine::new(env.clone(), config);
        Self { env, config, seals }
    }

    /// Seal engine used to open unwrapped seals.
    pub fn seal_engine(&self) -> &SealEngine<E> {
        &self.seals
    }

    /// Wrap `seal` for a single recipient.
    ///
    /// `ephemeral` and `created_at` are drawn from the environment when
    /// absent. Supplying them is meant for reproducible tests.
    ///
    /// # Errors
    ///
    /// - `InvalidSeal`: seal kind is not 13 or it carries tags
    /// - `InvalidRecipient`: malformed pubkey or relay hint
    /// - `GiftWrapCreationFailed`: key generation, encryption or signing failed
    pub fn wrap_one(
        &self,
        seal: &Event,
        recipient: &Recipient,
        ephemeral: Option<Keys>,
        created_at: Option<Timestamp>,
    ) -> Result<GiftWrapResult, GiftWrapError> {
        validate_seal(seal).map_err(|e| GiftWrapError::InvalidSeal { reason: e.to_string() })?;
        let recipient_key = recipient.validate()?;

        let ephemeral_keys = match ephemeral {
            Some(keys) => Keys::from_parts(keys.secret_key().clone(), keys.public_key())
                .map_err(creation_failed)?,
            None => self.generate_ephemeral()?,
        };
        let created_at = created_at
            .unwrap_or_else(|| self.env.backdated_now(self.config.max_backdate_secs));

        self.build(seal, recipient_key, recipient.relay_hint.as_deref(), ephemeral_keys, created_at)
    }

    /// Wrap `seal` once per recipient, in list order.
    ///
    /// A failing recipient is reported in its own slot and does not stop the
    /// others.
    ///
    /// # Errors
    ///
    /// - `NoRecipients`: empty list
    /// - `InvalidSeal`: seal kind is not 13 or it carries tags
    pub fn wrap_many(
        &self,
        seal: &Event,
        recipients: &[Recipient],
    ) -> Result<Vec<Result<GiftWrapResult, GiftWrapError>>, GiftWrapError> {
        if recipients.is_empty() {
            return Err(GiftWrapError::NoRecipients);
        }
        validate_seal(seal).map_err(|e| GiftWrapError::InvalidSeal { reason: e.to_string() })?;

        let mut used_keys = HashSet::with_capacity(recipients.len());
        let mut used_timestamps = HashSet::with_capacity(recipients.len());

        let results = recipients
            .iter()
            .map(|recipient| -> Result<GiftWrapResult, GiftWrapError> {
                let recipient_key = recipient.validate()?;
                let ephemeral_keys = self.draw_unique_ephemeral(&mut used_keys)?;
                let created_at = self.draw_unique_timestamp(&mut used_timestamps)?;

                self.build(
                    seal,
                    recipient_key,
                    recipient.relay_hint.as_deref(),
                    ephemeral_keys,
                    created_at,
                )
            })
            .collect();

        Ok(results)
    }

    /// Open a gift wrap addressed to `me`.
    ///
    /// Returns `Ok(None)` when no `p` tag names `me`.
    ///
    /// # Errors
    ///
    /// `UnwrapFailed` for every other failure. The cause is logged at debug
    /// level and never returned.
    pub fn unwrap(
        &self,
        gift_wrap: &Event,
        me: &impl Signer,
    ) -> Result<Option<UnwrappedGift>, GiftWrapError> {
        let my_key = me.public_key();
        if !gift_wrap.tagged_public_keys().any(|key| key == my_key) {
            return Ok(None);
        }

        match self.open(gift_wrap, me) {
            Ok(gift) => Ok(Some(gift)),
            Err(reason) => {
                debug!(gift_wrap_id = %gift_wrap.id, %reason, "dropping gift wrap");
                Err(GiftWrapError::UnwrapFailed)
            },
        }
    }

    fn open(&self, gift_wrap: &Event, me: &impl Signer) -> Result<UnwrappedGift, OpenError> {
        if gift_wrap.kind != Kind::GIFT_WRAP {
            return Err(OpenError::Kind { kind: gift_wrap.kind.as_u16() });
        }
        gift_wrap.verify().map_err(|source| OpenError::Outer { source })?;

        let seal_json = me
            .decrypt(&gift_wrap.pubkey, &gift_wrap.content)
            .map_err(|source| OpenError::Decrypt { source })?;
        let seal =
            Event::from_json(&seal_json).map_err(|source| OpenError::SealRecord { source })?;

        let rumor = self.seals.unseal(&seal, me)?;

        Ok(UnwrappedGift { sender: seal.pubkey, rumor })
    }

    fn build(
        &self,
        seal: &Event,
        recipient: PublicKey,
        relay_hint: Option<&str>,
        ephemeral_keys: Keys,
        created_at: Timestamp,
    ) -> Result<GiftWrapResult, GiftWrapError> {
        let conversation_key = ConversationKey::derive(ephemeral_keys.secret_key(), &recipient);
        let content = payload::encrypt(&seal.as_json(), &conversation_key, |buf| {
            self.env.random_bytes(buf);
        })
        .map_err(creation_failed)?;

        let mut aux_rand = [0u8; 32];
        self.env.random_bytes(&mut aux_rand);

        let gift_wrap = UnsignedEvent::new(
            ephemeral_keys.public_key(),
            created_at,
            Kind::GIFT_WRAP,
            vec![Tag::public_key(&recipient, relay_hint)],
            content,
        )
        .sign_with_keys(&ephemeral_keys, &aux_rand)
        .map_err(creation_failed)?;

        trace!(gift_wrap_id = %gift_wrap.id, "built gift wrap");
        Ok(GiftWrapResult { gift_wrap, ephemeral_keys, recipient })
    }

    fn generate_ephemeral(&self) -> Result<Keys, GiftWrapError> {
        Keys::generate(|buf| self.env.random_bytes(buf)).map_err(creation_failed)
    }

    fn draw_unique_ephemeral(
        &self,
        used: &mut HashSet<PublicKey>,
    ) -> Result<Keys, GiftWrapError> {
        for _ in 0..MAX_REDRAWS {
            let keys = self.generate_ephemeral()?;
            if used.insert(keys.public_key()) {
                return Ok(keys);
            }
        }
        Err(creation_failed("no unused ephemeral key after redraws"))
    }

    fn draw_unique_timestamp(
        &self,
        used: &mut HashSet<Timestamp>,
    ) -> Result<Timestamp, GiftWrapError> {
        for _ in 0..MAX_REDRAWS {
            let created_at = self.env.backdated_now(self.config.max_backdate_secs);
            if used.insert(created_at) {
                return Ok(created_at);
            }
        }
        Err(creation_failed("no unused timestamp in the backdating window"))
    }
}

fn invalid_recipient(reason: &str) -> GiftWrapError {
    GiftWrapError::InvalidRecipient { reason: reason.to_string() }
}

fn creation_failed(err: impl fmt::Display) -> GiftWrapError {
    GiftWrapError::GiftWrapCreationFailed { reason: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        signer::LocalSigner,
        testing::{TEST_NOW, TestEnv, keys},
    };

    fn engine() -> GiftWrapEngine<TestEnv> {
        GiftWrapEngine::new(TestEnv::new(11), WrapConfig::default())
    }

    fn signer(last: u8) -> LocalSigner<TestEnv> {
        LocalSigner::new(keys(last), TestEnv::new(u64::from(last) << 8))
    }

    fn seal_for(sender: &LocalSigner<TestEnv>, recipient: &PublicKey, content: &str) -> Event {
        let rumor = Rumor::new(
            sender.public_key(),
            Timestamp::from_secs(TEST_NOW),
            Kind::PRIVATE_DIRECT_MESSAGE,
            vec![Tag::public_key(recipient, None)],
            content,
        );
        engine().seal_engine().seal(&rumor, sender, recipient).unwrap()
    }

    #[test]
    fn wrap_one_has_expected_shape() {
        let sender = signer(1);
        let bob = keys(2).public_key();
        let seal = seal_for(&sender, &bob, "hello");

        let result =
            engine().wrap_one(&seal, &Recipient::from_public_key(&bob), None, None).unwrap();
        let wrap = &result.gift_wrap;

        assert_eq!(wrap.kind, Kind::GIFT_WRAP);
        assert_eq!(wrap.tags, vec![Tag::public_key(&bob, None)]);
        assert_eq!(wrap.pubkey, result.ephemeral_keys.public_key());
        assert_ne!(wrap.pubkey, sender.public_key());
        assert_eq!(result.recipient, bob);
        assert!(wrap.created_at.as_secs() <= TEST_NOW);
        assert!(wrap.created_at.as_secs() >= TEST_NOW - WrapConfig::default().max_backdate_secs);
        wrap.verify().unwrap();
    }

    #[test]
    fn wrap_one_honors_supplied_key_and_time() {
        let sender = signer(1);
        let bob = keys(2).public_key();
        let seal = seal_for(&sender, &bob, "hello");
        let ephemeral = keys(9);
        let created_at = Timestamp::from_secs(1_600_000_000);

        let result = engine()
            .wrap_one(
                &seal,
                &Recipient::from_public_key(&bob),
                Some(ephemeral.clone()),
                Some(created_at),
            )
            .unwrap();

        assert_eq!(result.gift_wrap.pubkey, ephemeral.public_key());
        assert_eq!(result.gift_wrap.created_at, created_at);
    }

    #[test]
    fn wrap_one_includes_relay_hint() {
        let sender = signer(1);
        let bob = keys(2).public_key();
        let seal = seal_for(&sender, &bob, "hello");
        let recipient = Recipient::from_public_key(&bob).with_relay_hint("wss://relay.example.com");

        let result = engine().wrap_one(&seal, &recipient, None, None).unwrap();

        assert_eq!(result.gift_wrap.tags[0].relay_hint(), Some("wss://relay.example.com"));
    }

    #[test]
    fn wrap_one_rejects_tagged_seal() {
        let sender = signer(1);
        let bob = keys(2).public_key();
        let mut seal = seal_for(&sender, &bob, "hello");
        seal.tags.push(Tag::public_key(&bob, None));

        let result = engine().wrap_one(&seal, &Recipient::from_public_key(&bob), None, None);

        assert!(matches!(result, Err(GiftWrapError::InvalidSeal { .. })));
    }

    #[test]
    fn wrap_one_rejects_non_seal_kind() {
        let sender = signer(1);
        let bob = keys(2).public_key();
        let mut seal = seal_for(&sender, &bob, "hello");
        seal.kind = Kind::GIFT_WRAP;

        let result = engine().wrap_one(&seal, &Recipient::from_public_key(&bob), None, None);

        assert!(matches!(result, Err(GiftWrapError::InvalidSeal { .. })));
    }

    #[test]
    fn recipient_validation() {
        let valid = keys(2).public_key().to_hex();

        assert!(Recipient::new(valid.clone()).validate().is_ok());
        assert!(Recipient::new(valid.to_uppercase()).validate().is_ok());
        assert!(
            Recipient::new(valid.clone()).with_relay_hint("ws://localhost:7777").validate().is_ok()
        );

        let bad = [
            Recipient::new(&valid[..62]),
            Recipient::new(format!("{}zz", &valid[..62])),
            Recipient::new("f".repeat(64)),
            Recipient::new(valid.clone()).with_relay_hint(""),
            Recipient::new(valid.clone()).with_relay_hint("https://relay.example.com"),
            Recipient::new(valid.clone()).with_relay_hint("wss://relay example.com"),
            Recipient::new(valid).with_relay_hint("wss://"),
        ];
        for recipient in bad {
            assert!(
                matches!(recipient.validate(), Err(GiftWrapError::InvalidRecipient { .. })),
                "{recipient:?} should be rejected"
            );
        }
    }

    #[test]
    fn wrap_many_requires_recipients() {
        let sender = signer(1);
        let seal = seal_for(&sender, &keys(2).public_key(), "hello");

        assert_eq!(engine().wrap_many(&seal, &[]).unwrap_err(), GiftWrapError::NoRecipients);
    }

    #[test]
    fn wrap_many_uses_independent_keys_and_timestamps() {
        let sender = signer(1);
        let seal = seal_for(&sender, &keys(2).public_key(), "hello");
        let recipients: Vec<_> =
            (2..=6).map(|n| Recipient::from_public_key(&keys(n).public_key())).collect();

        let results = engine().wrap_many(&seal, &recipients).unwrap();
        let wraps: Vec<_> = results.into_iter().map(Result::unwrap).collect();

        let pubkeys: HashSet<_> = wraps.iter().map(|w| w.gift_wrap.pubkey).collect();
        let times: HashSet<_> = wraps.iter().map(|w| w.gift_wrap.created_at).collect();
        assert_eq!(pubkeys.len(), recipients.len());
        assert_eq!(times.len(), recipients.len());
        for (wrap, n) in wraps.iter().zip(2..=6) {
            assert_eq!(wrap.recipient, keys(n).public_key());
        }
    }

    #[test]
    fn wrap_many_reports_bad_recipient_in_its_slot() {
        let sender = signer(1);
        let seal = seal_for(&sender, &keys(2).public_key(), "hello");
        let recipients = [
            Recipient::from_public_key(&keys(2).public_key()),
            Recipient::new("not-a-key"),
            Recipient::from_public_key(&keys(3).public_key()),
        ];

        let results = engine().wrap_many(&seal, &recipients).unwrap();

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(GiftWrapError::InvalidRecipient { .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn wrap_many_rejects_invalid_seal_up_front() {
        let sender = signer(1);
        let mut seal = seal_for(&sender, &keys(2).public_key(), "hello");
        seal.kind = Kind::PRIVATE_DIRECT_MESSAGE;

        let recipients = [Recipient::from_public_key(&keys(2).public_key())];

        let result = engine().wrap_many(&seal, &recipients);

        assert!(matches!(result, Err(GiftWrapError::InvalidSeal { .. })));
    }

    #[test]
    fn wrap_many_fails_recipients_beyond_an_exhausted_window() {
        let sender = signer(1);
        let seal = seal_for(&sender, &keys(2).public_key(), "hello");
        let engine =
            GiftWrapEngine::new(TestEnv::new(5), WrapConfig::default().with_max_backdate_secs(0));
        let recipients = [
            Recipient::from_public_key(&keys(2).public_key()),
            Recipient::from_public_key(&keys(3).public_key()),
        ];

        let results = engine.wrap_many(&seal, &recipients).unwrap();

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(GiftWrapError::GiftWrapCreationFailed { .. })));
    }

    #[test]
    fn unwrap_recovers_rumor_and_real_sender() {
        let alice = signer(1);
        let bob = signer(2);
        let seal = seal_for(&alice, &bob.public_key(), "hello");
        let wrap = engine()
            .wrap_one(&seal, &Recipient::from_public_key(&bob.public_key()), None, None)
            .unwrap();

        let gift = engine().unwrap(&wrap.gift_wrap, &bob).unwrap().unwrap();

        assert_eq!(gift.sender, alice.public_key());
        assert_ne!(gift.sender, wrap.gift_wrap.pubkey);
        assert_eq!(gift.rumor.content, "hello");
        assert_eq!(gift.rumor.kind, Kind::PRIVATE_DIRECT_MESSAGE);
    }

    #[test]
    fn unwrap_ignores_wraps_for_others() {
        let alice = signer(1);
        let bob = signer(2);
        let seal = seal_for(&alice, &bob.public_key(), "hello");
        let wrap = engine()
            .wrap_one(&seal, &Recipient::from_public_key(&bob.public_key()), None, None)
            .unwrap();

        assert_eq!(engine().unwrap(&wrap.gift_wrap, &signer(3)), Ok(None));
    }

    #[test]
    fn unwrap_rejects_tampered_content() {
        let alice = signer(1);
        let bob = signer(2);
        let seal = seal_for(&alice, &bob.public_key(), "hello");
        let mut wrap = engine()
            .wrap_one(&seal, &Recipient::from_public_key(&bob.public_key()), None, None)
            .unwrap()
            .gift_wrap;
        let flipped = if &wrap.content[10..11] == "A" { "B" } else { "A" };
        wrap.content.replace_range(10..11, flipped);

        assert_eq!(engine().unwrap(&wrap, &bob), Err(GiftWrapError::UnwrapFailed));
    }

    #[test]
    fn unwrap_rejects_wrong_kind() {
        let alice = signer(1);
        let bob = signer(2);
        let seal = seal_for(&alice, &bob.public_key(), "hello");
        let mut wrap = engine()
            .wrap_one(&seal, &Recipient::from_public_key(&bob.public_key()), None, None)
            .unwrap()
            .gift_wrap;
        wrap.kind = Kind::SEAL;

        assert_eq!(engine().unwrap(&wrap, &bob), Err(GiftWrapError::UnwrapFailed));
    }

    #[test]
    fn unwrap_rejects_validly_signed_garbage() {
        let bob = signer(2);
        let ephemeral = keys(9);
        let wrap = UnsignedEvent::new(
            ephemeral.public_key(),
            Timestamp::from_secs(TEST_NOW),
            Kind::GIFT_WRAP,
            vec![Tag::public_key(&bob.public_key(), None)],
            "not a payload",
        )
        .sign_with_keys(&ephemeral, &[0u8; 32])
        .unwrap();

        assert_eq!(engine().unwrap(&wrap, &bob), Err(GiftWrapError::UnwrapFailed));
    }

    #[test]
    fn unwrap_rejects_wrapped_non_seal() {
        // Correctly encrypted and signed, but the payload is a plain event
        let alice = signer(1);
        let bob = signer(2);
        let ephemeral = LocalSigner::new(keys(9), TestEnv::new(9));
        let inner = alice
            .sign_event(UnsignedEvent::new(
                alice.public_key(),
                Timestamp::from_secs(TEST_NOW),
                Kind::PRIVATE_DIRECT_MESSAGE,
                vec![],
                "signed rumor",
            ))
            .unwrap();
        let content = ephemeral.encrypt(&bob.public_key(), &inner.as_json()).unwrap();
        let wrap = ephemeral
            .sign_event(UnsignedEvent::new(
                ephemeral.public_key(),
                Timestamp::from_secs(TEST_NOW),
                Kind::GIFT_WRAP,
                vec![Tag::public_key(&bob.public_key(), None)],
                content,
            ))
            .unwrap();

        assert_eq!(engine().unwrap(&wrap, &bob), Err(GiftWrapError::UnwrapFailed));
    }
}
