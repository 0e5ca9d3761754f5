//! Secp256k1 key material
//!
//! Public keys travel as 32-byte x-only points (64 hex characters on the
//! wire). Secret keys are 32-byte scalars, validated on construction and
//! zeroized on drop.

use std::{fmt, str::FromStr};

use secp256k1::{All, Keypair, Message, Parity, SECP256K1, Secp256k1, XOnlyPublicKey, schnorr};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Size of an x-only public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a SEC1 compressed public key in bytes
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// Size of a secret scalar in bytes
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of a BIP-340 Schnorr signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// Candidate scalars drawn before key generation gives up.
/// A uniform 32-byte draw is out of range with probability ~2^-128.
const MAX_KEYGEN_ATTEMPTS: usize = 16;

fn context() -> &'static Secp256k1<All> {
    SECP256K1
}

/// An x-only secp256k1 public key.
///
/// Construction guarantees the key is a valid curve point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey(XOnlyPublicKey);

impl PublicKey {
    /// Parse a public key from 32 x-only bytes or 33 compressed bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        match bytes.len() {
            PUBLIC_KEY_SIZE => XOnlyPublicKey::from_slice(bytes).map(Self).map_err(|_| {
                CryptoError::InvalidPublicKey { reason: "not a point on the curve".to_string() }
            }),
            COMPRESSED_PUBLIC_KEY_SIZE => secp256k1::PublicKey::from_slice(bytes)
                .map(|key| Self(key.x_only_public_key().0))
                .map_err(|_| CryptoError::InvalidPublicKey {
                    reason: "not a point on the curve".to_string(),
                }),
            len => Err(CryptoError::InvalidPublicKey {
                reason: format!(
                    "expected {PUBLIC_KEY_SIZE} or {COMPRESSED_PUBLIC_KEY_SIZE} bytes, got {len}"
                ),
            }),
        }
    }

    /// Parse a wire-format public key (exactly 64 hex characters).
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        if hex.len() != PUBLIC_KEY_SIZE * 2 {
            return Err(CryptoError::InvalidPublicKey {
                reason: format!(
                    "expected {} hex characters, got {}",
                    PUBLIC_KEY_SIZE * 2,
                    hex.len()
                ),
            });
        }

        let bytes = hex::decode(hex)
            .map_err(|e| CryptoError::InvalidPublicKey { reason: e.to_string() })?;
        Self::from_slice(&bytes)
    }

    /// 32-byte x-only encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.serialize()
    }

    /// Lower-case hex encoding used on the wire.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify a BIP-340 Schnorr signature over a 32-byte digest.
    pub fn verify_schnorr(&self, digest: &[u8; 32], signature: &[u8; SIGNATURE_SIZE]) -> bool {
        let Ok(signature) = schnorr::Signature::from_slice(signature) else {
            return false;
        };
        let message = Message::from_digest(*digest);
        context().verify_schnorr(&signature, &message, &self.0).is_ok()
    }

    /// Full point with even y, as implied by the x-only encoding.
    ///
    /// ECDH only consumes the x coordinate of the product, which is the same
    /// for either parity.
    pub(crate) fn to_even_point(self) -> secp256k1::PublicKey {
        self.0.public_key(Parity::Even)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(de::Error::custom)
    }
}

/// A secp256k1 secret scalar.
///
/// Always in the valid range `1..n`. Bytes are zeroized on drop.
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_SIZE]);

impl SecretKey {
    /// Parse a secret key from exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(CryptoError::InvalidSecretKey {
                reason: format!("expected {SECRET_KEY_SIZE} bytes, got {}", bytes.len()),
            });
        }

        secp256k1::SecretKey::from_slice(bytes).map_err(|_| CryptoError::InvalidSecretKey {
            reason: "scalar out of range".to_string(),
        })?;

        let mut secret = [0u8; SECRET_KEY_SIZE];
        secret.copy_from_slice(bytes);
        Ok(Self(secret))
    }

    /// Parse a secret key from 64 hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(hex)
            .map_err(|e| CryptoError::InvalidSecretKey { reason: e.to_string() })?;
        let result = Self::from_slice(&bytes);
        bytes.zeroize();
        result
    }

    /// Raw scalar bytes. The caller is responsible for wiping the copy.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.0
    }

    /// Lower-case hex encoding of the scalar.
    pub fn to_secret_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn to_secp(&self) -> secp256k1::SecretKey {
        let Ok(secret) = secp256k1::SecretKey::from_slice(&self.0) else {
            unreachable!("secret key range is validated at construction");
        };
        secret
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A key pair: secret scalar plus its x-only public key.
///
/// # Invariants
///
/// - `public` is always the x-only key of `secret` (checked by
///   [`Keys::from_parts`], computed everywhere else)
#[derive(Clone)]
pub struct Keys {
    secret: SecretKey,
    public: PublicKey,
}

impl Keys {
    /// Build a key pair from a secret key.
    pub fn new(secret: SecretKey) -> Self {
        let keypair = Keypair::from_secret_key(context(), &secret.to_secp());
        let (public, _) = keypair.x_only_public_key();
        Self { secret, public: PublicKey(public) }
    }

    /// Parse a key pair from a hex secret key.
    pub fn parse(secret_hex: &str) -> Result<Self, CryptoError> {
        SecretKey::from_hex(secret_hex).map(Self::new)
    }

    /// Build a key pair from externally supplied parts, checking that the
    /// public key really belongs to the secret key.
    pub fn from_parts(secret: SecretKey, public: PublicKey) -> Result<Self, CryptoError> {
        let keys = Self::new(secret);
        if keys.public != public {
            return Err(CryptoError::KeyMismatch);
        }
        Ok(keys)
    }

    /// Generate a fresh key pair from caller-supplied randomness.
    ///
    /// `fill_random` MUST be backed by a CSPRNG in production. Out-of-range
    /// draws are discarded and redrawn.
    pub fn generate(mut fill_random: impl FnMut(&mut [u8])) -> Result<Self, CryptoError> {
        let mut candidate = [0u8; SECRET_KEY_SIZE];

        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            fill_random(&mut candidate);
            let secret = SecretKey::from_slice(&candidate);
            candidate.zeroize();

            if let Ok(secret) = secret {
                return Ok(Self::new(secret));
            }
        }

        Err(CryptoError::KeyGeneration { attempts: MAX_KEYGEN_ATTEMPTS })
    }

    /// The x-only public key.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// The secret scalar.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Produce a BIP-340 Schnorr signature over a 32-byte digest.
    ///
    /// `aux_rand` is the auxiliary randomness defined by BIP-340; callers
    /// pass fresh random bytes.
    pub fn sign_schnorr(&self, digest: &[u8; 32], aux_rand: &[u8; 32]) -> [u8; SIGNATURE_SIZE] {
        let keypair = Keypair::from_secret_key(context(), &self.secret.to_secp());
        let message = Message::from_digest(*digest);
        context().sign_schnorr_with_aux_rand(&message, &keypair, aux_rand).serialize()
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("public", &self.public).finish_non_exhaustive()
    }
}
