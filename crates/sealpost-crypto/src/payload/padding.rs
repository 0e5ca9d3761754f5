//! Length-hiding padding
//!
//! Plaintexts are prefixed with their length and zero-filled up to a bucket
//! size, so the ciphertext only reveals which bucket the message fell into.
//!
//! ```text
//! len: u16 (big-endian) || plaintext || 0x00 * (padded_len(len) - len)
//! ```
//!
//! Buckets are 32 bytes wide up to 256 bytes, then one eighth of the next
//! power of two.

use crate::error::{CryptoError, DecryptError};

/// Size of the big-endian length prefix
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest plaintext the format can carry
pub const MAX_PLAINTEXT_SIZE: usize = u16::MAX as usize;

/// Largest input accepted by [`padded_len`]
pub const MAX_UNPADDED_LEN: usize = 65536;

/// Smallest bucket
const MIN_PADDED_LEN: usize = 32;

/// Bucket size for a plaintext of `unpadded_len` bytes.
///
/// Monotonic, never smaller than the input and never smaller than 32.
///
/// # Errors
///
/// - `PayloadFormat`: `unpadded_len` above [`MAX_UNPADDED_LEN`]
pub fn padded_len(unpadded_len: usize) -> Result<usize, CryptoError> {
    if unpadded_len > MAX_UNPADDED_LEN {
        return Err(CryptoError::PayloadFormat {
            reason: format!("length {unpadded_len} exceeds {MAX_UNPADDED_LEN}"),
        });
    }
    if unpadded_len <= MIN_PADDED_LEN {
        return Ok(MIN_PADDED_LEN);
    }

    let next_power = 1usize << (usize::BITS - (unpadded_len - 1).leading_zeros());
    let chunk = if next_power <= 256 { 32 } else { next_power / 8 };

    Ok(chunk * ((unpadded_len - 1) / chunk + 1))
}

/// Pad a plaintext into its bucket.
///
/// Returns `LENGTH_PREFIX_SIZE + padded_len(plaintext.len())` bytes.
///
/// # Errors
///
/// - `PayloadFormat`: plaintext longer than [`MAX_PLAINTEXT_SIZE`]
pub fn pad(plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let Ok(len) = u16::try_from(plaintext.len()) else {
        return Err(CryptoError::PayloadFormat {
            reason: format!(
                "plaintext is {} bytes, maximum is {MAX_PLAINTEXT_SIZE}",
                plaintext.len()
            ),
        });
    };

    let mut padded = vec![0u8; LENGTH_PREFIX_SIZE + padded_len(plaintext.len())?];
    padded[..LENGTH_PREFIX_SIZE].copy_from_slice(&len.to_be_bytes());
    padded[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + plaintext.len()].copy_from_slice(plaintext);

    Ok(padded)
}

/// Strip padding and return the original plaintext.
///
/// The buffer must be exactly the size `pad` would have produced for the
/// declared length. Anything else is rejected.
pub fn unpad(padded: &[u8]) -> Result<&[u8], DecryptError> {
    let Some((prefix, body)) = padded.split_first_chunk::<LENGTH_PREFIX_SIZE>() else {
        return Err(DecryptError);
    };

    let len = usize::from(u16::from_be_bytes(*prefix));
    let Ok(expected) = padded_len(len) else {
        return Err(DecryptError);
    };
    if len > body.len() || body.len() != expected {
        return Err(DecryptError);
    }

    Ok(&body[..len])
}
