//! SHA-256 content hasher.
//!
//! The digest of an image's raw bytes is the identity of a cache entry:
//! two downloads with equal digests are the same image, regardless of the
//! date or URL they were requested by.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute the hex-encoded SHA-256 digest of `bytes`.
///
/// # Example
///
/// ```
/// use apodcache::cache::hasher::digest;
///
/// assert_eq!(
///     digest(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
#[must_use]
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Check whether a string has the shape of a digest produced by [`digest`]:
/// exactly [`DIGEST_HEX_LEN`] lowercase hex characters.
#[must_use]
pub fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
