//! Key normalization: length validation plus a precomputed FNV-1a digest.

/// Maximum key length in bytes. Longer keys are rejected at the API
/// boundary as a caller contract violation.
pub const MAX_KEY_LEN: usize = 36;

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// FNV-1a digest of a byte sequence.
pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// An owned key plus its digest, computed exactly once at construction.
///
/// All bucket math runs on the stored digest; the raw bytes are only
/// consulted to confirm equality after a digest match.
#[derive(Debug)]
pub(crate) struct Key {
    raw: String,
    digest: u64,
}

fn check_length(raw: &str) {
    assert!(
        raw.len() <= MAX_KEY_LEN,
        "key exceeds {} bytes (got {})",
        MAX_KEY_LEN,
        raw.len()
    );
}

impl Key {
    /// Normalize a raw key.
    ///
    /// # Panics
    /// Panics if `raw` exceeds [`MAX_KEY_LEN`] bytes. Oversized keys are
    /// a programming error on the caller's side, not a recoverable
    /// condition.
    pub(crate) fn new(raw: &str) -> Self {
        check_length(raw);
        Self {
            digest: fnv1a(raw.as_bytes()),
            raw: raw.to_owned(),
        }
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn digest(&self) -> u64 {
        self.digest
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        // Digest first: a mismatch skips the byte comparison entirely.
        self.digest == other.digest && self.raw == other.raw
    }
}

impl Eq for Key {}

/// Borrowed counterpart to [`Key`] for the read paths: same length
/// contract and digest, no allocation.
#[derive(Debug)]
pub(crate) struct KeyRef<'a> {
    raw: &'a str,
    digest: u64,
}

impl<'a> KeyRef<'a> {
    /// Normalize a raw key for lookup.
    ///
    /// # Panics
    /// Panics if `raw` exceeds [`MAX_KEY_LEN`] bytes, as [`Key::new`]
    /// does.
    pub(crate) fn new(raw: &'a str) -> Self {
        check_length(raw);
        Self {
            digest: fnv1a(raw.as_bytes()),
            raw,
        }
    }

    pub(crate) fn digest(&self) -> u64 {
        self.digest
    }
}

impl PartialEq<KeyRef<'_>> for Key {
    fn eq(&self, other: &KeyRef<'_>) -> bool {
        self.digest == other.digest && self.raw == other.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the digest matches the published FNV-1a-64 vectors.
    #[test]
    fn fnv1a_known_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x8594_4171_f739_67e8);
    }

    /// Invariant: the digest is fixed at construction and equals the
    /// digest of the raw bytes.
    #[test]
    fn digest_computed_once_from_raw() {
        let key = Key::new("foo-1");
        assert_eq!(key.digest(), fnv1a(b"foo-1"));
        assert_eq!(key.raw(), "foo-1");
    }

    /// Invariant: a key of exactly `MAX_KEY_LEN` bytes is accepted.
    #[test]
    fn key_at_limit_is_accepted() {
        let raw = "x".repeat(MAX_KEY_LEN);
        let key = Key::new(&raw);
        assert_eq!(key.raw().len(), MAX_KEY_LEN);
    }

    /// Invariant: an oversized key panics; the contract is fatal.
    #[test]
    fn oversized_key_panics() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        let raw = "7".repeat(69);
        let res = catch_unwind(AssertUnwindSafe(|| Key::new(&raw)));
        assert!(res.is_err(), "expected panic for a 69-byte key");
    }

    /// Invariant: key equality is byte equality; equal digests alone are
    /// not consulted for unequal bytes.
    #[test]
    fn equality_follows_raw_bytes() {
        assert_eq!(Key::new("alpha"), Key::new("alpha"));
        assert_ne!(Key::new("alpha"), Key::new("beta"));
    }

    /// Invariant: the borrowed lookup key carries the same digest as the
    /// owned key and compares equal to it for equal bytes, so the read
    /// paths probe identically to the insert path.
    #[test]
    fn key_ref_matches_owned_key() {
        let owned = Key::new("foo-1");
        let borrowed = KeyRef::new("foo-1");
        assert_eq!(borrowed.digest(), owned.digest());
        assert!(owned == borrowed);
        assert!(!(Key::new("foo-2") == borrowed));
    }

    /// Invariant: the borrowed lookup key enforces the same length
    /// contract as the owned key.
    #[test]
    fn oversized_key_ref_panics() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        let raw = "7".repeat(69);
        let res = catch_unwind(AssertUnwindSafe(|| KeyRef::new(&raw)));
        assert!(res.is_err(), "expected panic for a 69-byte lookup key");
    }
}
