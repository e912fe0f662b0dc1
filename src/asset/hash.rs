//! Content hashing for asset file names using blake3.

use std::fmt;

/// Hex characters used by `[hash]` when no length is given.
pub const DEFAULT_HASH_LENGTH: usize = 8;

/// Hex length of a full blake3 digest.
pub const MAX_HASH_LENGTH: usize = 64;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash raw file content.
    #[inline]
    pub fn of(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Full lowercase hex digest.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Hex digest truncated to `len` characters, clamped to the digest length.
    pub fn short(self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.min(MAX_HASH_LENGTH));
        hex
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short(DEFAULT_HASH_LENGTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = ContentHash::of(b"same bytes");
        let b = ContentHash::of(b"same bytes");
        assert_eq!(a, b);
        assert_eq!(a.short(8), b.short(8));
    }

    #[test]
    fn test_hash_differs() {
        assert_ne!(
            ContentHash::of(b"body { color: red }").short(8),
            ContentHash::of(b"body { color: blue }").short(8)
        );
    }

    #[test]
    fn test_short_lengths() {
        let hash = ContentHash::of(b"x");
        assert_eq!(hash.short(8).len(), 8);
        assert_eq!(hash.short(0), "");
        assert_eq!(hash.short(1000).len(), MAX_HASH_LENGTH);
        assert!(hash.to_hex().starts_with(&hash.short(12)));
    }

    #[test]
    fn test_known_digest() {
        // blake3 of the empty input
        assert_eq!(
            ContentHash::of(b"").short(16),
            "af1349b9f5f9a1a6"
        );
    }

    #[test]
    fn test_display_uses_default_length() {
        let hash = ContentHash::of(b"abc");
        assert_eq!(hash.to_string().len(), DEFAULT_HASH_LENGTH);
    }
}
