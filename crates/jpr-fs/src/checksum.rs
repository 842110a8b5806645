//! SHA-256 checksum utilities
//!
//! Graph cache entries are named after the hex digest of their input, so the
//! digest format here is plain lowercase hex with no prefix.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of raw bytes.
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(sha256_hex(b"test"), sha256_hex(b"test"));
    }

    #[test]
    fn different_content_different_digest() {
        assert_ne!(sha256_hex(b"aaa"), sha256_hex(b"bbb"));
    }

    #[test]
    fn digest_known_value() {
        assert_eq!(
            sha256_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
