use sha1::{Digest, Sha1};

/// Length of a hex encoded SHA-1 digest
pub const SHA1_HEX_LEN: usize = 40;

/// Lowercase hex SHA-1 of `data`.
///
/// This is the digest the hosting provider's file store keys uploads by,
/// so the same value labels the upload request and the manifest entry.
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// True if `s` looks like a SHA-1 hex digest.
pub fn is_sha1_hex(s: &str) -> bool {
    s.len() == SHA1_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_vector() {
        assert_eq!(sha1_hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            sha1_hex(b"The quick brown fox jumps over the lazy dog"),
            "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"
        );
    }

    #[test]
    fn test_deterministic_and_fixed_length() {
        let data = vec![7u8; 10 * 1024];
        let a = sha1_hex(&data);
        let b = sha1_hex(&data);
        assert_eq!(a, b);
        assert_eq!(a.len(), SHA1_HEX_LEN);
        assert!(is_sha1_hex(&a));
        assert_eq!(a, a.to_lowercase());
    }

    #[test]
    fn test_is_sha1_hex_rejects_garbage() {
        assert!(!is_sha1_hex("abc"));
        assert!(!is_sha1_hex(&"z".repeat(SHA1_HEX_LEN)));
    }
}
