//! Content fingerprinting
//!
//! A fingerprint is the uppercase-hex SHA-256 digest of the trimmed,
//! entity-unescaped content. The server decodes XML entities before hashing
//! on its side, so the client hashes the decoded form to match. Files are
//! hashed over their raw bytes with no trim or decode step.

use crate::error::{Error, Result};
use crate::xml;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Compute the canonical fingerprint of text content.
///
/// Returns the raw content (trimmed, then entity-unescaped) together with
/// its fingerprint, computed exactly once per request. Content that is empty
/// after trimming yields an empty fingerprint; callers must treat that as a
/// fatal input error and send no request.
pub fn fingerprint(content: &str) -> (String, String) {
    let raw = xml::unescape(content.trim());
    if raw.is_empty() {
        return (raw, String::new());
    }
    let hash = hash_hex(raw.as_bytes());
    (raw, hash)
}

/// Uppercase-hex SHA-256 digest of raw bytes
pub fn hash_hex(bytes: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(bytes))
}

/// Fingerprint a file's raw bytes.
///
/// Surfaces the file-system error immediately; a failed read aborts the
/// whole operation rather than submitting a partial file set.
pub fn hash_file(path: &Path) -> Result<String> {
    let data = fs::read(path).map_err(|source| Error::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    Ok(hash_hex(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_shape() {
        let (_, hash) = fingerprint("hello");
        assert_eq!(hash.len(), 64);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint("some content").1, fingerprint("some content").1);
    }

    #[test]
    fn test_fingerprint_survives_escape_roundtrip() {
        let content = "hello & <world> \"quoted\"";
        let (_, direct) = fingerprint(content);
        let (_, via_escape) = fingerprint(&xml::escape(content));
        assert_eq!(direct, via_escape);
    }

    #[test]
    fn test_fingerprint_trims_before_hashing() {
        assert_eq!(fingerprint("  hello  ").1, fingerprint("hello").1);
    }

    #[test]
    fn test_empty_content_yields_empty_hash() {
        let (raw, hash) = fingerprint("   ");
        assert!(raw.is_empty());
        assert!(hash.is_empty());
    }

    #[test]
    fn test_file_hash_is_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("padded.txt");
        std::fs::write(&path, "  hello  ").unwrap();
        // no trim step for files
        assert_eq!(hash_file(&path).unwrap(), hash_hex(b"  hello  "));
    }

    #[test]
    fn test_unreadable_file_surfaces_error() {
        let err = hash_file(Path::new("/nonexistent/nope.bin")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
