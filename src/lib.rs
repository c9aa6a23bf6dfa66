//! # mockchain: Mockito call-chain recognition and rewriting
//!
//! Statically recognizes the stubbing and verification dialects of the Mockito DSL in
//! Java sources and rewrites a chain from one dialect into an equivalent one.
//!
//! ## Library usage
//!
//! This crate is primarily a CLI tool, but the engine is exposed as a library:
//!
//! - [`java`]: tree-sitter front end, call snapshots and chain decomposition
//! - [`approach`]: the closed registry of dialect grammars
//! - [`settings`]: `@Mock` attributes ↔ `Mockito.withSettings()` builder chains
//! - [`rewrite`]: conversion planning and atomic application
//! - [`convention`]: the enforced-dialect policy and its enforcement check

pub mod approach;
pub mod config;
pub mod convention;
mod error;
pub mod java;
pub mod rewrite;
pub mod settings;

pub use error::{ChainError, Rejection};

// ─── Stable hashing ─────────────────────────────────────────────────

/// Stable FNV-1a hash (deterministic across Rust versions, unlike `DefaultHasher`).
///
/// Used as the document revision fingerprint; several parts are fed sequentially.
#[must_use]
pub fn stable_hash(parts: &[&[u8]]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;
    let mut hash = FNV_OFFSET;
    for part in parts {
        for &byte in *part {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

// ─── File helpers ────────────────────────────────────────────────────

/// Strip the `\\?\` extended-length path prefix that Windows canonicalize adds.
#[must_use]
pub fn clean_path(p: &str) -> String {
    p.strip_prefix(r"\\?\").unwrap_or(p).to_string()
}

/// Read a file as a String, using lossy UTF-8 conversion for non-UTF8 files.
/// Returns `(content, was_lossy)` where `was_lossy` is true if replacement characters
/// were inserted (Windows-1252 comments in old test sources).
pub fn read_file_lossy(path: &std::path::Path) -> std::io::Result<(String, bool)> {
    let raw = std::fs::read(path)?;
    match String::from_utf8(raw) {
        Ok(s) => Ok((s, false)),
        Err(e) => Ok((String::from_utf8_lossy(e.as_bytes()).into_owned(), true)),
    }
}

// ─── Test support ────────────────────────────────────────────────────


#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_clean_path_strips_prefix() {
        assert_eq!(clean_path(r"\\?\C:\Users\test"), r"C:\Users\test");
    }

    #[test]
    fn test_clean_path_no_prefix() {
        assert_eq!(clean_path(r"C:\Users\test"), r"C:\Users\test");
    }

    #[test]
    fn test_stable_hash_deterministic() {
        let a = stable_hash(&[b"hello world"]);
        let b = stable_hash(&[b"hello world"]);
        assert_eq!(a, b, "same input must produce same hash");
    }

    #[test]
    fn test_stable_hash_parts_are_sequential() {
        assert_eq!(stable_hash(&[b"ab", b"c"]), stable_hash(&[b"abc"]));
        assert_ne!(stable_hash(&[b"abc"]), stable_hash(&[b"abd"]));
    }

    #[test]
    fn test_read_file_lossy_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Latin1Test.java");
        std::fs::write(&path, b"// caf\xe9\nclass A {}\n").unwrap();
        let (content, lossy) = read_file_lossy(&path).unwrap();
        assert!(lossy);
        assert!(content.contains("class A"));
    }
}

// ─── Property-based tests (proptest) ─────────────────────────────────
