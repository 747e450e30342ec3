//! Key Addressing Module
//!
//! Maps cache keys to file paths under the cache root.

use std::path::{Path, PathBuf};

// == Key Digest ==
/// Returns the lowercase hex MD5 digest of the key's bytes (32 chars).
pub fn key_digest(key: &str) -> String {
    format!("{:x}", md5::compute(key.as_bytes()))
}

// == Path For ==
/// Returns the file path for a key under `root`.
///
/// The digest fans out into three directory levels of two hex characters
/// each, with the full digest as the file name:
/// `root/9e/10/7d/9e107d9d372bb6826bd81d3542a419d6`.
pub fn path_for(root: &Path, key: &str) -> PathBuf {
    let digest = key_digest(key);

    root.join(&digest[0..2])
        .join(&digest[2..4])
        .join(&digest[4..6])
        .join(&digest)
}
