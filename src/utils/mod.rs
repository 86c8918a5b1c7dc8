//! Utility functions and helpers

use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex length of a hash token without an explicit `:N` suffix
pub const DEFAULT_HASH_LEN: usize = 16;

/// Full hex SHA-256 digest of the given content
pub fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Get relative path from base to target
pub fn relative_path(from: &Path, to: &Path) -> Option<String> {
    pathdiff::diff_paths(to, from).map(|p| path_to_slash(&p))
}

/// Clean a path by removing . and .. components
pub fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    if path.starts_with('/') {
        format!("/{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}

/// Render a path with forward slashes on every platform
pub fn path_to_slash(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
