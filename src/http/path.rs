//! Request path resolution
//!
//! Maps a URL path onto a file beneath the base directory. The result is
//! canonicalised (symlinks resolved) and must still lie under the canonical
//! base directory, otherwise it is rejected.

use std::path::{Path, PathBuf};

/// Lexically normalise a URL path into a relative path.
///
/// Percent-escapes are decoded, empty and `.` segments are dropped, and `..`
/// pops the previous segment without ever climbing above the root. Returns
/// `None` when the path cannot be decoded.
pub fn normalize_request_path(request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s if s.contains('\0') => return None,
            s => segments.push(s),
        }
    }

    Some(segments.iter().collect())
}

/// Why a request path did not resolve to a file under the base directory
#[derive(Debug, PartialEq, Eq)]
pub enum PathRejection {
    /// Not valid percent-encoding, or contains NUL
    Undecodable,
    /// Nothing exists at the joined path
    Missing,
    /// Exists, but its canonical form lies outside the base directory
    Escapes { canonical: PathBuf },
}

/// Resolve a request path to a canonical path confined to `base_dir`.
///
/// `base_dir` must already be canonical. Only reads filesystem metadata;
/// reporting a rejection is left to the caller.
pub fn resolve(base_dir: &Path, request_path: &str) -> Result<PathBuf, PathRejection> {
    let relative = normalize_request_path(request_path).ok_or(PathRejection::Undecodable)?;

    // Backslashes and drive prefixes would re-root the join on some platforms
    if relative.has_root() || relative.is_absolute() {
        return Err(PathRejection::Undecodable);
    }

    let joined = base_dir.join(relative);
    let canonical = joined.canonicalize().map_err(|_| PathRejection::Missing)?;

    if !canonical.starts_with(base_dir) {
        return Err(PathRejection::Escapes { canonical });
    }

    Ok(canonical)
}
