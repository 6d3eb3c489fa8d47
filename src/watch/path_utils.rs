// src/watch/path_utils.rs

use std::path::Path;

/// Convert `path` into a `/`-separated string relative to `root`.
///
/// Tries a plain `strip_prefix` first, then again on canonicalized paths
/// (event paths may carry a different absolute prefix, e.g. macOS
/// `/private/var`). Returns `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slashed(rel));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(slashed(rel));
        }
    }

    None
}

/// Render a relative path with forward slashes on every platform.
pub fn slashed(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
