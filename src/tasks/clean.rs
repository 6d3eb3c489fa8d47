// src/tasks/clean.rs

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::fs::FileSystem;

/// Top-level entries of the style-guide dir that `clean` never removes.
pub const KEEP: [&str; 3] = ["backstop_data", "static", "pdp.html"];

/// Remove every top-level entry of `dir` except [`KEEP`].
///
/// Returns the number of removed entries. A missing `dir` is not an error.
pub fn clean_dir(fs: &dyn FileSystem, dir: &Path) -> Result<usize> {
    if !fs.is_dir(dir) {
        debug!(dir = ?dir, "nothing to clean");
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs.read_dir(dir)? {
        let keep = entry
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| KEEP.contains(&name));
        if keep {
            continue;
        }

        if fs.is_dir(&entry) {
            fs.remove_dir_all(&entry)?;
        } else {
            fs.remove_file(&entry)?;
        }
        debug!(path = ?entry, "removed");
        removed += 1;
    }

    info!(dir = ?dir, removed, "cleaned style guide output");
    Ok(removed)
}
