// src/pipeline/fileset.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobSet;
use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::path_utils::slashed;
use crate::watch::{build_globset, split_patterns};

/// Files below `base` selected by glob patterns relative to `base`.
///
/// Patterns starting with `!` exclude, e.g.
/// `FileSet::new("scss", ["**/*.scss", "!**/_*.scss"])`.
#[derive(Clone)]
pub struct FileSet {
    base: PathBuf,
    patterns: Vec<String>,
    include: GlobSet,
    exclude: GlobSet,
}

impl fmt::Debug for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSet")
            .field("base", &self.base)
            .field("patterns", &self.patterns)
            .finish()
    }
}

impl FileSet {
    pub fn new<I>(base: impl Into<PathBuf>, patterns: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let (include, exclude) = split_patterns(&patterns);
        Ok(Self {
            base: base.into(),
            include: build_globset(&include).context("building file set includes")?,
            exclude: build_globset(&exclude).context("building file set excludes")?,
            patterns,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn matches(&self, rel: &str) -> bool {
        self.include.is_match(rel) && !self.exclude.is_match(rel)
    }

    /// Matching files as paths relative to `base`, sorted.
    ///
    /// A missing base directory yields an empty set.
    pub fn resolve(&self, fs: &dyn FileSystem) -> Result<Vec<PathBuf>> {
        if !fs.is_dir(&self.base) {
            debug!(base = ?self.base, "file set base does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut stack = vec![self.base.clone()];

        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Ok(rel) = path.strip_prefix(&self.base) {
                        if self.matches(&slashed(rel)) {
                            files.push(rel.to_path_buf());
                        }
                    }
                }
            }
        }

        files.sort();
        Ok(files)
    }
}
