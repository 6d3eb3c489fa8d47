// src/pipeline/asset.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::watch::path_utils::slashed;

/// One file flowing through a pipeline.
///
/// `relative` is the path below `base`; stages that rename or re-root an
/// asset only touch those two fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub base: PathBuf,
    pub relative: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn new(base: impl Into<PathBuf>, relative: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            base: base.into(),
            relative: relative.into(),
            contents,
        }
    }

    /// Full path (`base/relative`).
    pub fn path(&self) -> PathBuf {
        self.base.join(&self.relative)
    }

    /// Relative path with forward slashes.
    pub fn relative_str(&self) -> String {
        slashed(&self.relative)
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .with_context(|| format!("{} is not valid UTF-8", self.relative.display()))
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.relative.set_extension(ext);
        self
    }

    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = contents.into();
        self
    }

    pub fn file_stem(&self) -> Option<&str> {
        self.relative.file_stem().and_then(|s| s.to_str())
    }

    pub fn rebase(mut self, base: &Path) -> Self {
        self.base = base.to_path_buf();
        self
    }
}
