// src/pipeline/stage.rs

//! Stage abstraction.
//!
//! A [`Stage`] maps the whole asset list to a new list (needed for
//! many-to-one steps such as concatenation). Per-file steps implement the
//! simpler [`FileTransform`] and are wrapped in [`EachFile`], which applies
//! the stage's error policy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::error;

use crate::fs::FileSystem;
use crate::pipeline::asset::Asset;

/// A file that was dropped by a `Skip` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub stage: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub files_read: usize,
    pub files_written: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Mutable context shared by all stages of one execution.
#[derive(Debug)]
pub struct StageContext {
    pub fs: Arc<dyn FileSystem>,
    pub pipeline: String,
    pub report: PipelineReport,
}

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, assets: Vec<Asset>, ctx: &mut StageContext) -> Result<Vec<Asset>>;
}

/// What to do when a per-file transform fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Log, drop the file, keep going.
    Skip,
    /// Fail the pipeline.
    Abort,
}

pub trait FileTransform: Send + Sync {
    fn name(&self) -> &'static str;

    fn transform(&self, asset: Asset, fs: &dyn FileSystem) -> Result<Asset>;
}

#[derive(Debug)]
pub struct EachFile<T> {
    inner: T,
    on_error: OnError,
}

impl<T: FileTransform> EachFile<T> {
    pub fn new(inner: T, on_error: OnError) -> Self {
        Self { inner, on_error }
    }

    pub fn skip(inner: T) -> Self {
        Self::new(inner, OnError::Skip)
    }

    pub fn abort(inner: T) -> Self {
        Self::new(inner, OnError::Abort)
    }
}

impl<T: FileTransform> Stage for EachFile<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn apply(&self, assets: Vec<Asset>, ctx: &mut StageContext) -> Result<Vec<Asset>> {
        let mut out = Vec::with_capacity(assets.len());
        for asset in assets {
            let path = asset.path();
            match self.inner.transform(asset, ctx.fs.as_ref()) {
                Ok(asset) => out.push(asset),
                Err(err) => match self.on_error {
                    OnError::Skip => {
                        error!(
                            pipeline = %ctx.pipeline,
                            stage = self.inner.name(),
                            path = ?path,
                            error = %format!("{err:#}"),
                            "stage failed; skipping file"
                        );
                        ctx.report.skipped.push(SkippedFile {
                            path,
                            stage: self.inner.name(),
                            error: format!("{err:#}"),
                        });
                    }
                    OnError::Abort => {
                        return Err(err.context(format!(
                            "{} failed on {}",
                            self.inner.name(),
                            path.display()
                        )));
                    }
                },
            }
        }
        Ok(out)
    }
}
