// src/pipeline/mod.rs

//! File pipelines: select files, run them through stages, write results.

pub mod asset;
pub mod fileset;
pub mod stage;
pub mod stages;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::fs::FileSystem;

pub use asset::Asset;
pub use fileset::FileSet;
pub use stage::{EachFile, FileTransform, OnError, PipelineReport, SkippedFile, Stage, StageContext};

/// A named file set plus an ordered list of stages.
pub struct Pipeline {
    name: String,
    source: FileSet,
    stages: Vec<Box<dyn Stage>>,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<_> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("stages", &stages)
            .finish()
    }
}

impl Pipeline {
    pub fn new(name: impl Into<String>, source: FileSet, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            name: name.into(),
            source,
            stages: Vec::new(),
            fs,
        }
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read every file of the source set, apply all stages in order.
    pub fn execute(&self) -> Result<PipelineReport> {
        let started = Instant::now();
        let mut ctx = StageContext {
            fs: Arc::clone(&self.fs),
            pipeline: self.name.clone(),
            report: PipelineReport::default(),
        };

        let base = self.source.base();
        let mut assets = Vec::new();
        for rel in self.source.resolve(self.fs.as_ref())? {
            let contents = self.fs.read(&base.join(&rel))?;
            assets.push(Asset::new(base, rel, contents));
        }
        ctx.report.files_read = assets.len();
        debug!(pipeline = %self.name, files = assets.len(), "resolved source files");

        for stage in &self.stages {
            assets = stage
                .apply(assets, &mut ctx)
                .with_context(|| format!("pipeline '{}', stage '{}'", self.name, stage.name()))?;
        }

        info!(
            pipeline = %self.name,
            read = ctx.report.files_read,
            written = ctx.report.files_written,
            skipped = ctx.report.skipped.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        Ok(ctx.report)
    }

    /// Run [`Pipeline::execute`] on the blocking thread pool.
    pub async fn execute_blocking(self: Arc<Self>) -> Result<PipelineReport> {
        tokio::task::spawn_blocking(move || self.execute())
            .await
            .context("pipeline worker panicked")?
    }
}
