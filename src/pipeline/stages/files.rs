// src/pipeline/stages/files.rs

//! Path and output stages: rename, write, concatenate.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::pipeline::asset::Asset;
use crate::pipeline::stage::{Stage, StageContext};

/// Rewrites relative paths.
#[derive(Debug, Clone, Copy)]
pub struct Rename {
    flatten: bool,
}

impl Rename {
    /// Drop the directory part, keeping only the file name.
    pub fn flatten() -> Self {
        Self { flatten: true }
    }
}

impl Stage for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, assets: Vec<Asset>, _ctx: &mut StageContext) -> Result<Vec<Asset>> {
        if !self.flatten {
            return Ok(assets);
        }
        Ok(assets
            .into_iter()
            .map(|mut asset| {
                if let Some(name) = asset.relative.file_name() {
                    asset.relative = PathBuf::from(name);
                }
                asset
            })
            .collect())
    }
}

/// Writes every asset below `dir` and passes them on, re-based to `dir`.
#[derive(Debug, Clone)]
pub struct Dest {
    dir: PathBuf,
}

impl Dest {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Stage for Dest {
    fn name(&self) -> &'static str {
        "dest"
    }

    fn apply(&self, assets: Vec<Asset>, ctx: &mut StageContext) -> Result<Vec<Asset>> {
        let mut bytes = 0usize;
        for asset in &assets {
            ctx.fs.write(&self.dir.join(&asset.relative), &asset.contents)?;
            bytes += asset.contents.len();
        }
        ctx.report.files_written += assets.len();

        info!(
            pipeline = %ctx.pipeline,
            dest = ?self.dir,
            files = assets.len(),
            size = %human_size(bytes),
            "wrote files"
        );

        Ok(assets.into_iter().map(|a| a.rebase(&self.dir)).collect())
    }
}

/// Joins all assets into one file named `name`, separated by `\n`.
#[derive(Debug, Clone)]
pub struct Concat {
    name: String,
}

impl Concat {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Stage for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(&self, assets: Vec<Asset>, _ctx: &mut StageContext) -> Result<Vec<Asset>> {
        let Some(first) = assets.first() else {
            return Ok(Vec::new());
        };
        let base = first.base.clone();

        let joined = assets
            .iter()
            .map(|a| a.contents.as_slice())
            .collect::<Vec<_>>()
            .join(&b'\n');

        Ok(vec![Asset::new(base, &self.name, joined)])
    }
}

fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["B", "kB", "MB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}
