// src/pipeline/stages/reload.rs

use anyhow::Result;

use crate::pipeline::asset::Asset;
use crate::pipeline::stage::{Stage, StageContext};
use crate::server::LiveReload;

/// Notifies live-reload clients about every asset passing through.
#[derive(Debug, Clone)]
pub struct Reload {
    live: LiveReload,
}

impl Reload {
    pub fn new(live: LiveReload) -> Self {
        Self { live }
    }
}

impl Stage for Reload {
    fn name(&self) -> &'static str {
        "reload"
    }

    fn apply(&self, assets: Vec<Asset>, _ctx: &mut StageContext) -> Result<Vec<Asset>> {
        if !assets.is_empty() {
            self.live
                .reload(assets.iter().map(Asset::relative_str).collect());
        }
        Ok(assets)
    }
}
