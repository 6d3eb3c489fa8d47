// src/pipeline/stages/twig.rs

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use minijinja::{context, Environment, ErrorKind};

use crate::fs::FileSystem;
use crate::pipeline::asset::Asset;
use crate::pipeline::stage::{Stage, StageContext};

/// Renders templates to `.html`. `include`/`extends` names resolve
/// against `template_dir`.
#[derive(Debug, Clone)]
pub struct Twig {
    template_dir: PathBuf,
}

impl Twig {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
        }
    }

    fn environment(&self, fs: Arc<dyn FileSystem>) -> Environment<'static> {
        let dir = self.template_dir.clone();
        let mut env = Environment::new();
        env.set_loader(move |name: &str| {
            let Some(path) = template_path(&dir, name) else {
                return Ok(None);
            };
            if !fs.is_file(&path) {
                return Ok(None);
            }
            fs.read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {name}: {e:#}"),
                )
            })
        });
        env
    }
}

impl Stage for Twig {
    fn name(&self) -> &'static str {
        "twig"
    }

    fn apply(&self, assets: Vec<Asset>, ctx: &mut StageContext) -> Result<Vec<Asset>> {
        let env = self.environment(Arc::clone(&ctx.fs));

        assets
            .into_iter()
            .map(|asset| {
                let name = asset.relative_str();
                let html = env
                    .get_template(&name)
                    .and_then(|tmpl| tmpl.render(context! {}))
                    .with_context(|| format!("rendering template {name}"))?;
                Ok(asset.with_extension("html").with_contents(html))
            })
            .collect()
    }
}

/// `dir/name`, or `None` if `name` tries to leave `dir`.
fn template_path(dir: &Path, name: &str) -> Option<PathBuf> {
    let mut path = dir.to_path_buf();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(path)
}
