// src/pipeline/stages/styles.rs

//! Stylesheet stages: SCSS compilation, minification and post-processing.

use std::cmp::Ordering;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use lightningcss::rules::media::MediaRule;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use parcel_sourcemap::SourceMap;
use regex::Regex;
use tracing::debug;

use crate::fs::{FileSystem, GrassFs};
use crate::pipeline::asset::Asset;
use crate::pipeline::stage::FileTransform;
use crate::types::OutputStyle;

/// SCSS → CSS. `@import`/`@use` resolve relative to the file, then
/// against each load path.
///
/// With source maps on, the output ends in an inline
/// `sourceMappingURL` data URL naming the SCSS file.
#[derive(Debug, Clone)]
pub struct Compile {
    load_paths: Vec<PathBuf>,
    style: OutputStyle,
    source_maps: bool,
}

impl Compile {
    pub fn new(load_paths: Vec<PathBuf>, style: OutputStyle) -> Self {
        Self {
            load_paths,
            style,
            source_maps: false,
        }
    }

    pub fn with_source_maps(mut self, enabled: bool) -> Self {
        self.source_maps = enabled;
        self
    }
}

impl FileTransform for Compile {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn transform(&self, asset: Asset, fs: &dyn FileSystem) -> Result<Asset> {
        let bridge = GrassFs(fs);
        let mut options = grass::Options::default()
            .style(self.style.into())
            .fs(&bridge);
        for path in &self.load_paths {
            options = options.load_path(path);
        }

        let mut css = grass::from_path(asset.path(), &options).map_err(|e| anyhow!("{e}"))?;
        if self.source_maps {
            css = append_source_map(&asset.relative_str(), &css)?;
        }
        debug!(file = %asset.relative_str(), bytes = css.len(), "compiled stylesheet");

        Ok(asset.with_extension("css").with_contents(css))
    }
}

/// Re-print `css` with lightningcss, recording where each rule came from.
///
/// grass has no map output, so positions point into the compiled CSS,
/// which is embedded as the content of `source`.
fn append_source_map(source: &str, css: &str) -> Result<String> {
    let sheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: source.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("parsing compiled {source}: {e}"))?;

    let mut map = SourceMap::new("/");
    map.add_source(source);
    map.set_source_content(0, css)
        .map_err(|e| anyhow!("source map for {source}: {e}"))?;

    let printed = sheet
        .to_css(PrinterOptions {
            source_map: Some(&mut map),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("printing {source}: {e}"))?;
    let url = map
        .to_data_url(None)
        .map_err(|e| anyhow!("source map for {source}: {e}"))?;

    Ok(format!("{}\n/*# sourceMappingURL={url} */\n", printed.code))
}

/// Minifies each CSS file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minify;

impl FileTransform for Minify {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn transform(&self, asset: Asset, _fs: &dyn FileSystem) -> Result<Asset> {
        let code = process_css(&asset, Targets::default(), |_| {})?;
        Ok(asset.with_contents(code))
    }
}

/// Vendor prefixing for the configured browsers plus media-query packing.
#[derive(Debug, Clone)]
pub struct PostProcess {
    targets: Targets,
    sort_media_queries: bool,
    min_width: Regex,
}

impl PostProcess {
    pub fn new<S: AsRef<str>>(browsers: &[S], sort_media_queries: bool) -> Result<Self> {
        let targets = Browsers::from_browserslist(browsers.iter().map(|b| b.as_ref()))
            .map_err(|e| anyhow!("invalid browserslist query: {e}"))?
            .map(Targets::from)
            .unwrap_or_default();

        let min_width = Regex::new(
            r"(?:min-width\s*:\s*|width\s*>=\s*)(-?\d*\.?\d+)\s*(px|em|rem)?",
        )
        .context("compiling min-width pattern")?;

        Ok(Self {
            targets,
            sort_media_queries,
            min_width,
        })
    }

    /// `min-width` of a printed media query, in px (`em`/`rem` count as 16px).
    pub fn min_width_px(&self, query: &str) -> Option<f64> {
        let caps = self.min_width.captures(query)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let factor = match caps.get(2).map(|m| m.as_str()) {
            Some("em") | Some("rem") => 16.0,
            _ => 1.0,
        };
        Some(value * factor)
    }

    /// Merge identical `@media` blocks and move them after all plain rules.
    ///
    /// Merged blocks keep the position of their first occurrence unless
    /// sorting is enabled, which orders them by ascending `min-width`
    /// (queries without one go first).
    pub fn pack_media_queries<'i>(&self, rules: Vec<CssRule<'i>>) -> Vec<CssRule<'i>> {
        let mut plain = Vec::new();
        let mut media: Vec<(Option<String>, MediaRule<'i>)> = Vec::new();

        for rule in rules {
            match rule {
                CssRule::Media(rule) => {
                    let key = rule.query.to_css_string(PrinterOptions::default()).ok();
                    let existing = key
                        .as_ref()
                        .and_then(|k| media.iter_mut().find(|(other, _)| other.as_ref() == Some(k)));
                    match existing {
                        Some((_, target)) => target.rules.0.extend(rule.rules.0),
                        None => media.push((key, rule)),
                    }
                }
                other => plain.push(other),
            }
        }

        if self.sort_media_queries {
            media.sort_by(|(a, _), (b, _)| {
                let a = a.as_deref().and_then(|q| self.min_width_px(q)).unwrap_or(0.0);
                let b = b.as_deref().and_then(|q| self.min_width_px(q)).unwrap_or(0.0);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            });
        }

        plain.extend(media.into_iter().map(|(_, rule)| CssRule::Media(rule)));
        plain
    }
}

impl FileTransform for PostProcess {
    fn name(&self) -> &'static str {
        "postprocess"
    }

    fn transform(&self, asset: Asset, _fs: &dyn FileSystem) -> Result<Asset> {
        let code = process_css(&asset, self.targets, |sheet| {
            let rules = std::mem::take(&mut sheet.rules.0);
            sheet.rules.0 = self.pack_media_queries(rules);
        })?;
        Ok(asset.with_contents(code))
    }
}

/// Parse, let `edit` rewrite the AST, then minify and print for `targets`.
fn process_css<F>(asset: &Asset, targets: Targets, edit: F) -> Result<String>
where
    F: FnOnce(&mut StyleSheet<'_>),
{
    let text = asset.text()?;
    let mut sheet = StyleSheet::parse(
        text,
        ParserOptions {
            filename: asset.relative_str(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("parsing {}: {e}", asset.relative_str()))?;

    edit(&mut sheet);

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("minifying {}: {e}", asset.relative_str()))?;

    let out = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("printing {}: {e}", asset.relative_str()))?;

    Ok(out.code)
}
