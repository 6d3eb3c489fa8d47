// src/pipeline/stages/svg.rs

//! SVG stages: attribute stripping and sprite assembly.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::fs::FileSystem;
use crate::pipeline::asset::Asset;
use crate::pipeline::stage::{FileTransform, Stage, StageContext};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Root attributes carried over to each `<symbol>`.
const SYMBOL_ATTRIBUTES: [&str; 2] = ["viewBox", "preserveAspectRatio"];

/// Removes the configured attributes from every element, along with
/// comments, declarations, doctypes, processing instructions and
/// insignificant whitespace.
#[derive(Debug, Clone)]
pub struct SvgMin {
    strip: Vec<String>,
}

impl SvgMin {
    pub fn new(strip: Vec<String>) -> Self {
        Self { strip }
    }

    fn filtered(&self, elem: &BytesStart<'_>) -> Result<BytesStart<'static>> {
        let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
        let mut out = BytesStart::new(name);
        for attr in elem.attributes() {
            let attr = attr.context("malformed attribute")?;
            let key = std::str::from_utf8(attr.key.as_ref()).context("attribute name")?;
            if !self.strip.iter().any(|s| s == key) {
                out.push_attribute(attr);
            }
        }
        Ok(out.into_owned())
    }

    pub fn minify(&self, text: &str) -> Result<String> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        let mut writer = Writer::new(Vec::new());

        loop {
            match reader.read_event().context("parsing svg")? {
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::DocType(_) | Event::PI(_) => {}
                Event::Start(e) => writer.write_event(Event::Start(self.filtered(&e)?))?,
                Event::Empty(e) => writer.write_event(Event::Empty(self.filtered(&e)?))?,
                other => writer.write_event(other)?,
            }
        }

        String::from_utf8(writer.into_inner()).context("svg output is not UTF-8")
    }
}

impl FileTransform for SvgMin {
    fn name(&self) -> &'static str {
        "svgmin"
    }

    fn transform(&self, asset: Asset, _fs: &dyn FileSystem) -> Result<Asset> {
        let out = self.minify(asset.text()?)?;
        Ok(asset.with_contents(out))
    }
}

/// Merges all SVGs into one sprite named `name`; each source becomes a
/// `<symbol>` whose id is the source's file stem.
#[derive(Debug, Clone)]
pub struct SvgStore {
    name: String,
}

impl SvgStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Stage for SvgStore {
    fn name(&self) -> &'static str {
        "svgstore"
    }

    fn apply(&self, assets: Vec<Asset>, _ctx: &mut StageContext) -> Result<Vec<Asset>> {
        let Some(first) = assets.first() else {
            return Ok(Vec::new());
        };
        let base = first.base.clone();

        let mut writer = Writer::new(Vec::new());
        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", SVG_NS));
        writer.write_event(Event::Start(root))?;

        let mut ids = HashSet::new();
        for asset in &assets {
            let id = asset
                .file_stem()
                .with_context(|| format!("no file name in {}", asset.relative.display()))?;
            if !ids.insert(id.to_string()) {
                bail!("duplicate symbol id '{id}' ({})", asset.relative.display());
            }
            write_symbol(&mut writer, id, asset.text()?)
                .with_context(|| format!("adding {} to sprite", asset.relative.display()))?;
        }

        writer.write_event(Event::End(BytesEnd::new("svg")))?;
        let sprite = writer.into_inner();

        Ok(vec![Asset::new(base, &self.name, sprite)])
    }
}

/// Copy the children of the root `<svg>` in `text` into a `<symbol>`.
fn write_symbol(writer: &mut Writer<Vec<u8>>, id: &str, text: &str) -> Result<()> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut opened = false;

    loop {
        let event = reader.read_event().context("parsing svg")?;
        let self_closing = matches!(event, Event::Empty(_));
        match event {
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::DocType(_) | Event::PI(_) => {}
            Event::Start(e) | Event::Empty(e) if !opened => {
                if e.name().as_ref() != b"svg" {
                    bail!("root element is not <svg>");
                }
                let mut symbol = BytesStart::new("symbol");
                symbol.push_attribute(("id", id));
                for attr in e.attributes() {
                    let attr = attr.context("malformed attribute")?;
                    if SYMBOL_ATTRIBUTES.iter().any(|a| a.as_bytes() == attr.key.as_ref()) {
                        symbol.push_attribute(attr);
                    }
                }
                writer.write_event(Event::Start(symbol))?;
                opened = true;
                if self_closing {
                    break;
                }
                depth = 1;
            }
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
                writer.write_event(Event::End(e))?;
            }
            other if opened => writer.write_event(other)?,
            _ => {}
        }
    }

    if !opened {
        bail!("no <svg> element found");
    }
    writer.write_event(Event::End(BytesEnd::new("symbol")))?;
    Ok(())
}
