// tests/pipeline_icons.rs

mod common;
use crate::common::{init_tracing, ConfigFileBuilder};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetpipe::fs::mock::MockFileSystem;
use assetpipe::fs::FileSystem;
use assetpipe::pipeline::stages::SvgMin;
use assetpipe::tasks::assets::icons_pipeline;

const ARROW: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported -->
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24">
  <path fill="#000" fill-rule="evenodd" d="M0 0h24v24H0z"/>
</svg>
"##;

const CLOSE: &str = r#"<svg viewBox="0 0 16 16"><g fill="red"><path d="M1 1l14 14"/></g></svg>"#;

#[test]
fn icons_are_stripped_and_merged_into_one_sprite() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/icons/arrow.svg", ARROW);
    fs.add_file("/proj/icons/ui/close.svg", CLOSE);
    fs.add_file("/proj/icons/readme.txt", "not an icon");

    let cfg = ConfigFileBuilder::new().root(Path::new("/proj")).build();
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());

    let report = icons_pipeline(&cfg, shared).unwrap().execute().unwrap();
    assert_eq!(report.files_read, 2);
    assert_eq!(report.files_written, 1);

    let written: Vec<PathBuf> = fs
        .file_paths()
        .into_iter()
        .filter(|p| p.starts_with("/proj/doc_assets"))
        .collect();
    assert_eq!(written, vec![PathBuf::from("/proj/doc_assets/assets/icons/icons.svg")]);

    let sprite = fs.read_to_string(&written[0]).unwrap();
    assert!(sprite.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg">"#), "{sprite}");
    assert!(sprite.contains(r#"<symbol id="arrow" viewBox="0 0 24 24">"#), "{sprite}");
    assert!(sprite.contains(r#"<symbol id="close" viewBox="0 0 16 16">"#), "{sprite}");
    assert!(sprite.contains(r#"<path d="M0 0h24v24H0z"/>"#), "{sprite}");
    assert!(!sprite.contains("fill"), "{sprite}");
    assert!(!sprite.contains("width=\"24\""), "{sprite}");
    assert!(!sprite.contains("exported"), "{sprite}");
    assert_eq!(sprite.matches("<symbol").count(), 2);
}

#[test]
fn duplicate_symbol_ids_fail_the_pipeline() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/icons/a/close.svg", CLOSE);
    fs.add_file("/proj/icons/b/close.svg", CLOSE);

    let cfg = ConfigFileBuilder::new().root(Path::new("/proj")).build();
    let err = icons_pipeline(&cfg, Arc::new(fs.clone()))
        .unwrap()
        .execute()
        .unwrap_err();

    assert!(format!("{err:#}").contains("duplicate symbol id 'close'"), "{err:#}");
    assert!(!fs.exists(Path::new("/proj/doc_assets/assets/icons/icons.svg")));
}

#[test]
fn no_icons_means_no_sprite() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/icons");

    let cfg = ConfigFileBuilder::new().root(Path::new("/proj")).build();
    let report = icons_pipeline(&cfg, Arc::new(fs.clone()))
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(report.files_written, 0);
    assert!(fs.file_paths().is_empty());
}

#[test]
fn svgmin_keeps_unlisted_attributes() {
    let min = SvgMin::new(vec!["stroke".to_string()]);

    let out = min
        .minify(r#"<svg viewBox="0 0 1 1"><path stroke="red" fill="blue"/></svg>"#)
        .unwrap();

    assert_eq!(out, r#"<svg viewBox="0 0 1 1"><path fill="blue"/></svg>"#);
}

#[test]
fn malformed_svg_is_an_error() {
    let min = SvgMin::new(Vec::new());
    assert!(min.minify("<svg><g></svg>").is_err());
}
