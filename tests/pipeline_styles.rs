// tests/pipeline_styles.rs

mod common;
use crate::common::{init_tracing, write_file, ConfigFileBuilder, TestResult};

use std::sync::Arc;

use assetpipe::fs::{FileSystem, RealFileSystem};
use assetpipe::pipeline::stages::PostProcess;
use assetpipe::pipeline::{Asset, FileTransform};
use assetpipe::tasks::assets::styles_pipeline;
use parcel_sourcemap::SourceMap;

fn post_process(browsers: &[&str], sort: bool, css: &str) -> String {
    let stage = PostProcess::new(browsers, sort).unwrap();
    let asset = Asset::new("/out", "styles.min.css", css.as_bytes().to_vec());
    let out = stage.transform(asset, &RealFileSystem).unwrap();
    String::from_utf8(out.contents).unwrap()
}

#[test]
fn styles_pipeline_skips_broken_files_and_writes_bundle() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write_file(root, "scss/_colors.scss", "$brand: #ff0000;\n");
    write_file(
        root,
        "scss/components/valid.scss",
        "@import '../colors';\n.button { color: $brand; .icon { width: 10px; } }\n",
    );
    write_file(root, "scss/invalid.scss", ".broken { color: red;\n");

    let cfg = ConfigFileBuilder::new().root(root).no_browser().build();
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let report = styles_pipeline(&cfg, fs)?.execute()?;

    // Partials are never compiled on their own.
    assert_eq!(report.files_read, 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("invalid.scss"));
    assert_eq!(report.skipped[0].stage, "compile");

    let css_out = root.join("doc_assets/assets/css");
    // Compiled output is flattened into the output dir.
    let valid = std::fs::read_to_string(css_out.join("valid.css"))?;
    assert!(valid.contains(".button .icon"), "{valid}");
    assert!(!css_out.join("invalid.css").exists());
    assert!(!css_out.join("_colors.css").exists());

    let bundle = std::fs::read_to_string(css_out.join("styles.min.css"))?;
    assert!(!bundle.contains("sourceMappingURL"), "{bundle}");
    assert!(bundle.contains(".button{color:"), "{bundle}");
    assert!(bundle.contains(".button .icon{width:10px}"), "{bundle}");
    assert!(!bundle.contains('\n'), "bundle should be minified: {bundle}");
    Ok(())
}

#[test]
fn compiled_css_carries_an_inline_source_map() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write_file(root, "scss/site/nav.scss", ".nav { a { color: red; } }\n");

    let cfg = ConfigFileBuilder::new().root(root).build();
    styles_pipeline(&cfg, Arc::new(RealFileSystem))?.execute()?;

    let css = std::fs::read_to_string(root.join("doc_assets/assets/css/nav.css"))?;
    assert!(css.contains(".nav a"), "{css}");
    let (_, url) = css
        .split_once("/*# sourceMappingURL=")
        .expect("compiled css should end with a source map");
    let url = url.trim_end().trim_end_matches("*/").trim_end();
    assert!(url.starts_with("data:application/json;base64,"), "{url}");

    let map = SourceMap::from_data_url("/", url)?;
    assert_eq!(map.get_sources(), &vec!["site/nav.scss".to_string()]);
    assert!(!map.get_mappings().is_empty());
    Ok(())
}

#[test]
fn source_maps_can_be_turned_off() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write_file(root, "scss/nav.scss", ".nav { color: red; }\n");

    let cfg = ConfigFileBuilder::new()
        .root(root)
        .with_raw(|raw| raw.styles.source_maps = false)
        .build();
    styles_pipeline(&cfg, Arc::new(RealFileSystem))?.execute()?;

    let css = std::fs::read_to_string(root.join("doc_assets/assets/css/nav.css"))?;
    assert!(!css.contains("sourceMappingURL"), "{css}");
    Ok(())
}

#[test]
fn styles_pipeline_with_no_sources_writes_nothing() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = ConfigFileBuilder::new().root(dir.path()).build();

    let report = styles_pipeline(&cfg, Arc::new(RealFileSystem))?.execute()?;

    assert_eq!(report.files_read, 0);
    assert_eq!(report.files_written, 0);
    assert!(!dir.path().join("doc_assets").exists());
    Ok(())
}

#[test]
fn identical_media_queries_are_merged_after_plain_rules() {
    let css = "\
@media (min-width: 900px) { .a { color: red } }
.b { color: blue }
@media (min-width: 300px) { .c { color: green } }
@media (min-width: 900px) { .d { color: black } }
.e { margin: 0 }
";
    let out = post_process(&["chrome 100"], true, css);

    assert_eq!(out.matches("@media").count(), 2, "{out}");

    let first_media = out.find("@media").unwrap();
    assert!(out.find(".b{").unwrap() < first_media, "{out}");
    assert!(out.find(".e{").unwrap() < first_media, "{out}");

    // Ascending min-width, merged rules kept together.
    let narrow = out.find(".c{").unwrap();
    let wide_a = out.find(".a{").unwrap();
    let wide_d = out.find(".d{").unwrap();
    assert!(narrow < wide_a && wide_a < wide_d, "{out}");
}

#[test]
fn unsorted_packing_keeps_first_occurrence_order() {
    let css = "\
@media (min-width: 900px) { .a { color: red } }
@media (min-width: 300px) { .c { color: green } }
@media (min-width: 900px) { .d { color: black } }
";
    let out = post_process(&["chrome 100"], false, css);

    assert_eq!(out.matches("@media").count(), 2, "{out}");
    assert!(out.find(".a{").unwrap() < out.find(".c{").unwrap(), "{out}");
}

#[test]
fn vendor_prefixes_follow_browser_targets() {
    let css = ".x { user-select: none }";

    let old = post_process(&["safari 10"], true, css);
    assert!(old.contains("-webkit-user-select:none"), "{old}");
}

#[test]
fn min_width_is_read_in_pixels() {
    let stage = PostProcess::new(&["chrome 100"], true).unwrap();

    assert_eq!(stage.min_width_px("(min-width: 768px)"), Some(768.0));
    assert_eq!(stage.min_width_px("screen and (min-width:40em)"), Some(640.0));
    assert_eq!(stage.min_width_px("(min-width: 2rem)"), Some(32.0));
    assert_eq!(stage.min_width_px("(width >= 1024px)"), Some(1024.0));
    assert_eq!(stage.min_width_px("(max-width: 600px)"), None);
    assert_eq!(stage.min_width_px("print"), None);
}

#[test]
fn invalid_browser_query_is_rejected() {
    assert!(PostProcess::new(&["not a browser at all"], true).is_err());
}
