// tests/config_validation.rs

mod common;
use crate::common::{write_file, ConfigFileBuilder, TestResult};

use assetpipe::config::{load_and_validate, ConfigFile, RawConfigFile};
use assetpipe::errors::AssetpipeError;
use assetpipe::types::{OutputStyle, TriggerWhileRunningBehaviour};

fn expect_config_error(raw: RawConfigFile, needle: &str) {
    match ConfigFile::try_from(raw) {
        Err(AssetpipeError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "'{msg}' should mention '{needle}'")
        }
        other => panic!("expected ConfigError mentioning {needle}, got {other:?}"),
    }
}

#[test]
fn defaults_are_valid() {
    let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();

    assert_eq!(cfg.paths.scss, "scss");
    assert_eq!(cfg.paths.css_out, "doc_assets/assets/css");
    assert_eq!(cfg.styles.bundle_name, "styles.min.css");
    assert_eq!(cfg.icons.strip_attributes, vec!["fill", "fill-rule"]);
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.watch.queue_length, 1);
}

#[test]
fn empty_path_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.paths.twig = "  ".to_string();
    expect_config_error(raw, "[paths].twig");
}

#[test]
fn watched_source_dirs_must_be_inside_the_root() {
    let mut raw = RawConfigFile::default();
    raw.paths.scss = "/srv/site/scss".to_string();
    expect_config_error(raw, "[paths].scss");

    let mut raw = RawConfigFile::default();
    raw.paths.twig = "../shared/twig".to_string();
    expect_config_error(raw, "[paths].twig");

    // Output dirs may live anywhere.
    let mut raw = RawConfigFile::default();
    raw.paths.css_out = "/var/www/css".to_string();
    assert!(ConfigFile::try_from(raw).is_ok());
}

#[test]
fn bundle_name_must_be_a_file_name() {
    let mut raw = RawConfigFile::default();
    raw.styles.bundle_name = "css/styles.min.css".to_string();
    expect_config_error(raw, "[styles].bundle_name");
}

#[test]
fn sprite_name_must_be_a_file_name() {
    let mut raw = RawConfigFile::default();
    raw.icons.sprite_name = String::new();
    expect_config_error(raw, "[icons].sprite_name");
}

#[test]
fn browsers_must_not_be_empty() {
    let mut raw = RawConfigFile::default();
    raw.styles.browsers.clear();
    expect_config_error(raw, "[styles].browsers");
}

#[test]
fn invalid_browserslist_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.styles.browsers = vec!["definitely not a browser query".to_string()];
    expect_config_error(raw, "browserslist");
}

#[test]
fn zero_queue_length_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.watch.queue_length = 0;
    expect_config_error(raw, "queue_length");
}

#[test]
fn empty_tool_command_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.backstop.command = String::new();
    expect_config_error(raw, "[backstop].command");
}

#[test]
fn builder_overrides_apply() {
    let cfg = ConfigFileBuilder::new()
        .browsers(&["safari 10"])
        .watch_behaviour(TriggerWhileRunningBehaviour::Cancel, 3)
        .no_browser()
        .build();

    assert_eq!(cfg.styles.browsers, vec!["safari 10"]);
    assert_eq!(
        cfg.watch.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );
    assert_eq!(cfg.watch.queue_length, 3);
    assert!(!cfg.server.open);
}

#[test]
fn file_is_loaded_and_rooted_at_its_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_file(
        dir.path(),
        "site/Assetpipe.toml",
        r#"
[paths]
scss = "sass"

[styles]
output_style = "compressed"
browsers = ["last 2 versions"]

[watch]
triggered_while_running_behaviour = "cancel"
queue_length = 2
"#,
    );

    let cfg = load_and_validate(dir.path().join("site/Assetpipe.toml"))?;

    assert_eq!(cfg.root(), dir.path().join("site"));
    assert_eq!(cfg.paths.scss, "sass");
    // Unset keys keep their defaults.
    assert_eq!(cfg.paths.twig, "twig");
    assert_eq!(cfg.styles.output_style, OutputStyle::Compressed);
    assert_eq!(
        cfg.watch.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );
    assert_eq!(cfg.resolve(&cfg.paths.scss), dir.path().join("site/sass"));
    assert_eq!(cfg.glob_under("./sass/", "**/*.scss"), "sass/**/*.scss");
    Ok(())
}

#[test]
fn unknown_keys_are_toml_errors() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "Assetpipe.toml", "[paths]\nless = \"less\"\n");

    let result = load_and_validate(dir.path().join("Assetpipe.toml"));
    assert!(matches!(result, Err(AssetpipeError::TomlError(_))), "{result:?}");
    Ok(())
}

#[test]
fn invalid_behaviour_is_a_toml_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_file(
        dir.path(),
        "Assetpipe.toml",
        "[watch]\ntriggered_while_running_behaviour = \"restart\"\n",
    );

    let result = load_and_validate(dir.path().join("Assetpipe.toml"));
    assert!(matches!(result, Err(AssetpipeError::TomlError(_))), "{result:?}");
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/Assetpipe.toml");
    assert!(matches!(result, Err(AssetpipeError::IoError(_))), "{result:?}");
}
