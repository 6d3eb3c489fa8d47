// src/config/validate.rs

use std::path::Path;

use lightningcss::targets::Browsers;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetpipeError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AssetpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_styles(cfg)?;
    validate_icons(cfg)?;
    validate_tools(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let p = &cfg.paths;
    let entries = [
        ("html", &p.html),
        ("twig", &p.twig),
        ("scss", &p.scss),
        ("icons", &p.icons),
        ("styleguide", &p.styleguide),
        ("css_out", &p.css_out),
        ("icons_out", &p.icons_out),
    ];
    for (key, value) in entries {
        if value.trim().is_empty() {
            return Err(AssetpipeError::ConfigError(format!(
                "[paths].{key} must not be empty"
            )));
        }
    }
    // Watched dirs become root-relative globs.
    for (key, value) in [("scss", &p.scss), ("twig", &p.twig)] {
        let path = Path::new(value);
        if path.is_absolute() || path.starts_with("..") {
            return Err(AssetpipeError::ConfigError(format!(
                "[paths].{key} must be inside the project root, got {value:?}"
            )));
        }
    }
    if cfg.server.base_dir.trim().is_empty() {
        return Err(AssetpipeError::ConfigError(
            "[server].base_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_styles(cfg: &RawConfigFile) -> Result<()> {
    ensure_file_name("[styles].bundle_name", &cfg.styles.bundle_name)?;

    if cfg.styles.browsers.is_empty() {
        return Err(AssetpipeError::ConfigError(
            "[styles].browsers must contain at least one query".to_string(),
        ));
    }

    match Browsers::from_browserslist(cfg.styles.browsers.iter()) {
        Ok(_) => Ok(()),
        Err(e) => Err(AssetpipeError::ConfigError(format!(
            "[styles].browsers is not a valid browserslist query: {e}"
        ))),
    }
}

fn validate_icons(cfg: &RawConfigFile) -> Result<()> {
    ensure_file_name("[icons].sprite_name", &cfg.icons.sprite_name)?;

    if cfg.icons.strip_attributes.iter().any(|a| a.trim().is_empty()) {
        return Err(AssetpipeError::ConfigError(
            "[icons].strip_attributes must not contain empty names".to_string(),
        ));
    }
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    if cfg.styleguide.command.trim().is_empty() {
        return Err(AssetpipeError::ConfigError(
            "[styleguide].command must not be empty".to_string(),
        ));
    }
    if cfg.backstop.command.trim().is_empty() {
        return Err(AssetpipeError::ConfigError(
            "[backstop].command must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    // triggered_while_running_behaviour is strongly typed and validated
    // during deserialization.
    if cfg.watch.queue_length == 0 {
        return Err(AssetpipeError::ConfigError(
            "[watch].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Output names must be a bare file name, not a path.
fn ensure_file_name(key: &str, name: &str) -> Result<()> {
    let is_bare = Path::new(name)
        .file_name()
        .map(|f| f == name)
        .unwrap_or(false);

    if name.trim().is_empty() || !is_bare {
        return Err(AssetpipeError::ConfigError(format!(
            "{key} must be a plain file name (got {name:?})"
        )));
    }
    Ok(())
}
