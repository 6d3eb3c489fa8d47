// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{OutputStyle, TriggerWhileRunningBehaviour};

/// Configuration as read from `Assetpipe.toml`, before validation.
///
/// ```toml
/// [paths]
/// scss = "scss"
/// css_out = "doc_assets/assets/css"
///
/// [styles]
/// browsers = ["> 1%", "last 2 versions"]
///
/// [server]
/// port = 3000
/// ```
///
/// All sections are optional and default to the layout the tasks were
/// originally written for.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub icons: IconsSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub styleguide: StyleguideSection,

    #[serde(default)]
    pub backstop: BackstopSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Constructed once at startup (see [`crate::config::load_and_validate`]) and
/// passed by reference into every task constructor. All relative paths are
/// interpreted against [`ConfigFile::root`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    root: PathBuf,
    pub paths: PathsSection,
    pub styles: StylesSection,
    pub icons: IconsSection,
    pub server: ServerSection,
    pub styleguide: StyleguideSection,
    pub backstop: BackstopSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    /// Build a `ConfigFile` without running validation. Only used by
    /// `TryFrom<RawConfigFile>` after the checks have passed.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            root: PathBuf::from("."),
            paths: raw.paths,
            styles: raw.styles,
            icons: raw.icons,
            server: raw.server,
            styleguide: raw.styleguide,
            backstop: raw.backstop,
            watch: raw.watch,
        }
    }

    /// Re-root the configuration (usually at the config file's directory).
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Project root all relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Glob pattern for files under a configured directory, relative to the
    /// project root (as used by watch bindings).
    pub fn glob_under(&self, dir: &str, pattern: &str) -> String {
        let dir = dir.trim_start_matches("./").trim_end_matches('/');
        if dir.is_empty() || dir == "." {
            pattern.to_string()
        } else {
            format!("{dir}/{pattern}")
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile::new_unchecked(RawConfigFile::default())
    }
}

/// `[paths]` section: source and destination directories.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    /// Rendered static markup (template output, server base dir).
    pub html: String,
    /// Template sources.
    pub twig: String,
    /// Stylesheet sources.
    pub scss: String,
    /// SVG icon sources.
    pub icons: String,
    /// Generated style-guide documentation (target of `clean`).
    pub styleguide: String,
    /// Compiled and minified stylesheets.
    pub css_out: String,
    /// Icon sprite output.
    pub icons_out: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            html: "html".to_string(),
            twig: "twig".to_string(),
            scss: "scss".to_string(),
            icons: "icons".to_string(),
            styleguide: "styleguide".to_string(),
            css_out: "doc_assets/assets/css".to_string(),
            icons_out: "doc_assets/assets/icons".to_string(),
        }
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesSection {
    /// `"expanded"` (default) or `"compressed"`.
    pub output_style: OutputStyle,
    /// Extra load paths for `@import`/`@use`; the scss dir is always included.
    pub include_paths: Vec<String>,
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
    /// Sort packed media queries by ascending `min-width`.
    pub sort_media_queries: bool,
    /// Append an inline source map to each compiled stylesheet.
    pub source_maps: bool,
    /// File name of the concatenated, minified bundle.
    pub bundle_name: String,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            output_style: OutputStyle::Expanded,
            include_paths: Vec::new(),
            browsers: vec!["> 1%".to_string(), "last 2 versions".to_string()],
            sort_media_queries: true,
            source_maps: true,
            bundle_name: "styles.min.css".to_string(),
        }
    }
}

/// `[icons]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconsSection {
    /// Presentation attributes stripped from every icon element.
    pub strip_attributes: Vec<String>,
    /// File name of the generated sprite.
    pub sprite_name: String,
}

impl Default for IconsSection {
    fn default() -> Self {
        Self {
            strip_attributes: vec!["fill".to_string(), "fill-rule".to_string()],
            sprite_name: "icons.svg".to_string(),
        }
    }
}

/// `[server]` section for the live-reload server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Directory served at `/`.
    pub base_dir: String,
    /// Port on 127.0.0.1; `0` picks a free port.
    pub port: u16,
    /// Open the default browser once the server is up.
    pub open: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_dir: "html".to_string(),
            port: 3000,
            open: true,
        }
    }
}

/// `[styleguide]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleguideSection {
    /// Documentation generator executable.
    pub command: String,
    /// Generator config, passed as the only argument.
    pub config: String,
}

impl Default for StyleguideSection {
    fn default() -> Self {
        Self {
            command: "hologram".to_string(),
            config: "hologram_config.yml".to_string(),
        }
    }
}

/// `[backstop]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackstopSection {
    /// Visual-regression tool executable.
    pub command: String,
    /// Optional `--config=<path>` argument.
    pub config: Option<String>,
}

impl Default for BackstopSection {
    fn default() -> Self {
        Self {
            command: "backstop".to_string(),
            config: None,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSection {
    /// `"queue"` (default) or `"cancel"`.
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,
    /// Maximum number of queued runs to remember.
    pub queue_length: usize,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::Queue,
            queue_length: 1,
        }
    }
}
