// src/tasks/external.rs

//! Tasks delegating to external tools.

use std::fmt;

use crate::config::model::ConfigFile;
use crate::exec::ExternalCommand;

/// Modes of the visual-regression tool, one task each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackstopMode {
    Reference,
    Test,
    Approve,
    OpenReport,
}

impl BackstopMode {
    pub const ALL: [BackstopMode; 4] = [
        BackstopMode::Reference,
        BackstopMode::Test,
        BackstopMode::Approve,
        BackstopMode::OpenReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackstopMode::Reference => "reference",
            BackstopMode::Test => "test",
            BackstopMode::Approve => "approve",
            BackstopMode::OpenReport => "openReport",
        }
    }

    pub fn task_name(&self) -> String {
        format!("backstop:{}", self.as_str())
    }
}

impl fmt::Display for BackstopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `backstop <mode> [--config=<path>]`, run from the project root.
pub fn backstop_command(cfg: &ConfigFile, mode: BackstopMode) -> ExternalCommand {
    let mut cmd = ExternalCommand::new(&cfg.backstop.command)
        .arg(mode.as_str())
        .current_dir(cfg.root());
    if let Some(config) = &cfg.backstop.config {
        cmd = cmd.arg(format!("--config={config}"));
    }
    cmd
}

/// `hologram <config>`, run from the project root.
pub fn styleguide_command(cfg: &ConfigFile) -> ExternalCommand {
    ExternalCommand::new(&cfg.styleguide.command)
        .arg(&cfg.styleguide.config)
        .current_dir(cfg.root())
}
