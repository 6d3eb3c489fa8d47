// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::engine::TaskName;

/// A standing link between file-change patterns and the tasks to re-run.
///
/// Patterns are globs relative to the project root; a leading `!` marks an
/// exclusion, e.g. `["scss/**/*.scss", "!scss/vendor/**"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    pub patterns: Vec<String>,
    pub tasks: Vec<TaskName>,
}

impl WatchBinding {
    pub fn new<P, T>(patterns: P, tasks: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<TaskName>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            tasks: tasks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Compiled form of a [`WatchBinding`].
///
/// The watcher passes root-relative paths with forward slashes (e.g.
/// `"scss/base/_type.scss"`) into [`WatchProfile::matches`].
#[derive(Clone)]
pub struct WatchProfile {
    tasks: Vec<TaskName>,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    pub fn compile(binding: &WatchBinding) -> Result<Self> {
        let (include, exclude) = split_patterns(&binding.patterns);

        let watch_set = build_globset(&include)
            .with_context(|| format!("building watch globset for {:?}", binding.tasks))?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(&exclude)
                    .with_context(|| format!("building exclude globset for {:?}", binding.tasks))?,
            )
        };

        Ok(Self {
            tasks: binding.tasks.clone(),
            watch_set,
            exclude_set,
        })
    }

    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    /// True if `rel_path` matches an include pattern and no exclusion.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Compile every binding into a profile.
pub fn compile_bindings(bindings: &[WatchBinding]) -> Result<Vec<WatchProfile>> {
    bindings.iter().map(WatchProfile::compile).collect()
}

/// Split `!`-prefixed exclusions from include patterns.
pub fn split_patterns<S: AsRef<str>>(patterns: &[S]) -> (Vec<String>, Vec<String>) {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for pat in patterns {
        let pat = pat.as_ref();
        match pat.strip_prefix('!') {
            Some(rest) => exclude.push(rest.to_string()),
            None => include.push(pat.to_string()),
        }
    }
    (include, exclude)
}

/// Build a GlobSet where `*` never crosses a `/`.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
