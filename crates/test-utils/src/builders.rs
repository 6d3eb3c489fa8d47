#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetpipe::config::{ConfigFile, RawConfigFile};
use assetpipe::dag::{action_fn, TaskAction, TaskDef, TaskRegistry};
use assetpipe::errors::{AssetpipeError, Result};
use assetpipe::types::TriggerWhileRunningBehaviour;

/// Shared log of executed task names, in execution order.
pub type Recorder = Arc<Mutex<Vec<String>>>;

pub fn recorder() -> Recorder {
    Arc::new(Mutex::new(Vec::new()))
}

/// Snapshot of a recorder's contents.
pub fn recorded(log: &Recorder) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Action that appends `name` to `log` and succeeds.
pub fn recording_action(log: &Recorder, name: &str) -> Arc<dyn TaskAction> {
    let log = Arc::clone(log);
    let name = name.to_string();
    action_fn(move || {
        let log = Arc::clone(&log);
        let name = name.clone();
        async move {
            log.lock().unwrap().push(name);
            Result::Ok(())
        }
    })
}

/// Action that records `name`, then fails with `message`.
pub fn failing_action(log: &Recorder, name: &str, message: &str) -> Arc<dyn TaskAction> {
    let log = Arc::clone(log);
    let name = name.to_string();
    let message = message.to_string();
    action_fn(move || {
        let log = Arc::clone(&log);
        let name = name.clone();
        let message = message.clone();
        async move {
            log.lock().unwrap().push(name);
            let result: Result<()> = Err(AssetpipeError::Other(anyhow::anyhow!(message)));
            result
        }
    })
}

/// Action that records `name` and then sleeps for `delay`.
pub fn slow_action(log: &Recorder, name: &str, delay: Duration) -> Arc<dyn TaskAction> {
    let log = Arc::clone(log);
    let name = name.to_string();
    action_fn(move || {
        let log = Arc::clone(&log);
        let name = name.clone();
        async move {
            log.lock().unwrap().push(name);
            tokio::time::sleep(delay).await;
            Result::Ok(())
        }
    })
}

/// Builder for a `TaskRegistry` whose actions record into one shared log.
pub struct RegistryBuilder {
    log: Recorder,
    defs: Vec<TaskDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            log: recorder(),
            defs: Vec::new(),
        }
    }

    pub fn log(&self) -> Recorder {
        Arc::clone(&self.log)
    }

    /// Task with a recording action.
    pub fn task(mut self, name: &str, prerequisites: &[&str]) -> Self {
        let action = recording_action(&self.log, name);
        self.defs.push(
            TaskDef::new(name)
                .with_prerequisites(prerequisites.iter().copied())
                .with_action(action),
        );
        self
    }

    /// Task without an action.
    pub fn composite(mut self, name: &str, prerequisites: &[&str]) -> Self {
        self.defs
            .push(TaskDef::new(name).with_prerequisites(prerequisites.iter().copied()));
        self
    }

    pub fn failing(mut self, name: &str, prerequisites: &[&str], message: &str) -> Self {
        let action = failing_action(&self.log, name, message);
        self.defs.push(
            TaskDef::new(name)
                .with_prerequisites(prerequisites.iter().copied())
                .with_action(action),
        );
        self
    }

    pub fn slow(mut self, name: &str, prerequisites: &[&str], delay: Duration) -> Self {
        let action = slow_action(&self.log, name, delay);
        self.defs.push(
            TaskDef::new(name)
                .with_prerequisites(prerequisites.iter().copied())
                .with_action(action),
        );
        self
    }

    pub fn def(mut self, def: TaskDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Register everything; panics on duplicate names.
    pub fn build(self) -> (TaskRegistry, Recorder) {
        let mut registry = TaskRegistry::new();
        for def in self.defs {
            registry.register(def).expect("duplicate task in RegistryBuilder");
        }
        (registry, self.log)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
    root: Option<std::path::PathBuf>,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
            root: None,
        }
    }

    pub fn root(mut self, root: &Path) -> Self {
        self.root = Some(root.to_path_buf());
        self
    }

    pub fn with_raw(mut self, edit: impl FnOnce(&mut RawConfigFile)) -> Self {
        edit(&mut self.config);
        self
    }

    pub fn browsers(mut self, browsers: &[&str]) -> Self {
        self.config.styles.browsers = browsers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn watch_behaviour(mut self, behaviour: TriggerWhileRunningBehaviour, queue_length: usize) -> Self {
        self.config.watch.triggered_while_running_behaviour = behaviour;
        self.config.watch.queue_length = queue_length;
        self
    }

    pub fn no_browser(mut self) -> Self {
        self.config.server.open = false;
        self.config.server.port = 0;
        self
    }

    pub fn build(self) -> ConfigFile {
        let cfg = ConfigFile::try_from(self.config).expect("Failed to build valid config from builder");
        match self.root {
            Some(root) => cfg.with_root(root),
            None => cfg,
        }
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
