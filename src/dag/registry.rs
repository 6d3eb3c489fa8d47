// src/dag/registry.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::task::TaskDef;
use crate::engine::TaskName;
use crate::errors::{AssetpipeError, Result};

/// Holds every named task for the lifetime of the process.
///
/// Registration order is free: prerequisites are only checked when a plan
/// is resolved (or eagerly via [`TaskRegistry::validate`]).
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskDef>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task definition. Fails if the name is already taken.
    pub fn register(&mut self, def: TaskDef) -> Result<()> {
        if self.tasks.contains_key(def.name()) {
            return Err(AssetpipeError::DuplicateTask(def.name().to_string()));
        }
        debug!(
            task = %def.name(),
            prerequisites = ?def.prerequisites(),
            "registered task"
        );
        self.tasks.insert(def.name().to_string(), def);
        Ok(())
    }

    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Result<&TaskDef> {
        self.tasks
            .get(name)
            .ok_or_else(|| AssetpipeError::UnknownTask(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDef> {
        self.tasks.values()
    }

    /// Check the whole registry: every prerequisite must name a registered
    /// task, and the prerequisite graph must be acyclic.
    pub fn validate(&self) -> Result<()> {
        for def in self.tasks.values() {
            for dep in def.prerequisites() {
                if dep == def.name() {
                    return Err(AssetpipeError::DagCycle(format!(
                        "task '{}' lists itself as a prerequisite",
                        dep
                    )));
                }
                if !self.tasks.contains_key(dep) {
                    return Err(AssetpipeError::UnknownTask(format!(
                        "{dep} (prerequisite of '{}')",
                        def.name()
                    )));
                }
            }
        }

        // Edge direction: prerequisite -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.tasks.keys() {
            graph.add_node(name.as_str());
        }
        for def in self.tasks.values() {
            for dep in def.prerequisites() {
                graph.add_edge(dep.as_str(), def.name(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(AssetpipeError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))),
        }
    }
}
