// tests/registry.rs

mod common;
use crate::common::{init_tracing, RegistryBuilder};

use assetpipe::dag::{TaskDef, TaskRegistry};
use assetpipe::errors::AssetpipeError;

#[test]
fn duplicate_registration_fails() {
    init_tracing();

    let mut registry = TaskRegistry::new();
    registry.register(TaskDef::new("styles")).unwrap();

    match registry.register(TaskDef::new("styles")) {
        Err(AssetpipeError::DuplicateTask(name)) => assert_eq!(name, "styles"),
        other => panic!("expected DuplicateTask, got {other:?}"),
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn unknown_task_lookup_fails() {
    let registry = TaskRegistry::new();
    match registry.get("nope") {
        Err(AssetpipeError::UnknownTask(name)) => assert_eq!(name, "nope"),
        other => panic!("expected UnknownTask, got {other:?}"),
    }
}

#[test]
fn registration_order_is_free() {
    // A prerequisite may be registered after its dependent.
    let (registry, _log) = RegistryBuilder::new()
        .task("build", &["icons"])
        .task("icons", &[])
        .build();

    registry.validate().unwrap();
    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, vec!["build", "icons"]);
}

#[test]
fn validate_reports_unknown_prerequisite() {
    let (registry, _log) = RegistryBuilder::new().task("build", &["missing"]).build();

    match registry.validate() {
        Err(AssetpipeError::UnknownTask(msg)) => {
            assert!(msg.contains("missing"));
            assert!(msg.contains("build"));
        }
        other => panic!("expected UnknownTask, got {other:?}"),
    }
}

#[test]
fn validate_reports_cycles() {
    let (registry, _log) = RegistryBuilder::new()
        .task("a", &["b"])
        .task("b", &["c"])
        .task("c", &["a"])
        .build();

    assert!(matches!(registry.validate(), Err(AssetpipeError::DagCycle(_))));
}

#[test]
fn validate_reports_self_dependency() {
    let (registry, _log) = RegistryBuilder::new().task("a", &["a"]).build();

    match registry.validate() {
        Err(AssetpipeError::DagCycle(msg)) => assert!(msg.contains("itself")),
        other => panic!("expected DagCycle, got {other:?}"),
    }
}
