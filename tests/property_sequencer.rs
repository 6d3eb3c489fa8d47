use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use assetpipe::dag::Sequencer;
use assetpipe_test_utils::builders::{recorded, Recorder, RegistryBuilder};

// Strategy to generate a valid task graph.
// Acyclicity: task N may only depend on tasks 0..N-1.
fn graph_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    // Keep declared order, drop duplicates and forward edges.
                    let mut seen = HashSet::new();
                    potential
                        .into_iter()
                        .filter(|_| i > 0)
                        .map(|d| d % i.max(1))
                        .filter(|d| seen.insert(*d))
                        .collect()
                })
                .collect()
        })
    })
}

fn build(deps: &[Vec<usize>]) -> (Sequencer, Recorder) {
    let names: Vec<String> = (0..deps.len()).map(|i| format!("task_{i}")).collect();
    let mut builder = RegistryBuilder::new();
    for (i, task_deps) in deps.iter().enumerate() {
        let prereqs: Vec<&str> = task_deps.iter().map(|d| names[*d].as_str()).collect();
        builder = builder.task(&names[i], &prereqs);
    }
    let (registry, log) = builder.build();
    (Sequencer::new(Arc::new(registry)), log)
}

proptest! {
    #[test]
    fn every_prerequisite_runs_once_and_before_its_dependents(
        deps in graph_strategy(10),
        pick in any::<usize>(),
    ) {
        let (sequencer, log) = build(&deps);
        let target = format!("task_{}", pick % deps.len());

        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(sequencer.run(&[target.as_str()])).unwrap();

        let executed = recorded(&log);

        // Exactly once.
        let unique: HashSet<&String> = executed.iter().collect();
        prop_assert_eq!(unique.len(), executed.len());

        // Target is last.
        prop_assert_eq!(executed.last(), Some(&target));

        // Every prerequisite precedes its dependent.
        let position: HashMap<&str, usize> =
            executed.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
        for name in &executed {
            let idx: usize = name.trim_start_matches("task_").parse().unwrap();
            for dep in &deps[idx] {
                let dep_name = format!("task_{dep}");
                let dep_pos = position.get(dep_name.as_str()).copied();
                prop_assert!(dep_pos.is_some(), "{} ran without {}", name, dep_name);
                prop_assert!(dep_pos.unwrap() < position[name.as_str()]);
            }
        }

        // Running the plan and resolving it agree.
        prop_assert_eq!(sequencer.plan(&[target.as_str()]).unwrap(), executed);
    }
}
