use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use assetpipe::engine::{RunOutcome, RuntimeEvent, TaskName};
use assetpipe::exec::RunBackend;
use assetpipe::errors::Result;

/// A fake run backend that:
/// - records every started run and every cancellation
/// - immediately reports `RunFinished` with the next scripted outcome
///   (`Success` once the script is exhausted).
pub struct FakeRunBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    outcomes: VecDeque<RunOutcome>,
    pub started: Arc<Mutex<Vec<(u64, Vec<TaskName>)>>>,
    pub cancelled: Arc<Mutex<Vec<u64>>>,
}

impl FakeRunBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            outcomes: VecDeque::new(),
            started: Arc::new(Mutex::new(Vec::new())),
            cancelled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcomes(mut self, outcomes: Vec<RunOutcome>) -> Self {
        self.outcomes = outcomes.into();
        self
    }
}

impl RunBackend for FakeRunBackend {
    fn start_run(
        &mut self,
        run_id: u64,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.started.lock().unwrap().push((run_id, tasks));
        let outcome = self.outcomes.pop_front().unwrap_or(RunOutcome::Success);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tx.send(RuntimeEvent::RunFinished { run_id, outcome })
                .await
                .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }

    fn cancel_run(&mut self, run_id: u64) {
        self.cancelled.lock().unwrap().push(run_id);
    }
}
