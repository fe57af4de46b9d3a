use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use ursm_launch::errors::Result;
use ursm_launch::exec::{ExternalJob, JobOutcome, JobRequest};

/// A fake job that:
/// - records every request it was asked to run
/// - immediately reports a canned outcome without spawning anything.
pub struct FakeJob {
    outcome: JobOutcome,
    requests: Arc<Mutex<Vec<JobRequest>>>,
}

impl FakeJob {
    pub fn new(outcome: JobOutcome) -> Self {
        Self {
            outcome,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(JobOutcome::Exited { code: 0 })
    }

    pub fn requests(&self) -> Vec<JobRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ExternalJob for FakeJob {
    fn run(
        &mut self,
        request: JobRequest,
        _cancel: oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = Result<JobOutcome>> + Send + '_>> {
        let outcome = self.outcome;
        let requests = Arc::clone(&self.requests);

        Box::pin(async move {
            requests.lock().unwrap().push(request);
            Ok(outcome)
        })
    }
}
