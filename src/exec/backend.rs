// src/exec/backend.rs

//! Pluggable job backend abstraction.
//!
//! The launcher talks to an `ExternalJob` instead of spawning processes
//! directly. This makes it easy to swap in a fake job in tests while keeping
//! the production implementation in [`process`](super::process).
//!
//! - `ProcessJob` is the default implementation used by `ursm-launch`. It
//!   spawns the child, streams its output into the log file and supervises
//!   timeout and cancellation.
//! - Tests can provide their own `ExternalJob` that, for example, records the
//!   invocation and returns a canned outcome.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::errors::Result;
use crate::exec::invocation::Invocation;

/// Everything a backend needs to run one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub invocation: Invocation,
    /// Destination of the child's combined stdout/stderr (truncated first).
    pub log_path: PathBuf,
    pub timeout: Option<Duration>,
}

/// How a started job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The child terminated on its own (or was killed by an outside signal).
    Exited { code: i32 },
    /// The child outlived the timeout and was killed.
    TimedOut { after: Duration },
    /// Cancellation was requested and the child was killed.
    Cancelled,
}

/// Trait abstracting how the external job is executed.
///
/// Production code uses [`ProcessJob`](super::ProcessJob); tests can provide
/// their own implementation that doesn't spawn real processes.
pub trait ExternalJob: Send {
    /// Run the job to completion.
    ///
    /// Fails with `LaunchError` if the child cannot be started. A sent
    /// `cancel` message stops the job; a dropped sender does not.
    fn run(
        &mut self,
        request: JobRequest,
        cancel: oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = Result<JobOutcome>> + Send + '_>>;
}
