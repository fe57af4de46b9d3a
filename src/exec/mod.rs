// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`invocation`] builds the program/arguments/environment contract of the
//!   external Gibbs-EM program.
//! - [`backend`] provides the `ExternalJob` trait that the launcher runs jobs
//!   through, so tests can swap in a fake.
//! - [`process`] is the production `ExternalJob`: a `tokio::process` child
//!   whose output is streamed into the log file.
//! - [`launcher`] checks preconditions, prepares outputs and maps the job's
//!   outcome onto `LauncherError`.

pub mod backend;
pub mod invocation;
pub mod launcher;
pub mod process;

pub use backend::{ExternalJob, JobOutcome, JobRequest};
pub use invocation::Invocation;
pub use launcher::{Launcher, RunReport};
pub use process::ProcessJob;
