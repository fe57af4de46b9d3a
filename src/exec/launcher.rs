// src/exec/launcher.rs

//! Turns a validated `RunConfig` into one supervised run of the external job.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::config::model::SCRIPT_PATH;
use crate::errors::{LauncherError, Result};
use crate::exec::backend::{ExternalJob, JobOutcome, JobRequest};
use crate::exec::invocation::Invocation;
use crate::exec::process::ProcessJob;
use crate::fs::{FileSystem, RealFileSystem};

/// Result of a run whose child exited with status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub exit_code: i32,
    pub log_path: PathBuf,
    pub elapsed: Duration,
}

pub struct Launcher<F, J> {
    fs: F,
    job: J,
}

impl Launcher<RealFileSystem, ProcessJob> {
    /// Launcher backed by the real filesystem and real child processes.
    pub fn new(job: ProcessJob) -> Self {
        Self::with_parts(RealFileSystem, job)
    }
}

impl<F: FileSystem, J: ExternalJob> Launcher<F, J> {
    pub fn with_parts(fs: F, job: J) -> Self {
        Self { fs, job }
    }

    pub fn job(&self) -> &J {
        &self.job
    }

    /// Check every input the run depends on, without side effects.
    pub fn check_preconditions(&self, cfg: &RunConfig) -> Result<()> {
        let script = cfg.script_path();
        if !self.fs.is_file(script) {
            return Err(missing(SCRIPT_PATH, script));
        }
        match cfg.interpreter() {
            None if !self.fs.is_executable(script) => {
                return Err(missing(
                    "script_path (not executable and no interpreter configured)",
                    script,
                ));
            }
            Some(_) if !self.fs.is_readable(script) => {
                return Err(missing("script_path (not readable)", script));
            }
            _ => {}
        }

        let optional = cfg.tuning().input_files();
        for (key, path) in cfg.input_files().into_iter().chain(optional) {
            if !self.fs.is_file(path) {
                return Err(missing(key, path));
            }
            if !self.fs.is_readable(path) {
                return Err(missing(&format!("{key} (not readable)"), path));
            }
        }

        Ok(())
    }

    /// Create the output directory and the parents of both log files.
    pub fn prepare_outputs(&self, cfg: &RunConfig) -> Result<()> {
        self.ensure_dir(cfg.output_directory())?;
        for log in [cfg.log_path(), cfg.program_log()] {
            if let Some(parent) = log.parent()
                && !parent.as_os_str().is_empty()
            {
                self.ensure_dir(parent)?;
            }
        }
        Ok(())
    }

    /// Run the external job once.
    ///
    /// Consumes the configuration: one `RunConfig`, one attempt. Returns a
    /// report only if the child exited with status 0; every other ending is
    /// an error carrying the log path.
    pub async fn launch(
        &mut self,
        config: RunConfig,
        cancel: oneshot::Receiver<()>,
    ) -> Result<RunReport> {
        log_run_header(&config);

        self.check_preconditions(&config)?;
        self.prepare_outputs(&config)?;

        let log_path = config.log_path().to_path_buf();
        let request = JobRequest {
            invocation: Invocation::for_run(&config),
            log_path: log_path.clone(),
            timeout: config.timeout(),
        };

        let started = Instant::now();
        let outcome = self.job.run(request, cancel).await?;
        let elapsed = started.elapsed();
        info!(?outcome, elapsed = ?elapsed, "run finished");

        match outcome {
            JobOutcome::Exited { code: 0 } => Ok(RunReport {
                exit_code: 0,
                log_path,
                elapsed,
            }),
            JobOutcome::Exited { code } => Err(LauncherError::ExternalProcess {
                exit_code: code,
                log_path,
            }),
            JobOutcome::TimedOut { after } => Err(LauncherError::Timeout { after, log_path }),
            JobOutcome::Cancelled => Err(LauncherError::Cancelled { log_path }),
        }
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if self.fs.is_dir(dir) {
            return Ok(());
        }
        if self.fs.exists(dir) {
            return Err(LauncherError::OutputUnavailable {
                path: dir.to_path_buf(),
                reason: "exists but is not a directory".to_string(),
            });
        }
        debug!(dir = ?dir, "creating directory");
        self.fs
            .create_dir_all(dir)
            .map_err(|e| LauncherError::OutputUnavailable {
                path: dir.to_path_buf(),
                reason: format!("{e:#}"),
            })
    }
}

fn missing(what: &str, path: &Path) -> LauncherError {
    LauncherError::PrecursorMissing {
        what: what.to_string(),
        path: path.to_path_buf(),
    }
}

fn log_run_header(cfg: &RunConfig) {
    info!(
        cell_types = cfg.number_of_cell_types(),
        burn_in = cfg.burn_in_length(),
        samples = cfg.gibbs_sample_number(),
        em_maxiter = cfg.em_maxiter(),
        "Gibbs-EM run"
    );
    debug!(
        script = ?cfg.script_path(),
        interpreter = ?cfg.interpreter(),
        single_cell_expr = ?cfg.single_cell_expr_file(),
        single_cell_type = ?cfg.single_cell_type_file(),
        bulk_expr = ?cfg.bulk_expr_file(),
        output_directory = ?cfg.output_directory(),
        output_prefix = %cfg.output_prefix(),
        log = ?cfg.log_path(),
        program_log = ?cfg.program_log(),
        timeout = ?cfg.timeout(),
        "run configuration"
    );
}
