// src/exec/process.rs

//! Child process runner: spawn, capture output into the log, supervise.

use std::future::Future;
use std::pin::Pin;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::{LauncherError, Result};
use crate::exec::backend::{ExternalJob, JobOutcome, JobRequest};

/// How long to keep draining output once the child is gone.
///
/// Grandchildren that inherited the pipes can keep them open long after the
/// child exited or was killed.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Real job backend used in production.
#[derive(Debug, Clone, Default)]
pub struct ProcessJob {
    tee: bool,
}

impl ProcessJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also echo the child's output to the launcher's stderr.
    pub fn with_tee(mut self, tee: bool) -> Self {
        self.tee = tee;
        self
    }
}

impl ExternalJob for ProcessJob {
    fn run(
        &mut self,
        request: JobRequest,
        cancel: oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = Result<JobOutcome>> + Send + '_>> {
        let tee = self.tee;
        Box::pin(async move { run_process(request, cancel, tee).await })
    }
}

enum Finish {
    Exited(std::io::Result<ExitStatus>),
    TimedOut(Duration),
    Cancelled,
}

async fn run_process(
    request: JobRequest,
    cancel: oneshot::Receiver<()>,
    tee: bool,
) -> Result<JobOutcome> {
    let JobRequest {
        invocation,
        log_path,
        timeout,
    } = request;

    let log_file = File::create(&log_path)
        .await
        .map_err(|e| LauncherError::OutputUnavailable {
            path: log_path.clone(),
            reason: e.to_string(),
        })?;

    info!(
        cmd = %invocation.display_command(),
        log = ?log_path,
        "starting external program"
    );

    let mut child = invocation
        .command()
        .spawn()
        .map_err(|source| LauncherError::LaunchError {
            program: invocation.program.clone(),
            source,
        })?;

    let (tx, rx) = mpsc::channel::<Vec<u8>>(64);
    let writer = tokio::spawn(write_log(log_file, rx, tee));

    let mut pumps: Vec<JoinHandle<()>> = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        pumps.push(tokio::spawn(pump("stdout", stdout, tx.clone())));
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(tokio::spawn(pump("stderr", stderr, tx.clone())));
    }
    drop(tx);

    let deadline = async {
        match timeout {
            Some(after) => {
                sleep(after).await;
                after
            }
            None => std::future::pending().await,
        }
    };
    // A dropped sender means "nobody can cancel any more", not "cancel".
    let cancelled = async {
        if cancel.await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let finish = tokio::select! {
        status = child.wait() => Finish::Exited(status),
        after = deadline => Finish::TimedOut(after),
        _ = cancelled => Finish::Cancelled,
    };

    let outcome = match finish {
        Finish::Exited(status) => {
            let status = status?;
            let code = exit_code(&status);
            info!(exit_code = code, success = status.success(), "external program exited");
            JobOutcome::Exited { code }
        }
        Finish::TimedOut(after) => {
            warn!(timeout = ?after, "external program timed out; killing process");
            kill(&mut child).await;
            JobOutcome::TimedOut { after }
        }
        Finish::Cancelled => {
            info!("cancellation requested; killing process");
            kill(&mut child).await;
            JobOutcome::Cancelled
        }
    };

    drain(pumps).await;

    let written = writer
        .await
        .map_err(|e| LauncherError::IoError(std::io::Error::other(e)))??;
    debug!(bytes = written, log = ?log_path, "log file closed");

    Ok(outcome)
}

async fn kill(child: &mut tokio::process::Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill child process");
    }
}

/// Wait for the output pumps to reach EOF.
///
/// The wait is bounded by [`DRAIN_GRACE`]; stragglers are aborted so the log
/// writer can finish.
async fn drain(pumps: Vec<JoinHandle<()>>) {
    let aborts: Vec<_> = pumps.iter().map(JoinHandle::abort_handle).collect();
    let all = async {
        for pump in pumps {
            let _ = pump.await;
        }
    };

    if tokio::time::timeout(DRAIN_GRACE, all).await.is_err() {
        warn!(
            grace = ?DRAIN_GRACE,
            "output pipes still held open by a leftover process; abandoning remaining output"
        );
        for abort in aborts {
            abort.abort();
        }
    }
}

/// Forward one output stream to the log writer, line by line.
async fn pump<R>(stream: &'static str, reader: R, tx: mpsc::Sender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    loop {
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                debug!(stream, "{}", String::from_utf8_lossy(&line).trim_end());
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(stream, error = %e, "error reading child output");
                break;
            }
        }
    }
}

/// Sole owner of the log file for the duration of the run.
async fn write_log(
    file: File,
    mut rx: mpsc::Receiver<Vec<u8>>,
    tee: bool,
) -> std::io::Result<u64> {
    let mut out = BufWriter::new(file);
    let mut echo = tee.then(tokio::io::stderr);
    let mut written = 0u64;

    while let Some(chunk) = rx.recv().await {
        out.write_all(&chunk).await?;
        if let Some(err) = echo.as_mut() {
            err.write_all(&chunk).await?;
        }
        written += chunk.len() as u64;
    }

    out.flush().await?;
    out.into_inner().sync_all().await?;
    Ok(written)
}

/// Exit code of the child; death by signal maps to `128 + signal`.
fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
