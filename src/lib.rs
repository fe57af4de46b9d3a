// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{RunConfig, load_and_validate};
use crate::errors::{LauncherError, Result};
use crate::exec::{Invocation, Launcher, ProcessJob, RunReport};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, environment snapshot, `--set` overrides)
/// - the launcher with the real process backend
/// - Ctrl-C handling
///
/// Returns `None` for `--dry-run`.
pub async fn run<I>(args: CliArgs, env: I) -> Result<Option<RunReport>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let sources = args.config_sources(env);
    let cfg = load_and_validate(&sources)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(None);
    }

    // Ctrl-C → cancel the child.
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = cancel_tx.send(());
    });

    let mut launcher = Launcher::new(ProcessJob::new().with_tee(args.tee));
    let report = launcher.launch(cfg, cancel_rx).await?;
    info!(
        log = ?report.log_path,
        elapsed = ?report.elapsed,
        "external program finished successfully"
    );
    Ok(Some(report))
}

#[derive(Serialize)]
struct DryRun {
    program: String,
    args: Vec<String>,
    log_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<String>,
    env: BTreeMap<String, String>,
}

/// Simple dry-run output: the resolved invocation as TOML on stdout.
fn print_dry_run(cfg: &RunConfig) -> Result<()> {
    let invocation = Invocation::for_run(cfg);
    let report = DryRun {
        program: invocation.program.to_string_lossy().into_owned(),
        args: invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect(),
        log_path: cfg.log_path().to_string_lossy().into_owned(),
        timeout: cfg.timeout().map(|t| format!("{t:?}")),
        env: invocation
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string_lossy().into_owned()))
            .collect(),
    };

    let rendered = toml::to_string(&report)
        .map_err(|e| LauncherError::IoError(std::io::Error::other(e)))?;
    println!("# ursm-launch dry-run");
    println!("# {}", invocation.display_command());
    print!("{rendered}");

    debug!("dry-run complete (no execution)");
    Ok(())
}
