// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigSources;

/// Command-line arguments for `ursm-launch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ursm-launch",
    version,
    about = "Validate a Gibbs-EM run configuration and launch the external program.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a run config file (TOML, flat `key = value` pairs).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also read configuration keys from the environment (overrides the file).
    #[arg(long)]
    pub from_env: bool,

    /// Set a configuration key; overrides file and environment. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Echo the external program's output to stderr as well as the log file.
    #[arg(long)]
    pub tee: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `URSM_LAUNCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the invocation, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Configuration sources described by these arguments.
    ///
    /// `env` is the environment snapshot to use when `--from-env` is given.
    pub fn config_sources<I>(&self, env: I) -> ConfigSources
    where
        I: IntoIterator<Item = (String, String)>,
    {
        ConfigSources {
            config_file: self.config.clone(),
            env: self.from_env.then(|| env.into_iter().collect()),
            overrides: self.set.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
