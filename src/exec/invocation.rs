// src/exec/invocation.rs

//! The fixed calling contract of the external Gibbs-EM program.
//!
//! The program reads its core parameters from environment variables (the
//! names below are part of its interface and must not change) and accepts
//! the remaining knobs as long-form command-line flags.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::model::*;

/// Program, arguments and environment for one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(String, OsString)>,
}

impl Invocation {
    /// Build the invocation for a validated run configuration.
    pub fn for_run(cfg: &RunConfig) -> Self {
        let mut args: Vec<OsString> = Vec::new();
        let program = match cfg.interpreter() {
            Some(interpreter) => {
                args.push(cfg.script_path().into());
                PathBuf::from(interpreter)
            }
            None => cfg.script_path().to_path_buf(),
        };

        push_tuning_flags(&mut args, cfg.tuning());

        let env: Vec<(String, OsString)> = vec![
            (SINGLE_CELL_EXPR_FILE.into(), cfg.single_cell_expr_file().into()),
            (SINGLE_CELL_TYPE_FILE.into(), cfg.single_cell_type_file().into()),
            (BULK_EXPR_FILE.into(), cfg.bulk_expr_file().into()),
            (NUMBER_OF_CELL_TYPES.into(), cfg.number_of_cell_types().to_string().into()),
            (BURN_IN_LENGTH.into(), cfg.burn_in_length().to_string().into()),
            (GIBBS_SAMPLE_NUMBER.into(), cfg.gibbs_sample_number().to_string().into()),
            (EM_MAXITER.into(), cfg.em_maxiter().to_string().into()),
            (OUTPUT_PREFIX.into(), cfg.output_prefix().into()),
            (OUTPUT_DIRECTORY.into(), cfg.output_directory().into()),
            (URSMLOG_ENV.into(), cfg.program_log().into()),
        ];

        Self { program, args, env }
    }

    /// Look up an environment entry of the contract by name.
    pub fn env_var(&self, name: &str) -> Option<&OsString> {
        self.env.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// A `tokio` command with stdin closed and both output streams piped.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_os_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Shell-like one-line rendering, for logs and `--dry-run`.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn push_flag<I>(args: &mut Vec<OsString>, name: &str, values: I)
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    args.push(format!("--{name}").into());
    args.extend(values.into_iter().map(Into::into));
}

fn push_tuning_flags(args: &mut Vec<OsString>, t: &Tuning) {
    if let Some(p) = &t.imarkers_file {
        push_flag(args, IMARKERS_FILE, [p.as_os_str()]);
    }
    if let Some(p) = &t.initial_a_file {
        push_flag(args, INITIAL_A_FILE, [p.as_os_str()]);
    }
    if let Some(p) = &t.initial_alpha_file {
        push_flag(args, INITIAL_ALPHA_FILE, [p.as_os_str()]);
    }
    if let Some(x) = t.minimal_a {
        push_flag(args, MINIMAL_A, [x.to_string()]);
    }
    // Alpha estimation is on by default in the external program.
    if t.estimate_alpha == Some(false) {
        push_flag(args, "no_est_alpha", None::<String>);
    }
    if let Some(mv) = t.initial_kappa_mean_var {
        push_flag(args, INITIAL_KAPPA_MEAN_VAR, [mv.mean.to_string(), mv.var.to_string()]);
    }
    if let Some(mv) = t.initial_tau_mean_var {
        push_flag(args, INITIAL_TAU_MEAN_VAR, [mv.mean.to_string(), mv.var.to_string()]);
    }
    if let Some(n) = t.gibbs_thinning {
        push_flag(args, GIBBS_THINNING, [n.to_string()]);
    }
    match t.mean_approx {
        Some(true) => push_flag(args, MEAN_APPROX, None::<String>),
        Some(false) => push_flag(args, "no_mean_approx", None::<String>),
        None => {}
    }
    if let Some(x) = t.mstep_convergence_tol {
        push_flag(args, MSTEP_CONVERGENCE_TOL, [x.to_string()]);
    }
    if let Some(x) = t.em_convergence_tol {
        push_flag(args, EM_CONVERGENCE_TOL, [x.to_string()]);
    }
    if let Some(n) = t.mstep_maxiter {
        push_flag(args, MSTEP_MAXITER, [n.to_string()]);
    }
    if let Some(n) = t.verbose_level {
        push_flag(args, VERBOSE_LEVEL, [n.to_string()]);
    }
}
