// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Keys the external program reads from its environment, plus the launcher's
/// own required keys, in validation order.
pub const SCRIPT_PATH: &str = "script_path";
pub const SINGLE_CELL_EXPR_FILE: &str = "single_cell_expr_file";
pub const SINGLE_CELL_TYPE_FILE: &str = "single_cell_type_file";
pub const BULK_EXPR_FILE: &str = "bulk_expr_file";
pub const NUMBER_OF_CELL_TYPES: &str = "number_of_cell_types";
pub const BURN_IN_LENGTH: &str = "burn_in_length";
pub const GIBBS_SAMPLE_NUMBER: &str = "gibbs_sample_number";
pub const EM_MAXITER: &str = "EM_maxiter";
pub const OUTPUT_PREFIX: &str = "output_prefix";
pub const OUTPUT_DIRECTORY: &str = "output_directory";
pub const LOG_PATH: &str = "log_path";

pub const INTERPRETER: &str = "interpreter";
pub const PROGRAM_LOG: &str = "program_log";
pub const TIMEOUT: &str = "timeout";

pub const IMARKERS_FILE: &str = "iMarkers_file";
pub const INITIAL_A_FILE: &str = "initial_A_file";
pub const INITIAL_ALPHA_FILE: &str = "initial_alpha_file";
pub const MINIMAL_A: &str = "mininimal_A";
pub const ESTIMATE_ALPHA: &str = "estimate_alpha";
pub const INITIAL_KAPPA_MEAN_VAR: &str = "initial_kappa_mean_var";
pub const INITIAL_TAU_MEAN_VAR: &str = "initial_tau_mean_var";
pub const GIBBS_THINNING: &str = "gibbs_thinning";
pub const MEAN_APPROX: &str = "mean_approx";
pub const MSTEP_CONVERGENCE_TOL: &str = "Mstep_convergence_tol";
pub const EM_CONVERGENCE_TOL: &str = "EM_convergence_tol";
pub const MSTEP_MAXITER: &str = "Mstep_maxiter";
pub const VERBOSE_LEVEL: &str = "verbose_level";

/// Environment name the original job script used for the program's own log.
pub const URSMLOG_ENV: &str = "ursmlog";

pub const REQUIRED_KEYS: [&str; 11] = [
    SCRIPT_PATH,
    SINGLE_CELL_EXPR_FILE,
    SINGLE_CELL_TYPE_FILE,
    BULK_EXPR_FILE,
    NUMBER_OF_CELL_TYPES,
    BURN_IN_LENGTH,
    GIBBS_SAMPLE_NUMBER,
    EM_MAXITER,
    OUTPUT_PREFIX,
    OUTPUT_DIRECTORY,
    LOG_PATH,
];

pub const OPTIONAL_KEYS: [&str; 16] = [
    INTERPRETER,
    PROGRAM_LOG,
    TIMEOUT,
    IMARKERS_FILE,
    INITIAL_A_FILE,
    INITIAL_ALPHA_FILE,
    MINIMAL_A,
    ESTIMATE_ALPHA,
    INITIAL_KAPPA_MEAN_VAR,
    INITIAL_TAU_MEAN_VAR,
    GIBBS_THINNING,
    MEAN_APPROX,
    MSTEP_CONVERGENCE_TOL,
    EM_CONVERGENCE_TOL,
    MSTEP_MAXITER,
    VERBOSE_LEVEL,
];

/// True if `key` is one of the recognised configuration keys.
pub fn is_known_key(key: &str) -> bool {
    REQUIRED_KEYS.contains(&key) || OPTIONAL_KEYS.contains(&key)
}

/// Unvalidated key -> string mapping gathered from one configuration source.
///
/// Several sources can be layered with [`RawConfig::merge`]; the validated
/// form is produced by `RunConfig::try_from(raw)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    values: BTreeMap<String, String>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Layer `other` on top of `self`; keys present in both take `other`'s value.
    pub fn merge(mut self, other: RawConfig) -> RawConfig {
        self.values.extend(other.values);
        self
    }
}

impl<K, V> FromIterator<(K, V)> for RawConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A `(mean, variance)` prior pair, e.g. `initial_kappa_mean_var`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanVar {
    pub mean: f64,
    pub var: f64,
}

/// Optional knobs of the external program that the job script never set.
///
/// Every field maps to one command-line flag of the external program and is
/// only forwarded when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tuning {
    pub imarkers_file: Option<PathBuf>,
    pub initial_a_file: Option<PathBuf>,
    pub initial_alpha_file: Option<PathBuf>,
    pub minimal_a: Option<f64>,
    pub estimate_alpha: Option<bool>,
    pub initial_kappa_mean_var: Option<MeanVar>,
    pub initial_tau_mean_var: Option<MeanVar>,
    pub gibbs_thinning: Option<u64>,
    pub mean_approx: Option<bool>,
    pub mstep_convergence_tol: Option<f64>,
    pub em_convergence_tol: Option<f64>,
    pub mstep_maxiter: Option<u64>,
    pub verbose_level: Option<u64>,
}

impl Tuning {
    /// Optional input files that must exist before launch, with their keys.
    pub fn input_files(&self) -> Vec<(&'static str, &Path)> {
        [
            (IMARKERS_FILE, self.imarkers_file.as_deref()),
            (INITIAL_A_FILE, self.initial_a_file.as_deref()),
            (INITIAL_ALPHA_FILE, self.initial_alpha_file.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, path)| path.map(|p| (key, p)))
        .collect()
    }
}

/// Validated, immutable parameters for exactly one run of the external job.
///
/// Built only through `RunConfig::try_from(RawConfig)`; handed to
/// `Launcher::launch` by value.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub(crate) script_path: PathBuf,
    pub(crate) single_cell_expr_file: PathBuf,
    pub(crate) single_cell_type_file: PathBuf,
    pub(crate) bulk_expr_file: PathBuf,
    pub(crate) number_of_cell_types: u32,
    pub(crate) burn_in_length: u64,
    pub(crate) gibbs_sample_number: u64,
    pub(crate) em_maxiter: u64,
    pub(crate) output_prefix: String,
    pub(crate) output_directory: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) interpreter: Option<String>,
    pub(crate) program_log: PathBuf,
    pub(crate) timeout: Option<Duration>,
    pub(crate) tuning: Tuning,
}

impl RunConfig {
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn single_cell_expr_file(&self) -> &Path {
        &self.single_cell_expr_file
    }

    pub fn single_cell_type_file(&self) -> &Path {
        &self.single_cell_type_file
    }

    pub fn bulk_expr_file(&self) -> &Path {
        &self.bulk_expr_file
    }

    pub fn number_of_cell_types(&self) -> u32 {
        self.number_of_cell_types
    }

    pub fn burn_in_length(&self) -> u64 {
        self.burn_in_length
    }

    pub fn gibbs_sample_number(&self) -> u64 {
        self.gibbs_sample_number
    }

    pub fn em_maxiter(&self) -> u64 {
        self.em_maxiter
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Program used to run `script_path`; `None` executes the script directly.
    pub fn interpreter(&self) -> Option<&str> {
        self.interpreter.as_deref()
    }

    /// The external program's own log file (its `ursmlog`).
    pub fn program_log(&self) -> &Path {
        &self.program_log
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Required input data files with their configuration keys, in check order.
    pub fn input_files(&self) -> [(&'static str, &Path); 3] {
        [
            (SINGLE_CELL_EXPR_FILE, self.single_cell_expr_file.as_path()),
            (SINGLE_CELL_TYPE_FILE, self.single_cell_type_file.as_path()),
            (BULK_EXPR_FILE, self.bulk_expr_file.as_path()),
        ]
    }
}
