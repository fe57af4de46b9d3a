// src/config/validate.rs

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::model::*;
use crate::errors::{LauncherError, Result};

impl TryFrom<RawConfig> for RunConfig {
    type Error = LauncherError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        // Required keys first, in declaration order, so the reported key is
        // always the first offending one.
        for key in REQUIRED_KEYS {
            if raw.get(key).is_none() {
                return Err(LauncherError::config(key, "required key is missing"));
            }
        }

        let script_path = path_field(&raw, SCRIPT_PATH)?;
        let single_cell_expr_file = path_field(&raw, SINGLE_CELL_EXPR_FILE)?;
        let single_cell_type_file = path_field(&raw, SINGLE_CELL_TYPE_FILE)?;
        let bulk_expr_file = path_field(&raw, BULK_EXPR_FILE)?;
        let number_of_cell_types = positive_u32(&raw, NUMBER_OF_CELL_TYPES)?;
        let burn_in_length = non_negative(&raw, BURN_IN_LENGTH)?;
        let gibbs_sample_number = non_negative(&raw, GIBBS_SAMPLE_NUMBER)?;
        let em_maxiter = non_negative(&raw, EM_MAXITER)?;
        let output_prefix = raw.get(OUTPUT_PREFIX).unwrap_or_default().to_string();
        let output_directory = path_field(&raw, OUTPUT_DIRECTORY)?;
        let log_path = path_field(&raw, LOG_PATH)?;

        let interpreter = match raw.get(INTERPRETER) {
            Some(s) if s.trim().is_empty() => {
                return Err(LauncherError::config(INTERPRETER, "must not be empty"));
            }
            Some(s) => Some(s.trim().to_string()),
            None => None,
        };

        let program_log = match raw.get(PROGRAM_LOG) {
            Some(_) => path_field(&raw, PROGRAM_LOG)?,
            None => output_directory.join(format!("{output_prefix}ursm.log")),
        };
        if same_path(&program_log, &log_path) {
            // The external program truncates its own log on start-up.
            return Err(LauncherError::config(
                LOG_PATH,
                format!("must differ from program_log ({program_log:?})"),
            ));
        }

        let timeout = match raw.get(TIMEOUT) {
            Some(s) => Some(parse_duration(s).map_err(|e| LauncherError::config(TIMEOUT, e))?),
            None => None,
        };

        let tuning = Tuning {
            imarkers_file: optional(&raw, IMARKERS_FILE, path_field)?,
            initial_a_file: optional(&raw, INITIAL_A_FILE, path_field)?,
            initial_alpha_file: optional(&raw, INITIAL_ALPHA_FILE, path_field)?,
            minimal_a: optional(&raw, MINIMAL_A, positive_f64)?,
            estimate_alpha: optional(&raw, ESTIMATE_ALPHA, bool_field)?,
            initial_kappa_mean_var: optional(&raw, INITIAL_KAPPA_MEAN_VAR, mean_var)?,
            initial_tau_mean_var: optional(&raw, INITIAL_TAU_MEAN_VAR, mean_var)?,
            gibbs_thinning: optional(&raw, GIBBS_THINNING, positive_u64)?,
            mean_approx: optional(&raw, MEAN_APPROX, bool_field)?,
            mstep_convergence_tol: optional(&raw, MSTEP_CONVERGENCE_TOL, positive_f64)?,
            em_convergence_tol: optional(&raw, EM_CONVERGENCE_TOL, positive_f64)?,
            mstep_maxiter: optional(&raw, MSTEP_MAXITER, non_negative)?,
            verbose_level: optional(&raw, VERBOSE_LEVEL, non_negative)?,
        };

        if let Some(key) = raw.keys().find(|k| !is_known_key(k)) {
            return Err(LauncherError::config(key, "unknown configuration key"));
        }

        Ok(RunConfig {
            script_path,
            single_cell_expr_file,
            single_cell_type_file,
            bulk_expr_file,
            number_of_cell_types,
            burn_in_length,
            gibbs_sample_number,
            em_maxiter,
            output_prefix,
            output_directory,
            log_path,
            interpreter,
            program_log,
            timeout,
            tuning,
        })
    }
}

fn optional<T>(
    raw: &RawConfig,
    key: &str,
    parse: fn(&RawConfig, &str) -> Result<T>,
) -> Result<Option<T>> {
    match raw.get(key) {
        Some(_) => parse(raw, key).map(Some),
        None => Ok(None),
    }
}

fn value<'a>(raw: &'a RawConfig, key: &str) -> Result<&'a str> {
    raw.get(key)
        .ok_or_else(|| LauncherError::config(key, "required key is missing"))
}

fn path_field(raw: &RawConfig, key: &str) -> Result<PathBuf> {
    let s = value(raw, key)?;
    if s.trim().is_empty() {
        return Err(LauncherError::config(key, "path must not be empty"));
    }
    Ok(PathBuf::from(s))
}

/// Parse an integer and report sign violations separately from syntax errors.
fn integer(raw: &RawConfig, key: &str) -> Result<i128> {
    let s = value(raw, key)?;
    s.trim().parse::<i128>().map_err(|_| {
        LauncherError::config(key, format!("expected an integer, got {s:?}"))
    })
}

fn non_negative(raw: &RawConfig, key: &str) -> Result<u64> {
    let n = integer(raw, key)?;
    if n < 0 {
        return Err(LauncherError::config(key, format!("must be non-negative, got {n}")));
    }
    u64::try_from(n).map_err(|_| LauncherError::config(key, format!("{n} is out of range")))
}

fn positive_u64(raw: &RawConfig, key: &str) -> Result<u64> {
    let n = integer(raw, key)?;
    if n <= 0 {
        return Err(LauncherError::config(key, format!("must be positive, got {n}")));
    }
    u64::try_from(n).map_err(|_| LauncherError::config(key, format!("{n} is out of range")))
}

fn positive_u32(raw: &RawConfig, key: &str) -> Result<u32> {
    let n = positive_u64(raw, key)?;
    u32::try_from(n).map_err(|_| LauncherError::config(key, format!("{n} is out of range")))
}

fn float(key: &str, s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(LauncherError::config(key, format!("expected a finite number, got {s:?}"))),
    }
}

fn positive_f64(raw: &RawConfig, key: &str) -> Result<f64> {
    let x = float(key, value(raw, key)?)?;
    if x <= 0.0 {
        return Err(LauncherError::config(key, format!("must be positive, got {x}")));
    }
    Ok(x)
}

fn bool_field(raw: &RawConfig, key: &str) -> Result<bool> {
    let s = value(raw, key)?;
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(LauncherError::config(
            key,
            format!("expected true or false, got {s:?}"),
        )),
    }
}

/// `"mean,var"` (commas and/or whitespace as separator).
fn mean_var(raw: &RawConfig, key: &str) -> Result<MeanVar> {
    let s = value(raw, key)?;
    let parts: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [mean, var] => {
            let mean = float(key, mean)?;
            let var = float(key, var)?;
            if var <= 0.0 {
                return Err(LauncherError::config(key, format!("variance must be positive, got {var}")));
            }
            Ok(MeanVar { mean, var })
        }
        _ => Err(LauncherError::config(
            key,
            format!("expected two numbers \"mean,var\", got {s:?}"),
        )),
    }
}

/// Compare two configured paths, ignoring `.` segments and repeated separators.
fn same_path(a: &Path, b: &Path) -> bool {
    fn normal(p: &Path) -> Vec<Component<'_>> {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect::<Vec<_>>()
    }
    normal(a) == normal(b)
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is out of range"))
}
