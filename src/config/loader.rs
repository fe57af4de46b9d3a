// src/config/loader.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{PROGRAM_LOG, RawConfig, RunConfig, URSMLOG_ENV, is_known_key};
use crate::errors::{LauncherError, Result};

/// Where the configuration for one run comes from.
///
/// Layers are applied in order file < environment < overrides, so a `--set`
/// on the command line always wins.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Optional TOML config file.
    pub config_file: Option<PathBuf>,
    /// Snapshot of the process environment, if environment lookup is enabled.
    pub env: Option<Vec<(String, String)>>,
    /// Raw `KEY=VALUE` overrides.
    pub overrides: Vec<String>,
}

/// Parse a flat TOML table into a [`RawConfig`].
///
/// Strings are taken verbatim; integers, floats and booleans are rendered to
/// their string form; two-element numeric arrays become `"a,b"`. Nested
/// tables are rejected.
pub fn from_toml_str(contents: &str) -> Result<RawConfig> {
    let table: BTreeMap<String, toml::Value> = toml::from_str(contents)?;

    let mut raw = RawConfig::new();
    for (key, value) in table {
        let rendered = render_toml_value(&key, &value)?;
        raw.insert(key, rendered);
    }
    Ok(raw)
}

/// Load a configuration file from a given path into a [`RawConfig`].
///
/// This only performs TOML deserialization; it does **not** validate the
/// values. Use [`load_and_validate`] for that.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        LauncherError::config("--config", format!("cannot read {:?}: {}", path, e))
    })?;
    from_toml_str(&contents)
}

/// Keep only the recognised keys from an environment snapshot.
///
/// `ursmlog`, the name the original job script exported, is accepted as an
/// alias for `program_log`.
pub fn from_env_vars<I>(vars: I) -> RawConfig
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut raw = RawConfig::new();
    let mut ursmlog = None;
    for (key, value) in vars {
        if key == URSMLOG_ENV {
            ursmlog = Some(value);
        } else if is_known_key(&key) {
            raw.insert(key, value);
        }
    }
    if let Some(value) = ursmlog
        && raw.get(PROGRAM_LOG).is_none()
    {
        raw.insert(PROGRAM_LOG, value);
    }
    raw
}

/// Parse `KEY=VALUE` strings (from `--set`).
pub fn from_overrides<S: AsRef<str>>(overrides: &[S]) -> Result<RawConfig> {
    let mut raw = RawConfig::new();
    for item in overrides {
        let item = item.as_ref();
        let (key, value) = item.split_once('=').ok_or_else(|| {
            LauncherError::config(item, "override must have the form KEY=VALUE")
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(LauncherError::config(item, "override has an empty key"));
        }
        raw.insert(key, value);
    }
    Ok(raw)
}

/// Gather all configured sources into one layered [`RawConfig`].
pub fn load_raw(sources: &ConfigSources) -> Result<RawConfig> {
    let mut raw = RawConfig::new();

    if let Some(path) = &sources.config_file {
        let file = from_toml_file(path)?;
        debug!(path = ?path, keys = file.len(), "loaded config file");
        raw = raw.merge(file);
    }

    if let Some(vars) = &sources.env {
        let env = from_env_vars(vars.iter().cloned());
        debug!(keys = env.len(), "loaded configuration from environment");
        raw = raw.merge(env);
    }

    let overrides = from_overrides(&sources.overrides)?;
    if !overrides.is_empty() {
        debug!(keys = overrides.len(), "applied --set overrides");
    }
    Ok(raw.merge(overrides))
}

/// Load every configured source and validate the result.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(sources: &ConfigSources) -> Result<RunConfig> {
    let raw = load_raw(sources)?;
    RunConfig::try_from(raw)
}

fn render_toml_value(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Array(items) => {
            let numbers: Option<Vec<String>> = items
                .iter()
                .map(|v| match v {
                    toml::Value::Integer(i) => Some(i.to_string()),
                    toml::Value::Float(f) => Some(f.to_string()),
                    _ => None,
                })
                .collect();
            match numbers {
                Some(numbers) => Ok(numbers.join(",")),
                None => Err(LauncherError::config(key, "arrays may only contain numbers")),
            }
        }
        toml::Value::Datetime(_) | toml::Value::Table(_) => Err(LauncherError::config(
            key,
            "unsupported value type (expected string, number, boolean or numeric array)",
        )),
    }
}
