#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use ursm_launch::config::{RawConfig, RunConfig};

/// Builder for `RawConfig` to simplify test setup.
///
/// Starts out with a valid value for every required key; paths point below
/// `root` and are not created.
pub struct RawConfigBuilder {
    raw: RawConfig,
}

impl RawConfigBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let p = |name: &str| root.join(name).to_string_lossy().into_owned();

        let raw: RawConfig = [
            ("script_path", p("scUnif_LinuxEnv.py")),
            ("single_cell_expr_file", p("ursmsc.csv")),
            ("single_cell_type_file", p("ursmcelltype.csv")),
            ("bulk_expr_file", p("ursmbulk.csv")),
            ("number_of_cell_types", "3".to_string()),
            ("burn_in_length", "50".to_string()),
            ("gibbs_sample_number", "50".to_string()),
            ("EM_maxiter", "50".to_string()),
            ("output_prefix", "gemout_".to_string()),
            ("output_directory", p("out")),
            ("log_path", p("logs/demo.log")),
        ]
        .into_iter()
        .collect();

        Self { raw }
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.raw.insert(key, value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.raw.remove(key);
        self
    }

    pub fn build(self) -> RawConfig {
        self.raw
    }

    pub fn build_config(self) -> RunConfig {
        RunConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

/// A temporary directory holding input files and a stub external program.
///
/// The stub is a POSIX shell script so tests can control exactly what the
/// "external program" prints and how it exits.
pub struct RunFixture {
    dir: TempDir,
}

impl RunFixture {
    /// Create the fixture with the three input data files in place.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        for name in ["ursmsc.csv", "ursmcelltype.csv", "ursmbulk.csv"] {
            fs::write(dir.path().join(name), "1,2,3\n").expect("write input file");
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write the stub script with the given shell body and return its path.
    pub fn stub(&self, body: &str) -> PathBuf {
        let path = self.path("stub.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub script");
        make_executable(&path);
        path
    }

    /// Config for running the stub through `sh`.
    pub fn raw(&self) -> RawConfigBuilder {
        RawConfigBuilder::new(self.root())
            .set("script_path", self.path("stub.sh").to_string_lossy())
            .set("interpreter", "sh")
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(path).unwrap_or_default()
    }
}

impl Default for RunFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
