// src/config/mod.rs

//! Configuration loading and validation for ursm-launch.
//!
//! Responsibilities:
//! - Define the raw and validated data model (`model.rs`).
//! - Gather raw values from a TOML file, the environment and overrides
//!   (`loader.rs`).
//! - Validate raw values into an immutable `RunConfig` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    ConfigSources, from_env_vars, from_overrides, from_toml_file, from_toml_str,
    load_and_validate, load_raw,
};
pub use model::{MeanVar, RawConfig, RunConfig, Tuning};
pub use validate::parse_duration;
