mod common;
use crate::common::builders::RawConfigBuilder;

use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;
use ursm_launch::config::{
    ConfigSources, MeanVar, RawConfig, RunConfig, from_env_vars, from_overrides, from_toml_str,
    load_and_validate,
};
use ursm_launch::errors::LauncherError;

type TestResult = Result<(), Box<dyn Error>>;

fn expect_config_error(raw: RawConfig, expected_key: &str) -> String {
    match RunConfig::try_from(raw) {
        Err(LauncherError::ConfigError { key, reason }) => {
            assert_eq!(key, expected_key, "wrong key reported ({reason})");
            reason
        }
        Err(e) => panic!("Expected ConfigError for {expected_key}, got: {:?}", e),
        Ok(cfg) => panic!("Expected ConfigError for {expected_key}, got Ok({:?})", cfg),
    }
}

#[test]
fn valid_mapping_produces_matching_run_config() -> TestResult {
    let raw = RawConfigBuilder::new("/data")
        .set("number_of_cell_types", "4")
        .set("burn_in_length", "0")
        .set("gibbs_sample_number", "120")
        .set("EM_maxiter", "7")
        .build();

    let cfg = RunConfig::try_from(raw)?;

    assert_eq!(cfg.script_path(), Path::new("/data/scUnif_LinuxEnv.py"));
    assert_eq!(cfg.single_cell_expr_file(), Path::new("/data/ursmsc.csv"));
    assert_eq!(cfg.single_cell_type_file(), Path::new("/data/ursmcelltype.csv"));
    assert_eq!(cfg.bulk_expr_file(), Path::new("/data/ursmbulk.csv"));
    assert_eq!(cfg.number_of_cell_types(), 4);
    assert_eq!(cfg.burn_in_length(), 0);
    assert_eq!(cfg.gibbs_sample_number(), 120);
    assert_eq!(cfg.em_maxiter(), 7);
    assert_eq!(cfg.output_prefix(), "gemout_");
    assert_eq!(cfg.output_directory(), Path::new("/data/out"));
    assert_eq!(cfg.log_path(), Path::new("/data/logs/demo.log"));
    assert_eq!(cfg.interpreter(), None);
    assert_eq!(cfg.timeout(), None);
    assert_eq!(cfg.tuning(), &Default::default());

    Ok(())
}

#[test]
fn first_missing_required_key_is_reported() {
    let raw = RawConfigBuilder::new("/data")
        .without("bulk_expr_file")
        .without("EM_maxiter")
        .build();

    let reason = expect_config_error(raw, "bulk_expr_file");
    assert!(reason.contains("missing"));
}

#[test]
fn numeric_fields_reject_non_integers_and_negatives() {
    for key in [
        "number_of_cell_types",
        "burn_in_length",
        "gibbs_sample_number",
        "EM_maxiter",
    ] {
        for bad in ["abc", "2.5", "", "-1"] {
            let raw = RawConfigBuilder::new("/data").set(key, bad).build();
            expect_config_error(raw, key);
        }
    }
}

#[test]
fn cell_type_count_must_be_positive() {
    let raw = RawConfigBuilder::new("/data")
        .set("number_of_cell_types", "0")
        .build();
    let reason = expect_config_error(raw, "number_of_cell_types");
    assert!(reason.contains("positive"));

    // Zero iterations are fine for the other counts.
    let cfg = RawConfigBuilder::new("/data")
        .set("EM_maxiter", "0")
        .build_config();
    assert_eq!(cfg.em_maxiter(), 0);
}

#[test]
fn negative_count_reports_sign_not_syntax() {
    let raw = RawConfigBuilder::new("/data").set("burn_in_length", "-5").build();
    let reason = expect_config_error(raw, "burn_in_length");
    assert!(reason.contains("non-negative"), "reason: {reason}");
}

#[test]
fn numeric_values_are_trimmed() {
    let cfg = RawConfigBuilder::new("/data")
        .set("gibbs_sample_number", " 42 ")
        .build_config();
    assert_eq!(cfg.gibbs_sample_number(), 42);
}

#[test]
fn empty_path_is_rejected() {
    for key in ["script_path", "single_cell_type_file", "output_directory", "log_path"] {
        let raw = RawConfigBuilder::new("/data").set(key, "  ").build();
        let reason = expect_config_error(raw, key);
        assert!(reason.contains("empty"));
    }
}

#[test]
fn empty_output_prefix_is_allowed() {
    let cfg = RawConfigBuilder::new("/data")
        .set("output_prefix", "")
        .build_config();
    assert_eq!(cfg.output_prefix(), "");
    assert_eq!(cfg.program_log(), Path::new("/data/out/ursm.log"));
}

#[test]
fn unknown_key_is_rejected() {
    let raw = RawConfigBuilder::new("/data")
        .set("gibbs_samples", "10")
        .build();
    let reason = expect_config_error(raw, "gibbs_samples");
    assert!(reason.contains("unknown"));
}

#[test]
fn program_log_defaults_under_output_directory() {
    let cfg = RawConfigBuilder::new("/data").build_config();
    assert_eq!(cfg.program_log(), Path::new("/data/out/gemout_ursm.log"));

    let cfg = RawConfigBuilder::new("/data")
        .set("program_log", "/elsewhere/gem.log")
        .build_config();
    assert_eq!(cfg.program_log(), Path::new("/elsewhere/gem.log"));
}

#[test]
fn program_log_must_not_collide_with_log_path() {
    let raw = RawConfigBuilder::new("/data")
        .set("program_log", "/data/logs/demo.log")
        .build();
    expect_config_error(raw, "log_path");
}

#[test]
fn program_log_collision_ignores_dot_segments() {
    let raw = RawConfigBuilder::new("/data")
        .set("log_path", "out/run.log")
        .set("program_log", "./out//./run.log")
        .build();
    expect_config_error(raw, "log_path");

    let cfg = RawConfigBuilder::new("/data")
        .set("log_path", "out/run.log")
        .set("program_log", "out/ursm.log")
        .build_config();
    assert_eq!(cfg.program_log(), Path::new("out/ursm.log"));
}

#[test]
fn timeout_is_parsed_as_duration() {
    let cfg = RawConfigBuilder::new("/data").set("timeout", "90s").build_config();
    assert_eq!(cfg.timeout(), Some(Duration::from_secs(90)));

    let cfg = RawConfigBuilder::new("/data").set("timeout", "250ms").build_config();
    assert_eq!(cfg.timeout(), Some(Duration::from_millis(250)));

    for bad in ["soon", "10", "0s", "5d"] {
        let raw = RawConfigBuilder::new("/data").set("timeout", bad).build();
        expect_config_error(raw, "timeout");
    }
}

#[test]
fn oversized_timeout_is_a_config_error() {
    let cfg = RawConfigBuilder::new("/data").set("timeout", "48h").build_config();
    assert_eq!(cfg.timeout(), Some(Duration::from_secs(48 * 3600)));

    for huge in ["5124095576030432h", "307445734561825861m", "99999999999999999999s"] {
        let raw = RawConfigBuilder::new("/data").set("timeout", huge).build();
        expect_config_error(raw, "timeout");
    }
}

#[test]
fn tuning_keys_are_validated() -> TestResult {
    let cfg = RunConfig::try_from(
        RawConfigBuilder::new("/data")
            .set("gibbs_thinning", "2")
            .set("mininimal_A", "1e-8")
            .set("estimate_alpha", "false")
            .set("initial_kappa_mean_var", "-1, 0.5")
            .set("mean_approx", "no")
            .set("EM_convergence_tol", "0.0001")
            .set("initial_A_file", "/data/A.csv")
            .build(),
    )?;

    let t = cfg.tuning();
    assert_eq!(t.gibbs_thinning, Some(2));
    assert_eq!(t.minimal_a, Some(1e-8));
    assert_eq!(t.estimate_alpha, Some(false));
    assert_eq!(
        t.initial_kappa_mean_var,
        Some(MeanVar { mean: -1.0, var: 0.5 })
    );
    assert_eq!(t.mean_approx, Some(false));
    assert_eq!(t.em_convergence_tol, Some(0.0001));
    assert_eq!(t.initial_a_file.as_deref(), Some(Path::new("/data/A.csv")));

    for (key, bad) in [
        ("gibbs_thinning", "0"),
        ("mininimal_A", "-1"),
        ("estimate_alpha", "maybe"),
        ("initial_tau_mean_var", "1"),
        ("initial_tau_mean_var", "1,0"),
        ("Mstep_convergence_tol", "NaN"),
        ("verbose_level", "-2"),
    ] {
        let raw = RawConfigBuilder::new("/data").set(key, bad).build();
        expect_config_error(raw, key);
    }

    Ok(())
}

#[test]
fn toml_values_are_rendered_to_strings() -> TestResult {
    let raw = from_toml_str(
        r#"
script_path = "/opt/ursm/scUnif_LinuxEnv.py"
interpreter = "python"
single_cell_expr_file = "/data/ursmsc.csv"
single_cell_type_file = "/data/ursmcelltype.csv"
bulk_expr_file = "/data/ursmbulk.csv"
number_of_cell_types = 3
burn_in_length = 50
gibbs_sample_number = 50
EM_maxiter = 50
output_prefix = "gemout_"
output_directory = "/data/out"
log_path = "/data/demo.log"
mean_approx = true
initial_tau_mean_var = [0, 0.25]
"#,
    )?;

    assert_eq!(raw.get("number_of_cell_types"), Some("3"));
    assert_eq!(raw.get("mean_approx"), Some("true"));
    assert_eq!(raw.get("initial_tau_mean_var"), Some("0,0.25"));

    let cfg = RunConfig::try_from(raw)?;
    assert_eq!(cfg.interpreter(), Some("python"));
    assert_eq!(
        cfg.tuning().initial_tau_mean_var,
        Some(MeanVar { mean: 0.0, var: 0.25 })
    );
    Ok(())
}

#[test]
fn toml_nested_tables_are_rejected() {
    let result = from_toml_str(
        r#"
[paths]
script_path = "/opt/ursm/run.py"
"#,
    );
    match result {
        Err(LauncherError::ConfigError { key, .. }) => assert_eq!(key, "paths"),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let result = from_toml_str("script_path = ");
    assert!(matches!(result, Err(LauncherError::TomlError(_))));
}

#[test]
fn env_snapshot_keeps_known_keys_and_maps_ursmlog() {
    let env = vec![
        ("PATH".to_string(), "/usr/bin".to_string()),
        ("EM_maxiter".to_string(), "50".to_string()),
        ("ursmlog".to_string(), "/data/demo.log".to_string()),
        ("HOME".to_string(), "/root".to_string()),
    ];

    let raw = from_env_vars(env);
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.get("EM_maxiter"), Some("50"));
    assert_eq!(raw.get("program_log"), Some("/data/demo.log"));
    assert_eq!(raw.get("PATH"), None);
}

#[test]
fn overrides_require_key_value_form() -> TestResult {
    let raw = from_overrides(&["EM_maxiter=10", "output_prefix=a=b"])?;
    assert_eq!(raw.get("EM_maxiter"), Some("10"));
    assert_eq!(raw.get("output_prefix"), Some("a=b"));

    assert!(matches!(
        from_overrides(&["EM_maxiter"]),
        Err(LauncherError::ConfigError { .. })
    ));
    assert!(matches!(
        from_overrides(&["=10"]),
        Err(LauncherError::ConfigError { .. })
    ));
    Ok(())
}

#[test]
fn sources_layer_file_then_env_then_overrides() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
script_path = "/opt/ursm/run.py"
single_cell_expr_file = "/data/sc.csv"
single_cell_type_file = "/data/ct.csv"
bulk_expr_file = "/data/bk.csv"
number_of_cell_types = 3
burn_in_length = 10
gibbs_sample_number = 10
EM_maxiter = 10
output_prefix = "file_"
output_directory = "/data/out"
log_path = "/data/run.log"
"#
    )?;

    let sources = ConfigSources {
        config_file: Some(file.path().to_path_buf()),
        env: Some(vec![
            ("burn_in_length".to_string(), "20".to_string()),
            ("EM_maxiter".to_string(), "20".to_string()),
        ]),
        overrides: vec!["EM_maxiter=30".to_string()],
    };

    let cfg = load_and_validate(&sources)?;
    assert_eq!(cfg.gibbs_sample_number(), 10);
    assert_eq!(cfg.burn_in_length(), 20);
    assert_eq!(cfg.em_maxiter(), 30);
    assert_eq!(cfg.output_prefix(), "file_");
    Ok(())
}

#[test]
fn unreadable_config_file_is_a_config_error() {
    let sources = ConfigSources {
        config_file: Some("/definitely/not/here/run.toml".into()),
        ..Default::default()
    };
    match load_and_validate(&sources) {
        Err(LauncherError::ConfigError { key, .. }) => assert_eq!(key, "--config"),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}
