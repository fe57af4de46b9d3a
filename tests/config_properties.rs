mod common;
use crate::common::builders::RawConfigBuilder;

use std::path::Path;

use proptest::prelude::*;
use ursm_launch::config::RunConfig;
use ursm_launch::config::model::REQUIRED_KEYS;
use ursm_launch::errors::LauncherError;

const COUNT_KEYS: [&str; 4] = [
    "number_of_cell_types",
    "burn_in_length",
    "gibbs_sample_number",
    "EM_maxiter",
];

fn path_strategy() -> impl Strategy<Value = String> {
    "/[a-z]{1,8}(/[a-z0-9_.]{1,12}){0,3}"
}

proptest! {
    #[test]
    fn valid_mapping_round_trips_into_fields(
        script in path_strategy(),
        sc in path_strategy(),
        bulk in path_strategy(),
        k in 1u32..=64,
        burn_in in 0u64..100_000,
        samples in 0u64..100_000,
        em in 0u64..10_000,
        prefix in "[a-zA-Z0-9_]{0,10}",
    ) {
        let raw = RawConfigBuilder::new("/data")
            .set("script_path", script.clone())
            .set("single_cell_expr_file", sc.clone())
            .set("bulk_expr_file", bulk.clone())
            .set("number_of_cell_types", k.to_string())
            .set("burn_in_length", burn_in.to_string())
            .set("gibbs_sample_number", samples.to_string())
            .set("EM_maxiter", em.to_string())
            .set("output_prefix", prefix.clone())
            .build();

        let cfg = RunConfig::try_from(raw).unwrap();
        prop_assert_eq!(cfg.script_path(), Path::new(&script));
        prop_assert_eq!(cfg.single_cell_expr_file(), Path::new(&sc));
        prop_assert_eq!(cfg.bulk_expr_file(), Path::new(&bulk));
        prop_assert_eq!(cfg.number_of_cell_types(), k);
        prop_assert_eq!(cfg.burn_in_length(), burn_in);
        prop_assert_eq!(cfg.gibbs_sample_number(), samples);
        prop_assert_eq!(cfg.em_maxiter(), em);
        prop_assert_eq!(cfg.output_prefix(), prefix.as_str());
    }

    #[test]
    fn any_missing_required_key_is_named(idx in 0usize..REQUIRED_KEYS.len()) {
        let key = REQUIRED_KEYS[idx];
        let raw = RawConfigBuilder::new("/data").without(key).build();

        match RunConfig::try_from(raw) {
            Err(LauncherError::ConfigError { key: reported, .. }) => prop_assert_eq!(reported, key),
            other => prop_assert!(false, "expected ConfigError for {}, got {:?}", key, other),
        }
    }

    #[test]
    fn negative_counts_are_rejected(idx in 0usize..COUNT_KEYS.len(), n in 1i64..1_000_000) {
        let key = COUNT_KEYS[idx];
        let raw = RawConfigBuilder::new("/data").set(key, format!("-{n}")).build();

        match RunConfig::try_from(raw) {
            Err(LauncherError::ConfigError { key: reported, .. }) => prop_assert_eq!(reported, key),
            other => prop_assert!(false, "expected ConfigError for {}, got {:?}", key, other),
        }
    }

    #[test]
    fn non_integer_counts_are_rejected(idx in 0usize..COUNT_KEYS.len(), junk in "[a-z.]{1,6}") {
        let key = COUNT_KEYS[idx];
        let raw = RawConfigBuilder::new("/data").set(key, junk).build();
        prop_assert!(
            matches!(RunConfig::try_from(raw), Err(LauncherError::ConfigError { .. })),
            "expected ConfigError"
        );
    }
}
