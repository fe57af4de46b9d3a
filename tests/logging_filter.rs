use tracing::level_filters::LevelFilter;
use ursm_launch::cli::LogLevel;
use ursm_launch::logging::{env_filter, filter_directives};

#[test]
fn cli_level_wins_over_environment() {
    assert_eq!(filter_directives(Some(LogLevel::Warn), Some("trace")), "warn");
}

#[test]
fn environment_directives_pass_through() {
    let d = "info,ursm_launch::exec::process=debug";
    assert_eq!(filter_directives(None, Some(d)), d);
    assert_eq!(filter_directives(None, Some("  ")), "info");
    assert_eq!(filter_directives(None, None), "info");
}

#[test]
fn malformed_directives_fall_back_to_default() {
    let filter = env_filter(None, Some("ursm_launch=notalevel"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));

    let filter = env_filter(None, Some("debug"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}
