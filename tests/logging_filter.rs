use scriptgate::cli::LogLevel;
use scriptgate::logging::{filter_directives, parse_level_str};

#[test]
fn cli_level_beats_the_environment() {
    assert_eq!(filter_directives(Some(LogLevel::Debug), Some("warn")), "debug");
    assert_eq!(filter_directives(Some(LogLevel::Error), None), "error");
}

#[test]
fn environment_accepts_bare_levels_and_directives() {
    assert_eq!(filter_directives(None, Some("WARNING")), "warn");
    assert_eq!(
        filter_directives(None, Some("info,scriptgate::client=warn")),
        "info,scriptgate::client=warn"
    );
}

#[test]
fn unusable_environment_falls_back_to_info() {
    assert_eq!(filter_directives(None, None), "info");
    assert_eq!(filter_directives(None, Some("   ")), "info");
    assert_eq!(filter_directives(None, Some("scriptgate=loud")), "info");
}

#[test]
fn level_names_are_case_insensitive() {
    assert_eq!(parse_level_str(" Trace "), Some(tracing::Level::TRACE));
    assert_eq!(parse_level_str("verbose"), None);
}
