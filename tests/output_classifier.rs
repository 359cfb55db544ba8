use regex::Regex;

use scriptgate::exec::{ClassifierRule, LineClassifier, OutputSink, Severity, TracingSink};
use scriptgate::logging::CLIENT_OUTPUT_TARGET;
use scriptgate_test_utils::LogCapture;

#[test]
fn npm_and_yarn_prefixes_are_classified() {
    let classifier = LineClassifier::js_clients();

    let cases = [
        ("npm WARN deprecated request@2.88.2", Severity::Warn),
        ("npm warn config production Use `--omit=dev` instead.", Severity::Warn),
        ("warning package.json: No license field", Severity::Warn),
        ("WARNING in ./src/index.js", Severity::Warn),
        ("(node:1234) [DEP0005] DeprecationWarning: Buffer() is deprecated", Severity::Warn),
        ("npm ERR! code ELIFECYCLE", Severity::Error),
        ("npm error code E404", Severity::Error),
        ("error Command failed with exit code 1.", Severity::Error),
        ("> webpack --mode production", Severity::Info),
        ("", Severity::Info),
    ];

    for (line, expected) in cases {
        assert_eq!(classifier.classify(line), expected, "line: {line:?}");
    }
}

#[test]
fn pnpm_markers_are_classified() {
    let classifier = LineClassifier::js_clients();

    assert_eq!(classifier.classify(" WARN  deprecated core-js@2.6.12"), Severity::Warn);
    assert_eq!(
        classifier.classify(" ERR_PNPM_NO_SCRIPT  Missing script: lint"),
        Severity::Error
    );
}

#[test]
fn prefixes_only_match_at_line_start() {
    let classifier = LineClassifier::js_clients();
    assert_eq!(classifier.classify("no error here"), Severity::Info);
    assert_eq!(classifier.classify("0 warning found"), Severity::Info);
}

#[test]
fn first_matching_rule_wins_and_rules_can_be_added() {
    let classifier = LineClassifier::new(vec![
        ClassifierRule::starts_with("[lint]", Severity::Warn),
        ClassifierRule::contains("FATAL", Severity::Error),
    ])
    .with_rule(ClassifierRule::pattern(
        Regex::new(r"^\d+ problems?").unwrap(),
        Severity::Error,
    ));

    assert_eq!(classifier.classify("[lint] FATAL parser crash"), Severity::Warn);
    assert_eq!(classifier.classify("FATAL parser crash"), Severity::Error);
    assert_eq!(classifier.classify("3 problems (3 errors, 0 warnings)"), Severity::Error);
    assert_eq!(classifier.classify("all good"), Severity::Info);
}

#[test]
fn client_lines_are_logged_under_their_own_target() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let sink = TracingSink::new("build", LineClassifier::js_clients());
    sink.line("npm WARN deprecated left-pad@1.0.0");
    sink.line("compiled in 42ms");

    let warn = logs.lines_with("WARN", "left-pad");
    assert_eq!(warn.len(), 1, "logs: {}", logs.contents());
    assert!(warn[0].contains(CLIENT_OUTPUT_TARGET));
    assert!(warn[0].contains("goal=build"));
    assert_eq!(logs.lines_with("INFO", "compiled in 42ms").len(), 1);
}
