use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use scriptgate::config::{load_and_validate, load_or_default, ConfigFile, RawConfigFile};
use scriptgate::errors::ScriptgateError;
use scriptgate::types::{Client, ClientSetting, LockStrategy};

type TestResult = Result<(), Box<dyn Error>>;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn demo_config_loads_with_every_section() -> TestResult {
    let cfg = load_and_validate(demo("Scriptgate.toml"))?;

    assert_eq!(cfg.build.client, ClientSetting::Auto);
    assert!(!cfg.build.fail_on_missing_script);
    assert!(!cfg.build.ignore_proxies);
    assert_eq!(cfg.build.environment.get("CI").map(String::as_str), Some("true"));

    assert!(cfg.incremental.is_enabled("build"));
    assert!(!cfg.incremental.is_enabled("lint"));
    assert_eq!(cfg.incremental.includes("build"), ["assets/**".to_string()]);
    assert!(cfg.incremental.use_default_includes("build"));

    assert_eq!(cfg.lock.get("lint"), Some(&LockStrategy::None));
    assert_eq!(cfg.lock.get("test-e2e"), Some(&LockStrategy::Write));
    assert_eq!(
        cfg.goal_section("build").and_then(|g| g.script.as_deref()),
        Some("build --prod")
    );

    assert_eq!(cfg.proxy.len(), 2);
    assert!(cfg.proxy[0].active);
    assert!(!cfg.proxy[1].active);
    assert_eq!(cfg.proxy[1].protocol, "http");

    assert!(cfg.is_standard_command(Client::Npm, "audit"));
    assert!(cfg.is_standard_command(Client::Npm, "INSTALL"));
    assert!(!cfg.is_standard_command(Client::Npm, "build"));
    // yarn keeps its built-in table.
    assert!(cfg.is_standard_command(Client::Yarn, "pack"));
    Ok(())
}

#[test]
fn offline_demo_loads() -> TestResult {
    let cfg = load_and_validate(demo("offline.toml"))?;
    assert!(cfg.build.offline);
    assert!(cfg.build.skip_tests);
    assert_eq!(cfg.build.client, ClientSetting::Npm);
    Ok(())
}

#[test]
fn empty_file_gives_defaults() -> TestResult {
    let file = write_config("");
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.build.output_dir, "target");
    assert!(cfg.build.fail_on_error);
    assert!(cfg.build.fail_on_missing_script);
    assert!(cfg.build.ignore_proxies);
    assert!(cfg.build.trigger_flag);
    assert!(cfg.build.persist_after_tolerated_failure);
    assert!(!cfg.incremental.is_enabled("build"));
    Ok(())
}

#[test]
fn missing_default_file_falls_back_to_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = load_or_default(dir.path().join("Scriptgate.toml"))?;
    assert_eq!(cfg.build.trigger_flag_name, "--scriptgate");
    Ok(())
}

#[test]
fn unknown_lock_strategy_is_a_toml_error() {
    let file = write_config("[lock]\nbuild = \"exclusive\"\n");
    let err = load_and_validate(file.path()).expect_err("bad lock strategy");
    assert!(matches!(err, ScriptgateError::TomlError(_)));
}

#[test]
fn empty_goal_script_is_rejected() {
    let file = write_config("[goal.build]\nscript = \"  \"\n");
    match load_and_validate(file.path()) {
        Err(ScriptgateError::ConfigError(msg)) => {
            assert!(msg.contains("build"));
            assert!(msg.contains("script"));
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn invalid_incremental_glob_is_rejected() {
    let file = write_config("[incremental.goal.build]\nincludes = [\"src/[oops\"]\n");
    match load_and_validate(file.path()) {
        Err(ScriptgateError::ConfigError(msg)) => assert!(msg.contains("incremental.goal.build")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn output_dir_must_stay_inside_the_module() {
    let file = write_config("[build]\noutput_dir = \"../shared\"\n");
    let err = load_and_validate(file.path()).expect_err("escaping output dir");
    assert!(err.is_config_error());
}

#[test]
fn proxy_without_host_is_rejected() {
    let file = write_config("[[proxy]]\nhost = \"\"\nport = 8080\n");
    let err = load_and_validate(file.path()).expect_err("empty proxy host");
    assert!(matches!(err, ScriptgateError::ConfigError(ref m) if m.contains("proxy #1")));
}

#[test]
fn unknown_client_in_standard_commands_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.standard_commands
        .insert("bun".to_string(), vec!["install".to_string()]);

    let err = ConfigFile::try_from(raw).expect_err("bun is not a supported client");
    assert!(matches!(err, ScriptgateError::ConfigError(ref m) if m.contains("bun")));
}

#[test]
fn standard_command_tables_match_client_names_case_insensitively() -> TestResult {
    let file = write_config("[standard_commands]\nNPM = [\"audit\"]\n");
    let cfg = load_and_validate(file.path())?;

    assert!(cfg.is_standard_command(Client::Npm, "audit"));
    // The override replaces npm's built-in table.
    assert!(!cfg.is_standard_command(Client::Npm, "install"));
    Ok(())
}

#[test]
fn same_client_listed_twice_is_rejected() {
    let file = write_config("[standard_commands]\nnpm = [\"audit\"]\nNpm = [\"ci\"]\n");
    let err = load_and_validate(file.path()).expect_err("npm listed twice");
    assert!(matches!(err, ScriptgateError::ConfigError(ref m) if m.contains("more than once")));
}

#[test]
fn output_dir_that_names_the_module_itself_is_rejected() {
    let file = write_config("[build]\noutput_dir = \"./\"\n");
    let err = load_and_validate(file.path()).expect_err("output dir is the module root");
    assert!(err.is_config_error());
}

#[test]
fn dotted_output_dir_is_accepted() -> TestResult {
    let file = write_config("[build]\noutput_dir = \"./out/\"\n");
    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.build.output_dir, "./out/");
    Ok(())
}
