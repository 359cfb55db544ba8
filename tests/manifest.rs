use std::error::Error;
use std::path::Path;

use scriptgate::errors::ScriptgateError;
use scriptgate::fs::mock::MockFileSystem;
use scriptgate::manifest::{detect_client, PackageJson};
use scriptgate::types::{Client, ClientSetting};

type TestResult = Result<(), Box<dyn Error>>;

const MANIFEST: &str = r#"{
  "name": "web-app",
  "version": "2.1.0",
  "scripts": { "build": "webpack", "lint": "eslint ." },
  "dependencies": { "react": "^18.2.0" },
  "devDependencies": { "webpack": "^5.0.0" },
  "engines": { "node": ">=18" },
  "private": true
}"#;

#[test]
fn manifest_fields_are_read() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/p/package.json", MANIFEST);

    let manifest = PackageJson::read(&fs, Path::new("/p"))?;

    assert_eq!(manifest.name.as_deref(), Some("web-app"));
    assert_eq!(manifest.version.as_deref(), Some("2.1.0"));
    assert!(manifest.has_script("build"));
    assert!(!manifest.has_script("test"));
    assert_eq!(manifest.script_names().into_iter().collect::<Vec<_>>(), vec!["build", "lint"]);
    assert_eq!(manifest.dependencies.get("react").map(String::as_str), Some("^18.2.0"));
    assert_eq!(manifest.dev_dependencies.len(), 1);
    assert_eq!(manifest.required_engine("node"), Some(">=18"));
    assert_eq!(manifest.required_engine("npm"), None);
    Ok(())
}

#[test]
fn missing_manifest_is_a_distinct_error() {
    let fs = MockFileSystem::new();
    fs.add_dir("/p");

    match PackageJson::read(&fs, Path::new("/p")) {
        Err(ScriptgateError::ManifestNotFound(dir)) => assert_eq!(dir, Path::new("/p")),
        other => panic!("Expected ManifestNotFound, got: {:?}", other),
    }
}

#[test]
fn malformed_manifest_is_a_json_error() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/package.json", "{ not json");

    let err = PackageJson::read(&fs, Path::new("/p")).expect_err("invalid json");
    assert!(matches!(err, ScriptgateError::JsonError(_)));
}

#[test]
fn client_is_detected_from_lock_files() {
    let fs = MockFileSystem::new();
    fs.add_file("/npm/package-lock.json", "{}");
    fs.add_file("/yarn/yarn.lock", "");
    fs.add_file("/pnpm/pnpm-lock.yaml", "");

    assert_eq!(detect_client(&fs, Path::new("/npm"), ClientSetting::Auto), Client::Npm);
    assert_eq!(detect_client(&fs, Path::new("/yarn"), ClientSetting::Auto), Client::Yarn);
    assert_eq!(detect_client(&fs, Path::new("/pnpm"), ClientSetting::Auto), Client::Pnpm);
    assert_eq!(detect_client(&fs, Path::new("/yarn"), ClientSetting::Npm), Client::Npm);
}
