//! Default pattern catalogs used when a goal tracks its inputs.

use super::path_utils::normalize_relative;

const NPM_ASSETS: &[&str] = &["**/package.json", "**/package-lock.json", "**/.npmrc"];

const YARN_ASSETS: &[&str] = &["**/package.json", "**/yarn.lock", "**/.yarnrc", "**/.pnp.js"];

const PNPM_ASSETS: &[&str] = &["**/pnpm-lock.yaml", "**/pnpm-workspace.yaml"];

const BOWER_ASSETS: &[&str] = &["**/bower.json", "**/.bowerrc"];

const LERNA_ASSETS: &[&str] = &["**/lerna.json", "**/.lernarc"];

const LINTER_ASSETS: &[&str] = &["**/tslint*", "**/.eslint*", "**/.jshint*"];

const TOOLS_ASSETS: &[&str] = &["**/.browserslistrc", "**/browserslistrc", "**/.babelrc*"];

const JS_ASSETS: &[&str] = &[
    "**/*.js", "**/*.jsx", "**/*.cjs", "**/*.mjs", "**/*.ts", "**/*.tsx", "**/*.vue",
];

const STYLESHEET_ASSETS: &[&str] = &["**/*.css", "**/*.sass", "**/*.scss", "**/*.less"];

const TEMPLATE_ASSETS: &[&str] = &["**/*.html", "**/*.htm", "**/*.hbs", "**/*.mustache"];

const STATIC_ASSETS: &[&str] = &[
    "**/*.svg", "**/*.png", "**/*.jpg", "**/*.jpeg", "**/*.gif", "**/*.ico",
];

const FONT_ASSETS: &[&str] = &["**/*.otf", "**/*.eot", "**/*.ttf", "**/*.woff", "**/*.woff2"];

const OTHER_ASSETS: &[&str] = &[
    "**/*.json", "**/*.yml", "**/*.yaml", "**/*.xml", "**/*.env", "**/*.graphql",
];

const TEST_ASSETS: &[&str] = &[
    "**/*.spec.js",
    "**/*.test.js",
    "**/*.spec.ts",
    "**/*.test.ts",
    "**/*.test.json",
    "**/*.spec.json",
    "**/__tests__/*.js",
    "**/__tests__/*.ts",
];

/// Dependency directories never worth fingerprinting.
const DEPENDENCY_DIRS: &[&str] = &[
    "**/node_modules/**",
    "**/bower_components/**",
    "**/.pnpm-store/**",
    "**/.git/**",
];

fn collect(groups: &[&[&str]]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for group in groups {
        for pattern in group.iter() {
            if !out.iter().any(|p| p == pattern) {
                out.push((*pattern).to_string());
            }
        }
    }
    out
}

/// Excludes applied to every tracked goal: dependency directories plus the
/// build output directory, which holds the state files.
pub fn builtin_excludes(output_dir: &str) -> Vec<String> {
    let mut out = collect(&[DEPENDENCY_DIRS]);
    let output_dir = normalize_relative(output_dir);
    if !output_dir.is_empty() {
        out.push(format!("{output_dir}/**"));
    }
    out
}

pub fn install_assets() -> Vec<String> {
    collect(&[NPM_ASSETS, YARN_ASSETS, PNPM_ASSETS, BOWER_ASSETS, LERNA_ASSETS])
}

pub fn bower_assets() -> Vec<String> {
    collect(&[BOWER_ASSETS])
}

pub fn lint_assets() -> Vec<String> {
    collect(&[NPM_ASSETS, YARN_ASSETS, LINTER_ASSETS, JS_ASSETS])
}

pub fn build_assets() -> Vec<String> {
    collect(&[
        NPM_ASSETS,
        YARN_ASSETS,
        PNPM_ASSETS,
        BOWER_ASSETS,
        LERNA_ASSETS,
        TOOLS_ASSETS,
        JS_ASSETS,
        STYLESHEET_ASSETS,
        TEMPLATE_ASSETS,
        STATIC_ASSETS,
        FONT_ASSETS,
        OTHER_ASSETS,
    ])
}

/// Files that never influence a build: host descriptors, tests, linters.
pub fn build_ignore_assets() -> Vec<String> {
    let mut out = vec!["**/pom.xml".to_string()];
    for p in collect(&[TEST_ASSETS, LINTER_ASSETS]) {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

pub fn test_assets() -> Vec<String> {
    collect(&[NPM_ASSETS, YARN_ASSETS, TOOLS_ASSETS, JS_ASSETS, TEST_ASSETS])
}
