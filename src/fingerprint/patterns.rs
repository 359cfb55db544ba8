// src/fingerprint/patterns.rs

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::fingerprint::path_utils::relative_str;
use crate::fs::FileSystem;

/// Include/exclude patterns for one goal, before compilation.
///
/// Patterns are relative to the goal's working directory and use `/` as the
/// separator: `**` crosses directories, `*` stays within one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Sources of patterns that get layered into one [`PatternSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternLayers<'a> {
    /// Built-in excludes (dependency and build-output directories).
    pub builtin_excludes: &'a [String],
    /// Goal defaults from the asset catalogs.
    pub default_includes: &'a [String],
    pub default_excludes: &'a [String],
    /// Project-wide user patterns.
    pub global_includes: &'a [String],
    pub global_excludes: &'a [String],
    /// Goal-specific user patterns.
    pub goal_includes: &'a [String],
    pub goal_excludes: &'a [String],
    pub use_default_includes: bool,
    pub use_default_excludes: bool,
}

impl PatternSet {
    /// Merge all layers, dropping duplicates but keeping first-seen order.
    ///
    /// Built-in excludes always apply; catalog defaults are optional. Since
    /// any exclude beats any include, the order only matters for logging.
    pub fn layered(layers: PatternLayers<'_>) -> Self {
        let mut includes = Vec::new();
        if layers.use_default_includes {
            extend_unique(&mut includes, layers.default_includes);
        }
        extend_unique(&mut includes, layers.global_includes);
        extend_unique(&mut includes, layers.goal_includes);

        let mut excludes = Vec::new();
        extend_unique(&mut excludes, layers.builtin_excludes);
        if layers.use_default_excludes {
            extend_unique(&mut excludes, layers.default_excludes);
        }
        extend_unique(&mut excludes, layers.global_excludes);
        extend_unique(&mut excludes, layers.goal_excludes);

        Self { includes, excludes }
    }
}

fn extend_unique(target: &mut Vec<String>, patterns: &[String]) {
    for p in patterns {
        if !target.contains(p) {
            target.push(p.clone());
        }
    }
}

/// Compiled include/exclude globs.
#[derive(Clone)]
pub struct FileSetResolver {
    include_set: Option<GlobSet>,
    exclude_set: GlobSet,
    /// Directories whose whole content is excluded (`<dir>/**` patterns),
    /// so the walk does not descend into them.
    pruned_dirs: GlobSet,
}

impl fmt::Debug for FileSetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSetResolver")
            .field("includes", &self.include_set.as_ref().map(GlobSet::len))
            .field("excludes", &self.exclude_set.len())
            .finish_non_exhaustive()
    }
}

impl FileSetResolver {
    pub fn new(patterns: &PatternSet) -> Result<Self> {
        let include_set = if patterns.includes.is_empty() {
            None
        } else {
            Some(build_globset(&patterns.includes).context("building include globset")?)
        };

        let exclude_set = build_globset(&patterns.excludes).context("building exclude globset")?;

        let dir_patterns: Vec<String> = patterns
            .excludes
            .iter()
            .filter_map(|p| p.strip_suffix("/**"))
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        let pruned_dirs = build_globset(&dir_patterns).context("building pruned dir globset")?;

        Ok(Self {
            include_set,
            exclude_set,
            pruned_dirs,
        })
    }

    /// Returns true if the given relative path (e.g. `"src/app.js"`) matches
    /// at least one include and no exclude.
    pub fn matches(&self, rel_path: &str) -> bool {
        let Some(include) = &self.include_set else {
            return false;
        };
        include.is_match(rel_path) && !self.exclude_set.is_match(rel_path)
    }

    /// Collect every regular file under `root` that [`matches`](Self::matches).
    ///
    /// The result is sorted and free of duplicates. A missing root yields an
    /// empty set. Each physical directory is walked once, so symlink cycles
    /// terminate; entries are visited in name order, which makes the first
    /// spelling of an aliased directory the one that is tracked. A directory
    /// that cannot be listed is logged and left out.
    pub fn resolve(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        if self.include_set.is_none() {
            return Ok(Vec::new());
        }
        if !fs.is_dir(root) {
            warn!(root = ?root, "fingerprint root is not a directory; no files tracked");
            return Ok(Vec::new());
        }

        let mut files = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            match fs.canonicalize(&dir) {
                Ok(real) => {
                    if !visited.insert(real) {
                        debug!(dir = ?dir, "directory already walked, skipping");
                        continue;
                    }
                }
                Err(e) => {
                    warn!(
                        dir = ?dir,
                        error = %format!("{e:#}"),
                        "cannot resolve directory, skipping"
                    );
                    continue;
                }
            }

            let mut entries = match fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        dir = ?dir,
                        error = %format!("{e:#}"),
                        "cannot read directory, skipping"
                    );
                    continue;
                }
            };
            entries.sort();

            let mut subdirs = Vec::new();
            for path in entries {
                let Some(rel) = relative_str(root, &path) else {
                    continue;
                };
                if fs.is_dir(&path) {
                    if self.pruned_dirs.is_match(&rel) {
                        debug!(dir = %rel, "skipping excluded directory");
                    } else {
                        subdirs.push(path);
                    }
                } else if fs.is_file(&path) && self.matches(&rel) {
                    files.insert(path);
                }
            }
            // Reversed so the first name is popped first.
            stack.extend(subdirs.into_iter().rev());
        }

        Ok(files.into_iter().collect())
    }
}

/// Build a GlobSet where `*` never crosses a `/`.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Check that every pattern compiles. Used by config validation.
pub fn validate_patterns(patterns: &[String]) -> Result<()> {
    build_globset(patterns).map(|_| ())
}
