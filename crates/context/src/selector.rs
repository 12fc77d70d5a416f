//! Include/exclude glob matching on root-relative paths.
//!
//! Paths are always `/`-separated. `*` is allowed to cross directory
//! boundaries, so `*` alone matches every file. Exclusions win over
//! inclusions, and an empty include list includes everything.

use globset::{Glob, GlobSet, GlobSetBuilder};
use reporter_config::ContextConfig;
use reporter_core::error::ContextError;

#[derive(Debug, Clone)]
pub struct FileSelector {
    include: GlobSet,
    exclude: GlobSet,
    include_all: bool,
}

impl FileSelector {
    /// Compile the patterns of a context configuration.
    pub fn new(config: &ContextConfig) -> Result<Self, ContextError> {
        Ok(Self {
            include: build_set(&config.include_patterns)?,
            exclude: build_set(&config.exclude_patterns)?,
            include_all: config.include_patterns.is_empty(),
        })
    }

    /// Whether a path matches an exclusion pattern.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude.is_match(rel_path)
    }

    /// Whether a directory should be pruned from the walk.
    ///
    /// Directories are probed both bare and with a trailing `/`.
    pub fn is_excluded_dir(&self, rel_dir: &str) -> bool {
        let trimmed = rel_dir.trim_end_matches('/');
        self.exclude.is_match(trimmed) || self.exclude.is_match(format!("{trimmed}/"))
    }

    /// Whether a file should be part of the context.
    pub fn should_include(&self, rel_path: &str) -> bool {
        if self.is_excluded(rel_path) {
            return false;
        }
        self.include_all || self.include.is_match(rel_path)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, ContextError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ContextError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ContextError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}
