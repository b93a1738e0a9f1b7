// src/watch/filter.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

/// File-name filter for restart signals (`*.asrestart` by default).
///
/// Only the final path component is matched, so a signal is recognised no
/// matter which watched directory it shows up in.
#[derive(Clone)]
pub struct SignalFilter {
    pattern: String,
    matcher: GlobMatcher,
}

impl SignalFilter {
    /// Build the filter `*<suffix>`, e.g. `".asrestart"` -> `*.asrestart`.
    ///
    /// Matching ignores case on Windows, where file names do too.
    pub fn from_suffix(suffix: &str) -> Result<Self> {
        let pattern = format!("*{suffix}");
        let glob = GlobBuilder::new(&pattern)
            .case_insensitive(cfg!(windows))
            .build()
            .with_context(|| format!("invalid signal pattern {:?}", pattern))?;
        Ok(Self {
            pattern,
            matcher: glob.compile_matcher(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Does the file name of `path` match the filter?
    pub fn matches(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.matcher.is_match(name),
            None => false,
        }
    }
}

impl fmt::Debug for SignalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalFilter")
            .field("pattern", &self.pattern)
            .finish()
    }
}
