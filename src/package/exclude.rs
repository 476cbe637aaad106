//! Exclusion glob with path-suffix matching.
//!
//! A relative pattern matches when it matches the trailing components of a
//! path: `internal/*` excludes `pkg/internal/helpers.py` as well as
//! `internal/helpers.py`. `*` never crosses a `/`.

use globset::{GlobBuilder, GlobMatcher};
use std::path::{Component, Path};

use crate::config::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    matcher: Option<GlobMatcher>,
}

impl ExcludeMatcher {
    /// Compile `pattern`. An empty pattern excludes nothing.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(Self::default());
        }
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigError::Validation(format!("invalid exclude_glob `{pattern}`: {e}")))?;
        Ok(Self {
            matcher: Some(glob.compile_matcher()),
        })
    }

    /// Whether `path` (relative, `/` or platform separated) is excluded.
    pub fn is_match(&self, path: &Path) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        let parts: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        (0..parts.len()).any(|start| matcher.is_match(parts[start..].join("/")))
    }
}
