//! `[links]` configuration: resolution priority and source links.
//!
//! # Example
//!
//! ```toml
//! [links]
//! repo_url = "https://github.com/org/repo"
//! ref = "main"
//! pattern = "^pkg\\."
//! priority = ["guide", "*"]
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::Priority;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Remote repository URL. Derived from the `origin` remote when unset.
    pub repo_url: Option<String>,

    /// Branch, tag or commit used in source URLs. Defaults to the short HEAD commit.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,

    /// Regex restricting which identifiers get code and source links.
    pub pattern: Option<String>,

    /// Scope priority for ambiguous identifiers.
    pub priority: Vec<String>,

    /// Append `[source]` links to identifier headings.
    pub source_links: bool,

    /// Fenced code languages scanned for identifier mentions.
    pub code_languages: Vec<String>,
}

impl LinksConfig {
    pub const PATTERN: FieldPath = FieldPath::new("links.pattern");
    pub const PRIORITY: FieldPath = FieldPath::new("links.priority");
    pub const REPO_URL: FieldPath = FieldPath::new("links.repo_url");

    /// Compiled identifier filter, anchored at the start like `re.match`.
    ///
    /// Returns `None` when no pattern is configured or it fails to compile
    /// (validation reports the latter).
    pub fn pattern_regex(&self) -> Option<Regex> {
        let pattern = self.pattern.as_deref()?;
        Regex::new(&format!("^(?:{pattern})")).ok()
    }

    pub fn priority(&self) -> Priority {
        Priority::new(&self.priority)
    }

    /// Whether a fenced code block language is scanned for mentions.
    pub fn is_code_language(&self, lang: &str) -> bool {
        let lang = lang.split_whitespace().next().unwrap_or_default();
        self.code_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(lang))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(pattern) = &self.pattern
            && let Err(e) = Regex::new(pattern)
        {
            diag.error(Self::PATTERN, format!("invalid regex: {e}"));
        }
        if self.priority.iter().any(|p| p.trim().is_empty()) {
            diag.error_with_hint(
                Self::PRIORITY,
                "priority entries must not be empty",
                "use `*` for any authored section",
            );
        }
        if let Some(url) = &self.repo_url
            && url.trim().is_empty()
        {
            diag.error(Self::REPO_URL, "repo_url is set but empty");
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            repo_url: None,
            git_ref: None,
            pattern: None,
            priority: vec!["*".into()],
            source_links: true,
            code_languages: ["python", "py", "python3", "pycon"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
