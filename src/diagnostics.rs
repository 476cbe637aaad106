//! Recovered build problems.
//!
//! Nothing here aborts a build. Each page produces its own list during
//! rendering; lists are merged in page-processing order so the final report
//! is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::core::Route;
use crate::utils::plural;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Identifier with no usable candidate.
    Resolution,
    /// Several candidates matched the same priority scope.
    Ambiguity,
    /// A `[source]` link could not be produced.
    SourceNotFound,
    /// Site-root link to a page that does not exist.
    BrokenLink,
}

impl DiagnosticKind {
    /// `SourceNotFound` is informational and only shown with `--verbose`.
    pub fn is_warning(self) -> bool {
        !matches!(self, Self::SourceNotFound)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Resolution => "unresolved",
            Self::Ambiguity => "ambiguous",
            Self::SourceNotFound => "no source",
            Self::BrokenLink => "broken link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Page the problem was found on. Empty for the navigation tree.
    pub route: Route,
    /// Identifier or link target concerned.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        route: &Route,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            route: route.clone(),
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Ordered diagnostics of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.0.extend(other);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.0.iter().filter(|d| d.kind.is_warning()).count()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.0.iter().filter(|d| d.kind == kind).count()
    }

    /// Print diagnostics grouped by page. Informational entries only when `verbose`.
    pub fn print(&self, verbose: bool) {
        let mut grouped: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for d in self.0.iter().filter(|d| verbose || d.kind.is_warning()) {
            grouped.entry(d.route.as_str()).or_default().push(d);
        }
        if grouped.is_empty() {
            return;
        }

        eprintln!();
        for (route, entries) in grouped {
            let route = if route.is_empty() { "nav" } else { route };
            eprintln!("{}{}{}", "[".dimmed(), route.cyan(), "]".dimmed());
            for d in entries {
                let label = if d.kind.is_warning() {
                    d.kind.label().yellow().to_string()
                } else {
                    d.kind.label().dimmed().to_string()
                };
                eprintln!("{} {} {} {}", "→".red(), label, d.subject, d.message.dimmed());
            }
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let warnings = self.warning_count();
        if warnings == 0 {
            write!(f, "{}", "no warnings".green())
        } else {
            write!(
                f,
                "{} {}",
                "found".dimmed(),
                plural(warnings, "warning").yellow().bold()
            )
        }
    }
}
