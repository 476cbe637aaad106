//! Reference resolution.
//!
//! # Module Structure
//!
//! ```text
//! resolve/
//! ├── mod.rs       # ReferenceResolver, Resolution
//! └── mentions.rs  # identifier mentions inside code blocks
//! ```
//!
//! Candidates come from the [`IdentifierIndex`] in page processing order.
//! Priority scopes are tried in order and the first matching candidate wins.

pub mod mentions;

pub use mentions::code_mentions;

use crate::core::{Priority, Route};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::xref::{Anchor, IdentifierIndex};

/// Outcome of resolving one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Exactly one candidate, or exactly one in the first matching scope.
    Resolved(&'a Anchor),
    /// Several candidates in the first matching scope; the earliest wins.
    Ambiguous { chosen: &'a Anchor, matching: usize },
    /// No priority scope matched; the earliest candidate is used.
    Fallback(&'a Anchor),
    Unresolved,
}

impl<'a> Resolution<'a> {
    pub fn anchor(&self) -> Option<&'a Anchor> {
        match *self {
            Self::Resolved(a) | Self::Ambiguous { chosen: a, .. } | Self::Fallback(a) => Some(a),
            Self::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceResolver<'a> {
    index: &'a IdentifierIndex,
    priority: Priority,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(index: &'a IdentifierIndex, priority: Priority) -> Self {
        Self { index, priority }
    }

    /// Resolve a fully-qualified identifier.
    pub fn resolve(&self, identifier: &str) -> Resolution<'a> {
        let candidates = self.index.candidates(identifier);
        match candidates {
            [] => return Resolution::Unresolved,
            [only] => return Resolution::Resolved(only),
            _ => {}
        }

        for scope in self.priority.iter() {
            let mut matching = candidates.iter().filter(|c| scope.matches(&c.scope));
            if let Some(first) = matching.next() {
                let others = matching.count();
                return if others == 0 {
                    Resolution::Resolved(first)
                } else {
                    Resolution::Ambiguous {
                        chosen: first,
                        matching: others + 1,
                    }
                };
            }
        }
        Resolution::Fallback(&candidates[0])
    }

    /// Resolve and record any problem against `route`.
    pub fn resolve_reported(
        &self,
        identifier: &str,
        route: &Route,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'a Anchor> {
        let resolution = self.resolve(identifier);
        match resolution {
            Resolution::Resolved(_) => {}
            Resolution::Ambiguous { chosen, matching } => diagnostics.push(Diagnostic::new(
                DiagnosticKind::Ambiguity,
                route,
                identifier,
                format!(
                    "{matching} candidates in scope `{}`, using {}#{}",
                    chosen.scope, chosen.url, chosen.id
                ),
            )),
            Resolution::Fallback(chosen) => diagnostics.push(Diagnostic::new(
                DiagnosticKind::Resolution,
                route,
                identifier,
                format!(
                    "no candidate matches the priority order, using {}#{}",
                    chosen.url, chosen.id
                ),
            )),
            Resolution::Unresolved => diagnostics.push(Diagnostic::new(
                DiagnosticKind::Resolution,
                route,
                identifier,
                "no anchor found",
            )),
        }
        resolution.anchor()
    }
}
