//! Anchor scopes and the scope priority order used for disambiguation.

use std::fmt;

use serde::{Serialize, Serializer};

/// Name of the scope given to generated reference pages.
pub const REFERENCE_SCOPE: &str = "reference";

/// Name of the wildcard scope.
pub const WILDCARD_SCOPE: &str = "*";

/// Scope tag of an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Anchor lives on a generated reference page.
    Reference,
    /// Anchor lives on an authored page under the named top-level nav section.
    Section(String),
    /// Wildcard: any non-reference section.
    Any,
}

impl Scope {
    /// Parse a scope name as written in configuration.
    ///
    /// Section names are normalized with [`section_scope_name`].
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name == WILDCARD_SCOPE {
            Self::Any
        } else if name.eq_ignore_ascii_case(REFERENCE_SCOPE) {
            Self::Reference
        } else {
            Self::Section(section_scope_name(name))
        }
    }

    /// Scope of an authored page under a top-level section title (if any).
    ///
    /// Always a section: the reference scope belongs to generated pages,
    /// even when the section is titled "Reference".
    pub fn for_section(title: Option<&str>) -> Self {
        match title {
            Some(title) => Self::Section(section_scope_name(title)),
            None => Self::Any,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Reference => REFERENCE_SCOPE,
            Self::Section(name) => name,
            Self::Any => WILDCARD_SCOPE,
        }
    }

    /// Whether a candidate anchor with scope `candidate` satisfies this priority entry.
    ///
    /// | entry       | matches                                 |
    /// |-------------|-----------------------------------------|
    /// | `reference` | only `reference`                        |
    /// | `*`         | anything but `reference`                |
    /// | `guide`     | `guide`, and anchors scoped `*`         |
    pub fn matches(&self, candidate: &Scope) -> bool {
        match (self, candidate) {
            (Self::Reference, c) => *c == Self::Reference,
            (Self::Any, c) => *c != Self::Reference,
            (Self::Section(a), Self::Section(b)) => a == b,
            (Self::Section(_), Self::Any) => true,
            (Self::Section(_), Self::Reference) => false,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalize a section title into a scope name (`User Guide` -> `user-guide`).
pub fn section_scope_name(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Ordered scope priority consumed by the resolver.
///
/// The reference scope is implicitly last unless listed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Priority(Vec<Scope>);

impl Priority {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let mut scopes: Vec<Scope> = names.iter().map(|n| Scope::parse(n.as_ref())).collect();
        if !scopes.contains(&Scope::Reference) {
            scopes.push(Scope::Reference);
        }
        Self(scopes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.0.iter()
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::new(&[WILDCARD_SCOPE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Scope::parse("*"), Scope::Any);
        assert_eq!(Scope::parse("reference"), Scope::Reference);
        assert_eq!(Scope::parse("Reference"), Scope::Reference);
        assert_eq!(Scope::parse("User Guide"), Scope::Section("user-guide".into()));
    }

    #[test]
    fn test_reference_section_is_not_reference_scope() {
        let authored = Scope::for_section(Some("Reference"));
        assert_eq!(authored, Scope::Section("reference".into()));
        assert!(!Scope::Reference.matches(&authored));
        assert!(Scope::Any.matches(&authored));
    }

    #[test]
    fn test_matches() {
        let guide = Scope::Section("guide".into());
        let api = Scope::Section("api".into());

        assert!(Scope::Any.matches(&guide));
        assert!(Scope::Any.matches(&Scope::Any));
        assert!(!Scope::Any.matches(&Scope::Reference));

        assert!(Scope::Reference.matches(&Scope::Reference));
        assert!(!Scope::Reference.matches(&guide));

        assert!(guide.matches(&guide));
        assert!(guide.matches(&Scope::Any));
        assert!(!guide.matches(&api));
        assert!(!guide.matches(&Scope::Reference));
    }

    #[test]
    fn test_priority_appends_reference() {
        let p = Priority::new(&["guide"]);
        let scopes: Vec<_> = p.iter().cloned().collect();
        assert_eq!(scopes, vec![Scope::Section("guide".into()), Scope::Reference]);

        let p = Priority::new(&["reference", "guide"]);
        let scopes: Vec<_> = p.iter().cloned().collect();
        assert_eq!(scopes, vec![Scope::Reference, Scope::Section("guide".into())]);
    }

    #[test]
    fn test_default_priority() {
        let scopes: Vec<_> = Priority::default().iter().cloned().collect();
        assert_eq!(scopes, vec![Scope::Any, Scope::Reference]);
    }
}
