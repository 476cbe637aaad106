//! Dotted identifier helpers (`pkg.math.MovingAverage`).

/// Check if `s` is a single identifier segment (`[A-Za-z_][A-Za-z0-9_]*`).
#[inline]
pub fn is_segment(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check if `s` parses as a dotted identifier (one or more segments joined by `.`).
///
/// # Examples
/// ```ignore
/// assert!(is_dotted("pkg.math.add"));
/// assert!(is_dotted("overview"));
/// assert!(!is_dotted("getting-started"));
/// assert!(!is_dotted("pkg..add"));
/// ```
pub fn is_dotted(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_segment)
}

/// Check if `s` is a qualified dotted identifier (at least two segments).
#[inline]
pub fn is_qualified(s: &str) -> bool {
    s.contains('.') && is_dotted(s)
}

/// First segment of a dotted identifier (`pkg` for `pkg.math.add`).
#[inline]
pub fn root_segment(s: &str) -> &str {
    s.split('.').next().unwrap_or(s)
}

/// Join a dotted prefix and a name, tolerating an empty prefix.
pub fn join(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}.{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_segment() {
        assert!(is_segment("MovingAverage"));
        assert!(is_segment("_private"));
        assert!(is_segment("x1"));
        assert!(!is_segment("1x"));
        assert!(!is_segment(""));
        assert!(!is_segment("a-b"));
    }

    #[test]
    fn test_is_dotted() {
        assert!(is_dotted("pkg.math.MovingAverage"));
        assert!(is_dotted("overview"));
        assert!(!is_dotted("getting-started"));
        assert!(!is_dotted("pkg..add"));
        assert!(!is_dotted(".pkg"));
        assert!(!is_dotted("pkg."));
        assert!(!is_dotted(""));
    }

    #[test]
    fn test_is_qualified() {
        assert!(is_qualified("pkg.add"));
        assert!(!is_qualified("add"));
        assert!(!is_qualified("pkg.--x"));
    }

    #[test]
    fn test_join_and_root() {
        assert_eq!(join("pkg", "math"), "pkg.math");
        assert_eq!(join("", "pkg"), "pkg");
        assert_eq!(join("pkg", ""), "pkg");
        assert_eq!(root_segment("pkg.math.add"), "pkg");
        assert_eq!(root_segment("pkg"), "pkg");
    }
}
