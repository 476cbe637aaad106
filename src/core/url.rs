//! Route and URL path types.
//!
//! - [`Route`]: docs-relative page identity (`reference/pkg/math`), no extension
//! - [`UrlPath`]: where the page is served (`/reference/pkg/math/`)

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Page route: a `/`-separated, docs-relative path without extension.
///
/// Invariants:
/// - Never starts or ends with `/`
/// - Never carries a `.md` extension
/// - Index pages end with the `index` segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route(Arc<str>);

impl Route {
    /// Normalize a user-supplied route (`/guide/index.md` -> `guide/index`).
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('/');
        let trimmed = trimmed.strip_suffix(".md").unwrap_or(trimmed);
        let joined = trimmed
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self(Arc::from(joined))
    }

    /// Create a route from a docs-relative file path (`guide/intro.md`).
    pub fn from_source_path(rel: &Path) -> Self {
        let raw = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(&raw)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments of the route.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Whether this route is a directory index page.
    pub fn is_index(&self) -> bool {
        self.segments().last() == Some("index")
    }

    /// The route joined with a child segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self::new(segment)
        } else {
            Self::new(&format!("{}/{}", self.0, segment))
        }
    }

    /// Relative file name of the emitted Markdown page.
    pub fn output_file(&self) -> String {
        format!("{}.md", self.0)
    }

    /// URL where this page is served.
    ///
    /// ```text
    /// directory_urls = true:  guide/intro -> /guide/intro/   guide/index -> /guide/
    /// directory_urls = false: guide/intro -> /guide/intro.html
    /// ```
    pub fn url(&self, directory_urls: bool) -> UrlPath {
        let segments: Vec<&str> = self.segments().collect();
        if !directory_urls {
            return UrlPath::from_page_path(&format!("/{}.html", segments.join("/")));
        }
        let dir = match segments.split_last() {
            Some((&"index", parent)) => parent,
            _ => &segments[..],
        };
        if dir.is_empty() {
            UrlPath::root()
        } else {
            UrlPath::from_page_path(&format!("/{}/", dir.join("/")))
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl PartialEq<str> for Route {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Route {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Site-root URL path of a page.
///
/// Invariants:
/// - Always starts with `/`
/// - Directory-style URLs end with `/`, file-style URLs end with the file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// The site root (`/`).
    pub fn root() -> Self {
        Self(Arc::from("/"))
    }

    /// Create from a site-root path, adding the leading slash if missing.
    pub fn from_page_path(path: &str) -> Self {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Self::root();
        }
        if trimmed.starts_with('/') {
            Self(Arc::from(trimmed))
        } else {
            Self(Arc::from(format!("/{trimmed}")))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory segments (the path without its file part).
    pub fn dir_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.0.split('/').filter(|s| !s.is_empty()).collect();
        if !self.is_directory() {
            segments.pop();
        }
        segments
    }

    /// File part of a file-style URL (`page.html`), `None` for directory URLs.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_directory() {
            None
        } else {
            self.0.rsplit('/').next().filter(|s| !s.is_empty())
        }
    }

    /// Whether this URL addresses a directory (ends with `/`).
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }
}

impl fmt::Display for UrlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for UrlPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl PartialEq<str> for UrlPath {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for UrlPath {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_route_normalization() {
        assert_eq!(Route::new("/guide/intro.md"), "guide/intro");
        assert_eq!(Route::new("reference/"), "reference");
        assert_eq!(Route::new("./a//b"), "a/b");
        assert_eq!(Route::new(""), "");
    }

    #[test]
    fn test_route_from_source_path() {
        let route = Route::from_source_path(&PathBuf::from("guide").join("index.md"));
        assert_eq!(route, "guide/index");
        assert!(route.is_index());
    }

    #[test]
    fn test_route_join() {
        let base = Route::new("reference");
        assert_eq!(base.join("pkg").join("math"), "reference/pkg/math");
        assert_eq!(Route::new("").join("index"), "index");
    }

    #[test]
    fn test_directory_urls() {
        assert_eq!(Route::new("index").url(true), "/");
        assert_eq!(Route::new("guide/index").url(true), "/guide/");
        assert_eq!(Route::new("reference/pkg/math").url(true), "/reference/pkg/math/");
    }

    #[test]
    fn test_file_urls() {
        assert_eq!(Route::new("index").url(false), "/index.html");
        assert_eq!(Route::new("guide/intro").url(false), "/guide/intro.html");
    }

    #[test]
    fn test_url_dir_segments() {
        assert_eq!(UrlPath::from_page_path("/a/b/").dir_segments(), vec!["a", "b"]);
        assert_eq!(UrlPath::from_page_path("/a/b.html").dir_segments(), vec!["a"]);
        assert!(UrlPath::root().dir_segments().is_empty());
        assert_eq!(UrlPath::from_page_path("/a/b.html").file_name(), Some("b.html"));
        assert_eq!(UrlPath::from_page_path("/a/").file_name(), None);
    }
}
