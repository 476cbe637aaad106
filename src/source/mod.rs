//! Source locations and remote source URLs.
//!
//! Lookups go through the frozen [`SymbolTable`]; results are cached per
//! identifier in a [`DashMap`] shared by all render workers. An entry is
//! written once and never replaced.

mod remote;

pub use remote::Remote;

use dashmap::DashMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::package::SymbolTable;
use crate::utils::path::relative_slash;

/// Characters kept verbatim in a URL path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'_')
    .remove(b'-')
    .remove(b'~');

/// Declaring file and 1-based line of an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Repository-relative, `/`-separated.
    pub path: String,
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

pub struct SourceLocator<'a> {
    symbols: &'a SymbolTable,
    base: PathBuf,
    remote: Option<Remote>,
    cache: DashMap<String, Option<SourceLocation>>,
}

impl<'a> SourceLocator<'a> {
    /// Paths are reported relative to `remote.workdir`, or `base` without a remote.
    pub fn new(symbols: &'a SymbolTable, base: PathBuf, remote: Option<Remote>) -> Self {
        let base = remote.as_ref().map_or(base, |r| r.workdir.clone());
        Self {
            symbols,
            base,
            remote,
            cache: DashMap::new(),
        }
    }

    pub fn locate(&self, identifier: &str) -> Option<SourceLocation> {
        if let Some(cached) = self.cache.get(identifier) {
            return cached.value().clone();
        }
        self.cache
            .entry(identifier.to_string())
            .or_insert_with(|| self.lookup(identifier))
            .value()
            .clone()
    }

    fn lookup(&self, identifier: &str) -> Option<SourceLocation> {
        let symbol = self.symbols.lookup(identifier)?;
        let file = symbol.file();
        let path = if file.is_absolute() && file.starts_with(&self.base) {
            relative_slash(file, &self.base)
        } else {
            file.to_string_lossy().replace('\\', "/")
        };
        Some(SourceLocation {
            path,
            line: symbol.line(),
        })
    }

    /// `<repo>/blob/<ref>/<path>#L<line>`, when a remote is known.
    pub fn url(&self, location: &SourceLocation) -> Option<String> {
        let remote = self.remote.as_ref()?;
        Some(format!(
            "{}/blob/{}/{}#L{}",
            remote.url,
            encode_path(&remote.git_ref),
            encode_path(&location.path),
            location.line
        ))
    }

    pub fn source_url(&self, identifier: &str) -> Option<String> {
        self.locate(identifier).and_then(|loc| self.url(&loc))
    }

    /// Number of identifiers looked up so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::ModuleInfo;
    use crate::package::python::{ImportBase, parse_module};
    use std::path::Path;

    const MATH: &str = "\"\"\"Math helpers.\"\"\"\n\n\ndef add(a, b):\n    return a + b\n\n\nclass MovingAverage:\n    def update(self, x):\n        pass\n";

    fn table(root: &Path) -> SymbolTable {
        SymbolTable::from_modules([ModuleInfo {
            dotted: "pkg.math".into(),
            file: root.join("src/pkg/math utils.py"),
            is_package: false,
            symbols: parse_module(
                MATH,
                ImportBase {
                    module: "pkg.math",
                    is_package: false,
                },
            ),
        }])
    }

    fn remote(root: &Path) -> Remote {
        Remote {
            url: "https://github.com/org/repo".into(),
            git_ref: "main".into(),
            workdir: root.to_path_buf(),
        }
    }

    #[test]
    fn test_locate() {
        let root = Path::new("/work/project");
        let symbols = table(root);
        let locator = SourceLocator::new(&symbols, root.to_path_buf(), None);

        let loc = locator.locate("pkg.math.add").unwrap();
        assert_eq!(loc.path, "src/pkg/math utils.py");
        assert_eq!(loc.line, 4);
        assert_eq!(locator.locate("pkg.math.MovingAverage.update").unwrap().line, 9);
        assert_eq!(locator.locate("pkg.math").unwrap().line, 1);
        assert!(locator.locate("pkg.math.missing").is_none());
        assert_eq!(locator.cached(), 4);
        assert!(locator.url(&loc).is_none());
    }

    #[test]
    fn test_source_url() {
        let root = Path::new("/work/project");
        let symbols = table(root);
        let locator = SourceLocator::new(&symbols, PathBuf::from("/elsewhere"), Some(remote(root)));
        assert_eq!(
            locator.source_url("pkg.math.MovingAverage").as_deref(),
            Some("https://github.com/org/repo/blob/main/src/pkg/math%20utils.py#L8")
        );
    }

    #[test]
    fn test_cache_is_stable() {
        let root = Path::new("/work/project");
        let symbols = table(root);
        let locator = SourceLocator::new(&symbols, root.to_path_buf(), None);
        let first = locator.locate("pkg.math.add");
        let second = locator.locate("pkg.math.add");
        assert_eq!(first, second);
        assert_eq!(locator.cached(), 1);
    }
}
