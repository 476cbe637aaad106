//! Package tree discovery.
//!
//! Walks each configured root and builds the module forest:
//!
//! - a package is a directory holding `__init__.py`
//! - a module is any other importable `*.py` file inside a package
//! - `__main__.py`, `__pycache__` and hidden entries are skipped
//! - directories without `__init__.py` are not packages, but packages nested
//!   inside them are still found
//!
//! Children are sorted by segment so downstream navigation is deterministic.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{ExcludeMatcher, ModuleForest, ModuleNode};
use crate::config::ConfigError;
use crate::core::ident;
use crate::debug;

const PACKAGE_MARKER: &str = "__init__.py";
const SKIPPED_FILES: &[&str] = &["__main__.py", PACKAGE_MARKER];
const SKIPPED_DIRS: &[&str] = &["__pycache__"];

/// Scan every root in order.
pub fn scan_roots(roots: &[PathBuf], exclude: &ExcludeMatcher) -> Result<ModuleForest, ConfigError> {
    let mut forest = ModuleForest::default();
    for root in roots {
        forest.roots.extend(scan_root(root, exclude)?);
    }
    Ok(forest)
}

/// Scan one root. A root that is itself a package yields one node; a plain
/// directory yields the packages found inside it.
pub fn scan_root(root: &Path, exclude: &ExcludeMatcher) -> Result<Vec<ModuleNode>, ConfigError> {
    let meta = fs::metadata(root).map_err(|e| ConfigError::PackageRoot(root.to_path_buf(), e))?;
    if !meta.is_dir() {
        return Err(ConfigError::PackageRoot(
            root.to_path_buf(),
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let mut scanner = Scanner {
        base: root.parent().map(Path::to_path_buf).unwrap_or_default(),
        exclude,
        ancestors: Vec::new(),
    };

    if root.join(PACKAGE_MARKER).is_file() {
        let segment = file_segment(root).unwrap_or_default();
        if !ident::is_segment(&segment) {
            debug!("scan"; "skipping non-importable package root {}", root.display());
            return Ok(Vec::new());
        }
        Ok(scanner.package(root, segment)?.into_iter().collect())
    } else {
        scanner.enter(root)?;
        let nodes = scanner.nested_packages(root, "")?;
        scanner.ancestors.pop();
        Ok(nodes)
    }
}

struct Scanner<'a> {
    /// Directory exclusion paths are made relative to.
    base: PathBuf,
    exclude: &'a ExcludeMatcher,
    /// Canonical paths of the directories being walked.
    ancestors: Vec<PathBuf>,
}

impl Scanner<'_> {
    fn excluded(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.base).unwrap_or(path);
        self.exclude.is_match(rel)
    }

    fn enter(&mut self, dir: &Path) -> Result<(), ConfigError> {
        let canonical = dir
            .canonicalize()
            .map_err(|e| ConfigError::PackageRoot(dir.to_path_buf(), e))?;
        if self.ancestors.contains(&canonical) {
            return Err(ConfigError::SymlinkCycle(dir.to_path_buf()));
        }
        self.ancestors.push(canonical);
        Ok(())
    }

    fn read_sorted(dir: &Path) -> Result<Vec<(String, PathBuf)>, ConfigError> {
        let entries = fs::read_dir(dir).map_err(|e| ConfigError::PackageRoot(dir.to_path_buf(), e))?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::PackageRoot(dir.to_path_buf(), e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                continue;
            }
            out.push((name, entry.path()));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    /// Build the node of a package directory, `None` when excluded.
    fn package(&mut self, dir: &Path, dotted: String) -> Result<Option<ModuleNode>, ConfigError> {
        let init = dir.join(PACKAGE_MARKER);
        if self.excluded(dir) || self.excluded(&init) {
            debug!("scan"; "excluded package {}", dotted);
            return Ok(None);
        }

        self.enter(dir)?;
        let mut children = Vec::new();
        for (name, path) in Self::read_sorted(dir)? {
            if path.is_dir() {
                if !ident::is_segment(&name) {
                    continue;
                }
                let child = ident::join(&dotted, &name);
                if path.join(PACKAGE_MARKER).is_file() {
                    children.extend(self.package(&path, child)?);
                } else if !self.excluded(&path) {
                    self.enter(&path)?;
                    children.extend(self.nested_packages(&path, &child)?);
                    self.ancestors.pop();
                }
            } else if let Some(stem) = name.strip_suffix(".py") {
                if SKIPPED_FILES.contains(&name.as_str()) || !ident::is_segment(stem) {
                    continue;
                }
                if self.excluded(&path) {
                    debug!("scan"; "excluded module {}", path.display());
                    continue;
                }
                children.push(ModuleNode {
                    dotted: ident::join(&dotted, stem),
                    path,
                    is_package: false,
                    children: Vec::new(),
                });
            }
        }
        self.ancestors.pop();

        children.sort_by(|a, b| a.segment().cmp(b.segment()));
        Ok(Some(ModuleNode {
            dotted,
            path: init,
            is_package: true,
            children,
        }))
    }

    /// Packages below a non-package directory. Loose modules are not importable
    /// and are skipped.
    fn nested_packages(&mut self, dir: &Path, prefix: &str) -> Result<Vec<ModuleNode>, ConfigError> {
        let mut found = Vec::new();
        for (name, path) in Self::read_sorted(dir)? {
            if !path.is_dir() || !ident::is_segment(&name) {
                continue;
            }
            let dotted = ident::join(prefix, &name);
            if path.join(PACKAGE_MARKER).is_file() {
                found.extend(self.package(&path, dotted)?);
            } else if !self.excluded(&path) {
                self.enter(&path)?;
                found.extend(self.nested_packages(&path, &dotted)?);
                self.ancestors.pop();
            }
        }
        Ok(found)
    }
}

fn file_segment(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
