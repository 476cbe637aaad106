//! Python package discovery and static introspection.
//!
//! # Module Structure
//!
//! ```text
//! package/
//! ├── exclude.rs   # exclusion glob (path-suffix semantics)
//! ├── scan.rs      # directory walk -> ModuleForest
//! ├── python.rs    # tree-sitter declaration and import walk
//! └── symbols.rs   # SymbolTable: dotted path -> declaration
//! ```

mod exclude;
pub mod python;
mod scan;
mod symbols;

pub use exclude::ExcludeMatcher;
pub use scan::scan_roots;
pub use symbols::{ModuleInfo, Symbol, SymbolTable};

use std::path::PathBuf;

use crate::core::{Route, ident};

/// A package or module found under a scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Dotted import path, unique across the forest.
    pub dotted: String,
    /// The module file (`__init__.py` for packages).
    pub path: PathBuf,
    pub is_package: bool,
    /// Submodules and subpackages, sorted by segment.
    pub children: Vec<ModuleNode>,
}

impl ModuleNode {
    /// Last segment of the dotted path.
    pub fn segment(&self) -> &str {
        self.dotted.rsplit('.').next().unwrap_or(&self.dotted)
    }

    /// Route of the generated page under `prefix`.
    ///
    /// ```text
    /// pkg.math (module)  -> reference/pkg/math
    /// pkg.io   (package) -> reference/pkg/io/index
    /// ```
    pub fn route(&self, prefix: &Route) -> Route {
        let route = self
            .dotted
            .split('.')
            .fold(prefix.clone(), |route, segment| route.join(segment));
        if self.is_package {
            route.join("index")
        } else {
            route
        }
    }
}

/// The ordered module trees of all package roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleForest {
    pub roots: Vec<ModuleNode>,
}

impl ModuleForest {
    /// Depth-first, pre-order traversal.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleNode> {
        let mut stack: Vec<&ModuleNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root segments of the scanned packages, in scan order.
    pub fn top_level(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for node in &self.roots {
            let root = ident::root_segment(&node.dotted);
            if !names.contains(&root) {
                names.push(root);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(dotted: &str) -> ModuleNode {
        ModuleNode {
            dotted: dotted.into(),
            path: PathBuf::from(format!("{}.py", dotted.replace('.', "/"))),
            is_package: false,
            children: Vec::new(),
        }
    }

    fn package(dotted: &str, children: Vec<ModuleNode>) -> ModuleNode {
        ModuleNode {
            dotted: dotted.into(),
            path: PathBuf::from(format!("{}/__init__.py", dotted.replace('.', "/"))),
            is_package: true,
            children,
        }
    }

    #[test]
    fn test_routes() {
        let prefix = Route::new("reference");
        assert_eq!(module("pkg.math").route(&prefix), "reference/pkg/math");
        assert_eq!(package("pkg", vec![]).route(&prefix), "reference/pkg/index");
        assert_eq!(module("pkg.math").segment(), "math");
    }

    #[test]
    fn test_preorder() {
        let forest = ModuleForest {
            roots: vec![
                package("pkg", vec![package("pkg.io", vec![module("pkg.io.files")]), module("pkg.math")]),
                package("other", vec![]),
            ],
        };
        let order: Vec<_> = forest.iter().map(|n| n.dotted.as_str()).collect();
        assert_eq!(order, vec!["pkg", "pkg.io", "pkg.io.files", "pkg.math", "other"]);
        assert_eq!(forest.len(), 5);
        assert_eq!(forest.top_level(), vec!["pkg", "other"]);
        assert!(forest.iter().any(|n| n.dotted == "pkg.io.files"));
    }
}
