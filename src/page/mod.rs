//! Page set and navigation tree.
//!
//! # Module Structure
//!
//! ```text
//! page/
//! ├── markdown.rs  # pulldown-cmark options, frontmatter, titles
//! ├── authored.rs  # load authored pages and copied files
//! ├── nav.rs       # NavNode, host nav conversion, placeholder splice
//! └── tree.rs      # PageTreeBuilder: generated pages + final nav
//! ```

mod authored;
pub mod markdown;
mod nav;
mod tree;

pub use authored::{load_authored, load_static_files};
pub use nav::NavNode;
pub use tree::PageTreeBuilder;

use rustc_hash::FxHashMap;
use std::path::PathBuf;

use crate::core::{Route, Scope, UrlPath};

/// Where a page's content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOrigin {
    /// Generated 1:1 from a scanned module.
    Generated { module: String },
    /// Read from the docs directory.
    Authored { source: PathBuf },
}

/// A generated or authored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPage {
    pub route: Route,
    pub title: String,
    pub content: String,
    pub origin: PageOrigin,
    /// Title of the top-level nav section holding the page, if any.
    pub section: Option<String>,
}

impl VirtualPage {
    pub fn generated(route: Route, module: &str, content: String) -> Self {
        Self {
            route,
            title: module.to_string(),
            content,
            origin: PageOrigin::Generated {
                module: module.to_string(),
            },
            section: None,
        }
    }

    pub fn authored(route: Route, title: String, content: String, source: PathBuf) -> Self {
        Self {
            route,
            title,
            content,
            origin: PageOrigin::Authored { source },
            section: None,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.origin, PageOrigin::Generated { .. })
    }

    /// Scope of every anchor on this page.
    pub fn scope(&self) -> Scope {
        if self.is_generated() {
            Scope::Reference
        } else {
            Scope::for_section(self.section.as_deref())
        }
    }

    pub fn url(&self, directory_urls: bool) -> UrlPath {
        self.route.url(directory_urls)
    }

    /// Human-readable origin for error messages.
    pub fn describe(&self) -> String {
        match &self.origin {
            PageOrigin::Generated { module } => format!("module `{module}`"),
            PageOrigin::Authored { source } => format!("`{}`", source.display()),
        }
    }
}

/// A file copied verbatim into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    /// Output-relative destination (`changelog.md`, `img/logo.svg`).
    pub dest: String,
    pub source: PathBuf,
    pub bytes: Vec<u8>,
}

impl StaticFile {
    /// Route under which a copied Markdown file can be linked to.
    pub fn route(&self) -> Option<Route> {
        self.dest.ends_with(".md").then(|| Route::new(&self.dest))
    }
}

/// All pages of a build in processing order, plus copied files.
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    pages: Vec<VirtualPage>,
    by_route: FxHashMap<Route, usize>,
    pub files: Vec<StaticFile>,
}

impl PageSet {
    /// Pages must already be in processing order with unique routes.
    pub fn new(pages: Vec<VirtualPage>, files: Vec<StaticFile>) -> Self {
        let by_route = pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.route.clone(), i))
            .collect();
        Self {
            pages,
            by_route,
            files,
        }
    }

    pub fn pages(&self) -> &[VirtualPage] {
        &self.pages
    }

    pub fn get(&self, route: &Route) -> Option<&VirtualPage> {
        self.by_route.get(route).map(|&i| &self.pages[i])
    }

    /// Whether a link to `route` lands on something in the output.
    pub fn contains(&self, route: &Route) -> bool {
        self.by_route.contains_key(route) || self.files.iter().any(|f| f.route().as_ref() == Some(route))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn generated_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_generated()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_scope() {
        let generated = VirtualPage::generated(Route::new("reference/pkg/math"), "pkg.math", String::new());
        assert_eq!(generated.scope(), Scope::Reference);

        let mut authored = VirtualPage::authored(
            Route::new("guide/intro"),
            "Intro".into(),
            String::new(),
            PathBuf::from("docs/guide/intro.md"),
        );
        assert_eq!(authored.scope(), Scope::Any);
        authored.section = Some("User Guide".into());
        assert_eq!(authored.scope(), Scope::Section("user-guide".into()));
        authored.section = Some("Reference".into());
        assert_eq!(authored.scope(), Scope::Section("reference".into()));
    }

    #[test]
    fn test_page_set_lookup() {
        let pages = vec![VirtualPage::generated(Route::new("reference/pkg/index"), "pkg", String::new())];
        let files = vec![StaticFile {
            dest: "changelog.md".into(),
            source: PathBuf::from("CHANGELOG.md"),
            bytes: Vec::new(),
        }];
        let set = PageSet::new(pages, files);
        assert!(set.get(&Route::new("reference/pkg/index")).is_some());
        assert!(set.contains(&Route::new("changelog")));
        assert!(!set.contains(&Route::new("missing")));
        assert_eq!(set.generated_count(), 1);
    }
}
