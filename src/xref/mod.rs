//! Cross-reference index.
//!
//! # Module Structure
//!
//! ```text
//! xref/
//! ├── extract.rs  # heading ids, directive anchors (pure text pass)
//! └── mod.rs      # Anchor, IdentifierIndex, build_index
//! ```
//!
//! Extraction runs per page in parallel; insertion is sequential in page
//! processing order, so candidate order never depends on thread scheduling.

pub mod extract;

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::{Route, Scope, UrlPath, ident};
use crate::package::SymbolTable;
use crate::page::PageSet;

/// An addressable location inside a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub route: Route,
    pub url: UrlPath,
    pub id: String,
    pub scope: Scope,
}

impl Anchor {
    /// The dotted identifier this anchor stands for, if its id is identifier-shaped.
    pub fn identifier(&self) -> Option<&str> {
        ident::is_dotted(&self.id).then_some(self.id.as_str())
    }
}

/// Identifier -> candidate anchors, in page processing order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct IdentifierIndex {
    entries: BTreeMap<String, Vec<Anchor>>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an anchor. Anchors without an identifier are ignored.
    pub fn insert(&mut self, anchor: Anchor) {
        if let Some(identifier) = anchor.identifier() {
            self.entries
                .entry(identifier.to_string())
                .or_default()
                .push(anchor);
        }
    }

    pub fn candidates(&self, identifier: &str) -> &[Anchor] {
        self.entries.get(identifier).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of anchors across all identifiers.
    pub fn anchor_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Anchor])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Index every page's anchors.
pub fn build_index(pages: &PageSet, symbols: &SymbolTable, directory_urls: bool) -> IdentifierIndex {
    let per_page: Vec<Vec<Anchor>> = pages
        .pages()
        .par_iter()
        .map(|page| {
            let url = page.url(directory_urls);
            let scope = page.scope();
            extract::anchor_ids(&page.content, symbols)
                .into_iter()
                .map(|id| Anchor {
                    route: page.route.clone(),
                    url: url.clone(),
                    id,
                    scope: scope.clone(),
                })
                .collect()
        })
        .collect();

    let mut index = IdentifierIndex::new();
    for anchor in per_page.into_iter().flatten() {
        index.insert(anchor);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;
    use std::path::PathBuf;

    fn authored(route: &str, section: Option<&str>, content: &str) -> VirtualPage {
        let mut page = VirtualPage::authored(
            Route::new(route),
            route.into(),
            content.into(),
            PathBuf::from(format!("docs/{route}.md")),
        );
        page.section = section.map(str::to_string);
        page
    }

    #[test]
    fn test_identifier_shape() {
        let anchor = |id: &str| Anchor {
            route: Route::new("index"),
            url: UrlPath::root(),
            id: id.into(),
            scope: Scope::Any,
        };
        assert_eq!(anchor("pkg.math.add").identifier(), Some("pkg.math.add"));
        assert_eq!(anchor("getting-started").identifier(), None);

        let mut index = IdentifierIndex::new();
        index.insert(anchor("getting-started"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_build_index_in_page_order() {
        let pages = PageSet::new(
            vec![
                authored("guide/avg", Some("Guide"), "## Override {#pkg.math.MovingAverage}\n"),
                VirtualPage::generated(
                    Route::new("reference/pkg/math"),
                    "pkg.math",
                    "## `MovingAverage` {#pkg.math.MovingAverage}\n".into(),
                ),
            ],
            vec![],
        );
        let index = build_index(&pages, &SymbolTable::default(), true);

        let candidates = index.candidates("pkg.math.MovingAverage");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].route, "guide/avg");
        assert_eq!(candidates[0].scope, Scope::Section("guide".into()));
        assert_eq!(candidates[0].url, "/guide/avg/");
        assert_eq!(candidates[1].scope, Scope::Reference);
        assert!(index.candidates("pkg.math.add").is_empty());
    }

    #[test]
    fn test_duplicate_ids_on_one_page() {
        let pages = PageSet::new(
            vec![authored("a", None, "# X {#pkg.x}\n\n::: pkg.x\n")],
            vec![],
        );
        let index = build_index(&pages, &SymbolTable::default(), true);
        assert_eq!(index.candidates("pkg.x").len(), 1);
    }
}
