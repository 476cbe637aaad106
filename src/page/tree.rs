//! Page tree construction.
//!
//! Turns the module forest into generated pages, merges them with authored
//! pages, and builds the final navigation tree.

use rustc_hash::FxHashMap;

use super::nav::{self, NavNode};
use super::{PageSet, StaticFile, VirtualPage};
use crate::config::{ConfigError, SiteConfig};
use crate::core::Route;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::package::ModuleForest;

/// Output of the page-tree phase.
#[derive(Debug, Clone)]
pub struct PageTree {
    pub pages: PageSet,
    pub nav: Vec<NavNode>,
    /// Nav entries pointing at pages that do not exist.
    pub diagnostics: Diagnostics,
}

pub struct PageTreeBuilder<'a> {
    config: &'a SiteConfig,
    placeholder: Route,
}

impl<'a> PageTreeBuilder<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            config,
            placeholder: Route::new(&config.reference.placeholder),
        }
    }

    /// One page per module, routed under the placeholder.
    pub fn generate(&self, forest: &ModuleForest) -> Vec<VirtualPage> {
        forest
            .iter()
            .map(|node| {
                VirtualPage::generated(
                    node.route(&self.placeholder),
                    &node.dotted,
                    self.config.reference.render_template(&node.dotted),
                )
            })
            .collect()
    }

    /// Build the final page set and navigation tree.
    pub fn build(
        &self,
        forest: &ModuleForest,
        authored: Vec<VirtualPage>,
        files: Vec<StaticFile>,
    ) -> Result<PageTree, ConfigError> {
        let directory_urls = self.config.site.directory_urls;

        let mut host = NavNode::from_config(&self.config.site.nav, directory_urls);
        if self.config.reference.overview_sections {
            nav::retitle_overviews(&mut host);
        }
        let reference_title = nav::placeholder_title(&host, &self.placeholder);
        let generated_nav = nav::reference_nav(forest, &self.placeholder, directory_urls);
        let nav = nav::splice(&host, &self.placeholder, generated_nav)?;

        let sections: FxHashMap<Route, String> = nav::leaf_sections(&host).into_iter().collect();

        let mut pages = self.generate(forest);
        for page in &mut pages {
            page.section = reference_title.clone();
        }
        pages.extend(authored.into_iter().map(|mut page| {
            page.section = sections.get(&page.route).cloned();
            page
        }));

        check_conflicts(&pages, &files)?;
        let pages = processing_order(pages, &nav::leaf_routes(&nav));
        let pages = PageSet::new(pages, files);

        let diagnostics = nav::leaf_routes(&nav)
            .into_iter()
            .filter(|route| !pages.contains(route))
            .map(|route| {
                Diagnostic::new(
                    DiagnosticKind::BrokenLink,
                    &Route::new(""),
                    route.as_str(),
                    "nav entry points to a missing page",
                )
            })
            .collect();

        Ok(PageTree {
            pages,
            nav,
            diagnostics,
        })
    }
}

/// Every route must belong to exactly one page or copied file.
fn check_conflicts(pages: &[VirtualPage], files: &[StaticFile]) -> Result<(), ConfigError> {
    let mut claimed: FxHashMap<Route, String> = FxHashMap::default();
    let claims = pages
        .iter()
        .map(|p| (p.route.clone(), p.describe()))
        .chain(files.iter().filter_map(|f| {
            f.route()
                .map(|r| (r, format!("copied file `{}`", f.source.display())))
        }));

    for (route, owner) in claims {
        if let Some(first) = claimed.get(&route) {
            return Err(ConfigError::RouteConflict {
                route: route.to_string(),
                first: first.clone(),
                second: owner,
            });
        }
        claimed.insert(route, owner);
    }
    Ok(())
}

/// Nav leaf order first, then the remaining pages by route.
fn processing_order(pages: Vec<VirtualPage>, nav_routes: &[Route]) -> Vec<VirtualPage> {
    let rank: FxHashMap<&Route, usize> = nav_routes
        .iter()
        .enumerate()
        .rev()
        .map(|(i, r)| (r, i))
        .collect();

    let mut pages = pages;
    pages.sort_by(|a, b| {
        let ra = rank.get(&a.route).copied().unwrap_or(usize::MAX);
        let rb = rank.get(&b.route).copied().unwrap_or(usize::MAX);
        ra.cmp(&rb).then_with(|| a.route.cmp(&b.route))
    });
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::package::ModuleNode;
    use std::path::{Path, PathBuf};

    const CONFIG: &str = r#"
        [site]
        nav = [
          { title = "Home", page = "index.md" },
          { title = "Guide", children = [{ title = "Intro", page = "guide/intro.md" }] },
          { title = "Reference", page = "reference" },
          { title = "Gone", page = "gone.md" },
        ]
    "#;

    fn forest() -> ModuleForest {
        ModuleForest {
            roots: vec![ModuleNode {
                dotted: "pkg".into(),
                path: PathBuf::from("pkg/__init__.py"),
                is_package: true,
                children: vec![ModuleNode {
                    dotted: "pkg.math".into(),
                    path: PathBuf::from("pkg/math.py"),
                    is_package: false,
                    children: vec![],
                }],
            }],
        }
    }

    fn authored(route: &str) -> VirtualPage {
        VirtualPage::authored(
            Route::new(route),
            route.into(),
            String::new(),
            PathBuf::from(format!("docs/{route}.md")),
        )
    }

    #[test]
    fn test_generated_pages() {
        let config = test_parse_config("", Path::new("/project"));
        let pages = PageTreeBuilder::new(&config).generate(&forest());
        let routes: Vec<_> = pages.iter().map(|p| p.route.as_str()).collect();
        assert_eq!(routes, vec!["reference/pkg/index", "reference/pkg/math"]);
        assert!(pages[1].content.contains("::: pkg.math"));
    }

    #[test]
    fn test_build_tree() {
        let config = test_parse_config(CONFIG, Path::new("/project"));
        let tree = PageTreeBuilder::new(&config)
            .build(
                &forest(),
                vec![authored("orphan"), authored("guide/intro"), authored("index")],
                vec![],
            )
            .unwrap();

        let order: Vec<_> = tree.pages.pages().iter().map(|p| p.route.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "index",
                "guide/intro",
                "reference/pkg/index",
                "reference/pkg/math",
                "orphan"
            ]
        );

        let intro = tree.pages.get(&Route::new("guide/intro")).unwrap();
        assert_eq!(intro.section.as_deref(), Some("Guide"));
        assert_eq!(tree.pages.get(&Route::new("index")).unwrap().section, None);
        assert_eq!(
            tree.pages.get(&Route::new("reference/pkg/math")).unwrap().section.as_deref(),
            Some("Reference")
        );

        assert_eq!(tree.diagnostics.len(), 1);
        assert_eq!(tree.diagnostics.iter().next().unwrap().subject, "gone");
    }

    #[test]
    fn test_route_conflict() {
        let config = test_parse_config(CONFIG, Path::new("/project"));
        let err = PageTreeBuilder::new(&config)
            .build(&forest(), vec![authored("reference/pkg/math")], vec![])
            .unwrap_err();
        assert!(matches!(err, ConfigError::RouteConflict { .. }));
    }

    #[test]
    fn test_missing_placeholder() {
        let config = test_parse_config("", Path::new("/project"));
        let err = PageTreeBuilder::new(&config)
            .build(&forest(), vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { count: 0, .. }));
    }
}
