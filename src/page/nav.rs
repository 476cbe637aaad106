//! Navigation tree.
//!
//! The host tree comes from `[site] nav`; the builder returns a new tree with
//! the placeholder leaf swapped for the generated reference section. Every
//! other entry keeps its position.

use serde::Serialize;

use crate::config::{ConfigError, NavItem};
use crate::core::{LinkKind, Route, UrlPath};
use crate::package::{ModuleForest, ModuleNode};

pub const OVERVIEW_TITLE: &str = "Overview";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavNode {
    Section {
        title: String,
        children: Vec<NavNode>,
    },
    Leaf {
        title: String,
        route: Route,
        url: UrlPath,
    },
    /// External URL, passed through untouched.
    Link { title: String, url: String },
}

impl NavNode {
    pub fn leaf(title: impl Into<String>, route: Route, directory_urls: bool) -> Self {
        let url = route.url(directory_urls);
        Self::Leaf {
            title: title.into(),
            route,
            url,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Section { title, .. } | Self::Leaf { title, .. } | Self::Link { title, .. } => title,
        }
    }

    /// Convert the configured host tree.
    pub fn from_config(items: &[NavItem], directory_urls: bool) -> Vec<NavNode> {
        items
            .iter()
            .map(|item| match &item.page {
                Some(page) if matches!(LinkKind::parse(page), LinkKind::External(_)) => Self::Link {
                    title: item.title.clone(),
                    url: page.clone(),
                },
                Some(page) => Self::leaf(&item.title, Route::new(page), directory_urls),
                None => Self::Section {
                    title: item.title.clone(),
                    children: Self::from_config(&item.children, directory_urls),
                },
            })
            .collect()
    }
}

/// Mirror the module forest: packages with children become sections led by
/// an "Overview" leaf to their own index page, modules become leaves.
pub fn reference_nav(forest: &ModuleForest, prefix: &Route, directory_urls: bool) -> Vec<NavNode> {
    forest
        .roots
        .iter()
        .map(|node| module_nav(node, prefix, directory_urls))
        .collect()
}

fn module_nav(node: &ModuleNode, prefix: &Route, directory_urls: bool) -> NavNode {
    let route = node.route(prefix);
    if node.children.is_empty() {
        return NavNode::leaf(node.segment(), route, directory_urls);
    }

    let mut children = Vec::with_capacity(node.children.len() + 1);
    children.push(NavNode::leaf(OVERVIEW_TITLE, route, directory_urls));
    children.extend(
        node.children
            .iter()
            .map(|child| module_nav(child, prefix, directory_urls)),
    );
    NavNode::Section {
        title: node.segment().to_string(),
        children,
    }
}

/// Count leaves (at any depth) pointing at `route`.
fn count_leaves(nodes: &[NavNode], route: &Route) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            NavNode::Leaf { route: r, .. } => usize::from(r == route),
            NavNode::Section { children, .. } => count_leaves(children, route),
            NavNode::Link { .. } => 0,
        })
        .sum()
}

/// Title of the placeholder leaf, if present.
pub fn placeholder_title(nodes: &[NavNode], placeholder: &Route) -> Option<String> {
    nodes.iter().find_map(|node| match node {
        NavNode::Leaf { title, route, .. } if route == placeholder => Some(title.clone()),
        NavNode::Section { children, .. } => placeholder_title(children, placeholder),
        _ => None,
    })
}

/// Return a new tree with the placeholder leaf replaced by a section holding
/// `generated`. The placeholder must occur exactly once.
pub fn splice(
    host: &[NavNode],
    placeholder: &Route,
    generated: Vec<NavNode>,
) -> Result<Vec<NavNode>, ConfigError> {
    let count = count_leaves(host, placeholder);
    if count != 1 {
        return Err(ConfigError::Placeholder {
            route: placeholder.to_string(),
            count,
        });
    }
    let mut generated = Some(generated);
    Ok(replace(host, placeholder, &mut generated))
}

fn replace(nodes: &[NavNode], placeholder: &Route, generated: &mut Option<Vec<NavNode>>) -> Vec<NavNode> {
    nodes
        .iter()
        .map(|node| match node {
            NavNode::Leaf { title, route, .. } if route == placeholder => NavNode::Section {
                title: title.clone(),
                children: generated.take().unwrap_or_default(),
            },
            NavNode::Section { title, children } => NavNode::Section {
                title: title.clone(),
                children: replace(children, placeholder, generated),
            },
            other => other.clone(),
        })
        .collect()
}

/// Retitle the leading index leaf of each section as "Overview".
pub fn retitle_overviews(nodes: &mut [NavNode]) {
    for node in nodes {
        if let NavNode::Section { children, .. } = node {
            if let Some(NavNode::Leaf { title, route, .. }) = children.first_mut()
                && route.is_index()
            {
                *title = OVERVIEW_TITLE.to_string();
            }
            retitle_overviews(children);
        }
    }
}

/// Leaf routes in depth-first order.
pub fn leaf_routes(nodes: &[NavNode]) -> Vec<Route> {
    let mut out = Vec::new();
    collect_leaves(nodes, &mut out);
    out
}

fn collect_leaves(nodes: &[NavNode], out: &mut Vec<Route>) {
    for node in nodes {
        match node {
            NavNode::Leaf { route, .. } => out.push(route.clone()),
            NavNode::Section { children, .. } => collect_leaves(children, out),
            NavNode::Link { .. } => {}
        }
    }
}

/// `(route, top-level section title)` for every leaf inside a top-level section.
pub fn leaf_sections(nodes: &[NavNode]) -> Vec<(Route, String)> {
    let mut out = Vec::new();
    for node in nodes {
        if let NavNode::Section { title, children } = node {
            out.extend(leaf_routes(children).into_iter().map(|r| (r, title.clone())));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn host() -> Vec<NavNode> {
        NavNode::from_config(
            &[
                NavItem::page("Home", "index.md"),
                NavItem::section(
                    "Guide",
                    vec![
                        NavItem::page("Guide", "guide/index.md"),
                        NavItem::page("Intro", "guide/intro.md"),
                    ],
                ),
                NavItem::page("Reference", "reference"),
                NavItem::page("GitHub", "https://github.com/org/repo"),
            ],
            true,
        )
    }

    fn node(dotted: &str, is_package: bool, children: Vec<ModuleNode>) -> ModuleNode {
        ModuleNode {
            dotted: dotted.into(),
            path: PathBuf::new(),
            is_package,
            children,
        }
    }

    #[test]
    fn test_from_config() {
        let nav = host();
        assert_eq!(nav.len(), 4);
        assert!(matches!(&nav[3], NavNode::Link { url, .. } if url == "https://github.com/org/repo"));
        let NavNode::Leaf { route, url, .. } = &nav[0] else {
            panic!("expected leaf");
        };
        assert_eq!(route, "index");
        assert_eq!(url, "/");
    }

    #[test]
    fn test_splice_keeps_siblings() {
        let generated = vec![NavNode::leaf("pkg", Route::new("reference/pkg/index"), true)];
        let spliced = splice(&host(), &Route::new("reference"), generated).unwrap();
        let titles: Vec<_> = spliced.iter().map(NavNode::title).collect();
        assert_eq!(titles, vec!["Home", "Guide", "Reference", "GitHub"]);
        let NavNode::Section { children, .. } = &spliced[2] else {
            panic!("expected section");
        };
        assert_eq!(children.len(), 1);
        assert_eq!(placeholder_title(&host(), &Route::new("reference")).as_deref(), Some("Reference"));
    }

    #[test]
    fn test_splice_nested_placeholder() {
        let host = NavNode::from_config(
            &[NavItem::section("API", vec![NavItem::page("Modules", "/reference/")])],
            true,
        );
        let spliced = splice(&host, &Route::new("reference"), vec![]).unwrap();
        let NavNode::Section { children, .. } = &spliced[0] else {
            panic!("expected section");
        };
        assert!(matches!(&children[0], NavNode::Section { title, .. } if title == "Modules"));
    }

    #[test]
    fn test_splice_requires_exactly_one() {
        let err = splice(&host(), &Route::new("api"), vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { count: 0, .. }));

        let mut twice = host();
        twice.push(NavNode::leaf("Again", Route::new("reference"), true));
        let err = splice(&twice, &Route::new("reference"), vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder { count: 2, .. }));
    }

    #[test]
    fn test_reference_nav() {
        let forest = ModuleForest {
            roots: vec![node(
                "pkg",
                true,
                vec![node("pkg.empty", true, vec![]), node("pkg.math", false, vec![])],
            )],
        };
        let nav = reference_nav(&forest, &Route::new("reference"), true);
        let NavNode::Section { title, children } = &nav[0] else {
            panic!("expected section");
        };
        assert_eq!(title, "pkg");
        let titles: Vec<_> = children.iter().map(NavNode::title).collect();
        assert_eq!(titles, vec!["Overview", "empty", "math"]);
        assert!(
            matches!(&children[0], NavNode::Leaf { route, .. } if route == "reference/pkg/index")
        );
        assert!(
            matches!(&children[1], NavNode::Leaf { route, .. } if route == "reference/pkg/empty/index")
        );
    }

    #[test]
    fn test_retitle_and_order() {
        let mut nav = host();
        retitle_overviews(&mut nav);
        let NavNode::Section { children, .. } = &nav[1] else {
            panic!("expected section");
        };
        assert_eq!(children[0].title(), "Overview");
        assert_eq!(children[1].title(), "Intro");

        let routes: Vec<_> = leaf_routes(&nav).iter().map(|r| r.to_string()).collect();
        assert_eq!(routes, vec!["index", "guide/index", "guide/intro", "reference"]);

        let sections = leaf_sections(&nav);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].1, "Guide");
    }
}
