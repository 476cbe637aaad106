//! `[site]` configuration: docs layout and the host navigation tree.
//!
//! # Example
//!
//! ```toml
//! [site]
//! docs_dir = "docs"
//! output = "build/docs"
//! nav = [
//!   { title = "Home", page = "index.md" },
//!   { title = "Guide", children = [{ title = "Intro", page = "guide/intro.md" }] },
//!   { title = "Reference", page = "reference" },
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Authored Markdown pages.
    pub docs_dir: PathBuf,

    /// Where the finalized page set is emitted.
    pub output: PathBuf,

    /// Serve `a/b` at `/a/b/` instead of `/a/b.html`.
    pub directory_urls: bool,

    /// Host navigation tree.
    pub nav: Vec<NavItem>,
}

impl SiteSectionConfig {
    pub const NAV: FieldPath = FieldPath::new("site.nav");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for item in &self.nav {
            item.validate(diag);
        }
    }
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            docs_dir: "docs".into(),
            output: "build/docs".into(),
            directory_urls: true,
            nav: Vec::new(),
        }
    }
}

/// One entry of the host navigation tree, as written in the config file.
///
/// Exactly one of `page` (leaf) or `children` (section) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    /// Leaf item pointing at a page route.
    pub fn page(title: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page: Some(page.into()),
            children: Vec::new(),
        }
    }

    /// Section item with children.
    pub fn section(title: impl Into<String>, children: Vec<NavItem>) -> Self {
        Self {
            title: title.into(),
            page: None,
            children,
        }
    }

    fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.title.trim().is_empty() {
            diag.error(SiteSectionConfig::NAV, "nav entry with an empty title");
        }
        match (&self.page, self.children.is_empty()) {
            (Some(_), false) => diag.error_with_hint(
                SiteSectionConfig::NAV,
                format!("nav entry `{}` has both `page` and `children`", self.title),
                "use a section with an index page as its first child",
            ),
            (None, true) => diag.error(
                SiteSectionConfig::NAV,
                format!("nav entry `{}` has neither `page` nor `children`", self.title),
            ),
            _ => {}
        }
        for child in &self.children {
            child.validate(diag);
        }
    }
}
