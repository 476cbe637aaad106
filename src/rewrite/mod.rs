//! Per-page link rewriting.
//!
//! # Module Structure
//!
//! ```text
//! rewrite/
//! ├── relative.rs  # relative_url: site-root URL -> page-relative URL
//! ├── links.rs     # LinkTransform: authored links, HTML attrs, identifier refs
//! ├── code.rs      # CodeTransform: clickable code blocks
//! └── source.rs    # SourceTransform: [source] heading links
//! ```
//!
//! Each transform reads the original page text and returns byte-range
//! [`Edit`]s; the edits are applied together, back to front. Pages never
//! observe each other's rewritten content, so pages render in parallel.

mod code;
mod links;
mod relative;
mod source;

pub use code::CodeTransform;
pub use links::LinkTransform;
pub use relative::relative_url;
pub use source::SourceTransform;

use regex::Regex;
use rustc_hash::FxHashSet;
use std::ops::Range;

use crate::config::SiteConfig;
use crate::core::{Route, ident};
use crate::diagnostics::Diagnostics;
use crate::package::ModuleForest;
use crate::page::{PageSet, VirtualPage};
use crate::resolve::ReferenceResolver;
use crate::source::SourceLocator;
use crate::xref::IdentifierIndex;

/// Replace `range` of the original text with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

impl Edit {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at..at, text)
    }
}

/// Apply edits to `content`. An edit overlapping an earlier one is dropped.
pub fn apply_edits(content: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.range.start, e.range.end));

    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if kept.last().is_some_and(|prev| edit.range.start < prev.range.end) {
            continue;
        }
        kept.push(edit);
    }

    let mut out = content.to_string();
    for edit in kept.into_iter().rev() {
        out.replace_range(edit.range, &edit.text);
    }
    out
}

/// Shared, read-only state of the render phase.
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub pages: &'a PageSet,
    pub resolver: ReferenceResolver<'a>,
    /// Present when `[source]` links are enabled.
    pub locator: Option<&'a SourceLocator<'a>>,
    packages: FxHashSet<String>,
    pattern: Option<Regex>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        config: &'a SiteConfig,
        pages: &'a PageSet,
        index: &'a IdentifierIndex,
        forest: &ModuleForest,
        locator: Option<&'a SourceLocator<'a>>,
    ) -> Self {
        Self {
            config,
            pages,
            resolver: ReferenceResolver::new(index, config.links.priority()),
            locator,
            packages: forest.top_level().into_iter().map(str::to_string).collect(),
            pattern: config.links.pattern_regex(),
        }
    }

    pub fn directory_urls(&self) -> bool {
        self.config.site.directory_urls
    }

    pub fn matches_pattern(&self, identifier: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(identifier))
    }

    /// Code mentions are only linked inside the scanned packages.
    pub fn eligible(&self, identifier: &str) -> bool {
        self.packages.contains(ident::root_segment(identifier)) && self.matches_pattern(identifier)
    }
}

/// A page after rewriting.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub route: Route,
    pub content: String,
    pub diagnostics: Diagnostics,
}

pub fn render_page(ctx: &RenderContext<'_>, page: &VirtualPage) -> RenderedPage {
    let mut diagnostics = Diagnostics::new();

    let mut edits = LinkTransform::new(ctx, page).edits(&mut diagnostics);
    edits.extend(CodeTransform::new(ctx, page).edits(&mut diagnostics));
    if let Some(locator) = ctx.locator {
        edits.extend(SourceTransform::new(ctx, page, locator).edits(&mut diagnostics));
    }

    RenderedPage {
        route: page.route.clone(),
        content: apply_edits(&page.content, edits),
        diagnostics,
    }
}
