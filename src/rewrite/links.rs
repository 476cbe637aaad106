//! Authored link rewriting.
//!
//! | Form                          | Example                      | Result                 |
//! |-------------------------------|------------------------------|------------------------|
//! | inline link / image           | `[x](/guide/intro.md#a)`     | page-relative URL      |
//! | reference definition          | `[x]: /reference/pkg/`       | page-relative URL      |
//! | raw HTML `href` / `src`       | `<img src="/img/logo.svg">`  | page-relative URL      |
//! | identifier reference          | `` [`pkg.math.add`][] ``     | `[...](resolved URL)`  |
//!
//! External, fragment-only and already-relative targets are left untouched.

use pulldown_cmark::{BrokenLink, Event, Parser, Tag};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::ops::Range;
use std::sync::LazyLock;

use super::{Edit, RenderContext, relative_url};
use crate::core::{LinkKind, Route, UrlPath, ident, split_path_fragment};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::page::{VirtualPage, markdown};
use crate::xref::extract::code_block_ranges;

static RE_HTML_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:href|src)\s*=\s*(?:"(/[^"]*)"|'(/[^']*)')"#).unwrap()
});
static RE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]\n]+)\]\[([^\[\]\n]*)\]").unwrap());

pub struct LinkTransform<'a> {
    ctx: &'a RenderContext<'a>,
    page: &'a VirtualPage,
    from: UrlPath,
}

impl<'a> LinkTransform<'a> {
    pub fn new(ctx: &'a RenderContext<'a>, page: &'a VirtualPage) -> Self {
        Self {
            ctx,
            page,
            from: page.url(ctx.directory_urls()),
        }
    }

    pub fn edits(&self, diagnostics: &mut Diagnostics) -> Vec<Edit> {
        let content = self.page.content.as_str();
        let mut edits = Vec::new();
        let mut broken: FxHashSet<String> = FxHashSet::default();
        let mut inline_code: Vec<Range<usize>> = Vec::new();

        let callback = |link: BrokenLink| {
            broken.insert(link.reference.to_string());
            None
        };
        let mut parser =
            Parser::new_with_broken_link_callback(content, markdown::options(), Some(callback))
                .into_offset_iter();

        for (event, range) in parser.by_ref() {
            match event {
                Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) => {
                    let edit = self.rewrite_in(content, range, &dest_url, inline_dest, diagnostics);
                    edits.extend(edit);
                }
                Event::Html(_) | Event::InlineHtml(_) => {
                    edits.extend(self.html_edits(content, range, diagnostics));
                }
                Event::Code(_) => inline_code.push(range),
                _ => {}
            }
        }

        for (_, def) in parser.reference_definitions().iter() {
            let span = def.span.clone();
            edits.extend(self.rewrite_in(content, span, &def.dest, definition_dest, diagnostics));
        }
        drop(parser);

        let code_blocks = code_block_ranges(content);
        edits.extend(self.reference_edits(content, &broken, &inline_code, &code_blocks, diagnostics));
        edits
    }

    /// Rewrite the destination of the link or definition spanning `range`.
    fn rewrite_in(
        &self,
        content: &str,
        range: Range<usize>,
        dest: &str,
        locate: fn(&str, &str) -> Option<usize>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Edit> {
        let LinkKind::SiteRoot(path) = LinkKind::parse(dest) else {
            return None;
        };
        let offset = locate(&content[range.clone()], dest)?;
        let replacement = self.site_root(path, diagnostics)?;
        let start = range.start + offset;
        Some(Edit::new(start..start + dest.len(), replacement))
    }

    fn html_edits(&self, content: &str, range: Range<usize>, diagnostics: &mut Diagnostics) -> Vec<Edit> {
        let html = &content[range.clone()];
        RE_HTML_URL
            .captures_iter(html)
            .filter_map(|caps| {
                let value = caps.get(1).or_else(|| caps.get(2))?;
                if matches!(LinkKind::parse(value.as_str()), LinkKind::External(_)) {
                    return None;
                }
                let replacement = self.site_root(value.as_str(), diagnostics)?;
                let start = range.start + value.start();
                Some(Edit::new(start..range.start + value.end(), replacement))
            })
            .collect()
    }

    /// `[text][ident]` and `[ident][]` whose reference is undefined in the page.
    fn reference_edits(
        &self,
        content: &str,
        broken: &FxHashSet<String>,
        inline_code: &[Range<usize>],
        code_blocks: &[Range<usize>],
        diagnostics: &mut Diagnostics,
    ) -> Vec<Edit> {
        let inside = |pos: usize| inline_code.iter().chain(code_blocks).any(|r| r.contains(&pos));

        let mut edits = Vec::new();
        for caps in RE_REFERENCE.captures_iter(content) {
            let (Some(whole), Some(text), Some(label)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            if inside(whole.start()) {
                continue;
            }
            let reference = if label.as_str().is_empty() { text.as_str() } else { label.as_str() };
            if !broken.contains(reference) {
                continue;
            }
            let identifier = reference.trim().trim_matches('`');
            if !ident::is_dotted(identifier) {
                continue;
            }

            let anchor = self.ctx.resolver.resolve_reported(identifier, &self.page.route, diagnostics);
            if let Some(anchor) = anchor {
                let href = relative_url(&self.from, &anchor.url, &anchor.id);
                edits.push(Edit::new(whole.range(), format!("[{}]({href})", text.as_str())));
            }
        }
        edits
    }

    /// Relative form of a site-root path; `None` leaves the link as written.
    fn site_root(&self, path: &str, diagnostics: &mut Diagnostics) -> Option<String> {
        let (path, fragment) = split_path_fragment(path);
        let target = if path.ends_with(".md") {
            let route = Route::new(path);
            if !self.ctx.pages.contains(&route) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::BrokenLink,
                    &self.page.route,
                    path,
                    "link to a page that does not exist",
                ));
                return None;
            }
            route.url(self.ctx.directory_urls())
        } else {
            UrlPath::from_page_path(path)
        };
        Some(relative_url(&self.from, &target, fragment))
    }
}

/// `dest` right after the `](` closing the link text. The last such `](`
/// wins, so an image nested in the link text is skipped.
fn inline_dest(span: &str, dest: &str) -> Option<usize> {
    span.match_indices("](")
        .filter_map(|(i, _)| dest_at(span, i + 2, dest))
        .last()
}

/// `dest` after the `]:` of a reference definition.
fn definition_dest(span: &str, dest: &str) -> Option<usize> {
    dest_at(span, span.find("]:")? + 2, dest)
}

/// Skip whitespace and an opening `<`, then expect `dest`.
fn dest_at(span: &str, at: usize, dest: &str) -> Option<usize> {
    let rest = &span[at..];
    let trimmed = rest.trim_start();
    let at = at + (rest.len() - trimmed.len()) + usize::from(trimmed.starts_with('<'));
    span[at..].starts_with(dest).then_some(at)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{apply, context_with};
    use crate::core::Route;

    #[test]
    fn test_inline_links() {
        let content = "See [intro](/guide/intro.md#setup), [api](/reference/pkg/) and ![logo](/img/logo.svg).\n\
                       Keep [ext](https://example.com), [frag](#x) and [rel](../x/).\n";
        let (out, diags) = apply("reference/pkg/math", content, &[]);
        assert!(out.contains("[intro](../../../guide/intro/#setup)"));
        assert!(out.contains("[api](../)"));
        assert!(out.contains("![logo](../../../img/logo.svg)"));
        assert!(out.contains("[ext](https://example.com)"));
        assert!(out.contains("[frag](#x)"));
        assert!(out.contains("[rel](../x/)"));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_reference_definitions_and_html() {
        let content = "[Intro][intro]\n\n[intro]: /guide/intro.md\n\n<a href=\"/guide/\">Guide</a>\n<img src='/img/a.png'>\n";
        let (out, _) = apply("guide/avg", content, &[]);
        assert!(out.contains("[intro]: ../intro/"));
        assert!(out.contains("<a href=\"../\">Guide</a>"));
        assert!(out.contains("<img src='../../img/a.png'>"));
    }

    #[test]
    fn test_titles_are_left_alone() {
        let content = "[x](/guide/intro.md \"see /guide/intro.md\")\n\n[![logo](/img/logo.svg)](/guide/intro.md)\n\n[y]: </guide/intro.md> '/guide/intro.md'\n";
        let (out, diags) = apply("reference/pkg/math", content, &[]);
        assert!(out.contains("[x](../../../guide/intro/ \"see /guide/intro.md\")"));
        assert!(out.contains("[![logo](../../../img/logo.svg)](../../../guide/intro/)"));
        assert!(out.contains("[y]: <../../../guide/intro/> '/guide/intro.md'"));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_broken_page_link() {
        let (out, diags) = apply("index", "[x](/missing.md)\n", &[]);
        assert_eq!(out, "[x](/missing.md)\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().subject, "/missing.md");
    }

    #[test]
    fn test_identifier_references() {
        let content = "Use [`pkg.math.add`][] or [averages][pkg.math.MovingAverage].\n\n`[pkg.math.add][]` stays.\n\n[pkg.math.gone][]\n";
        let ctx = context_with(&[
            ("reference/pkg/math", "pkg.math.add"),
            ("reference/pkg/math", "pkg.math.MovingAverage"),
        ]);
        let (out, diags) = ctx.apply(Route::new("guide/avg"), content);
        assert!(out.contains("[`pkg.math.add`](../../reference/pkg/math/#pkg.math.add)"));
        assert!(out.contains("[averages](../../reference/pkg/math/#pkg.math.MovingAverage)"));
        assert!(out.contains("`[pkg.math.add][]` stays."));
        assert!(out.contains("[pkg.math.gone][]"));
        assert_eq!(diags.len(), 1);
    }
}
