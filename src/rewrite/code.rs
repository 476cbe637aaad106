//! Clickable code blocks.
//!
//! A fenced block in one of the configured languages is scanned for
//! identifier mentions. When at least one mention resolves, the whole block
//! is re-emitted as a raw `<pre><code>` HTML block with the resolved names
//! wrapped in `<a class="clickable-discrete-link">`. Fences nested in list
//! items or block quotes are re-emitted behind the same line prefix.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use rustc_hash::FxHashMap;
use std::ops::Range;

use super::{Edit, RenderContext, relative_url};
use crate::core::UrlPath;
use crate::diagnostics::Diagnostics;
use crate::page::{VirtualPage, markdown};
use crate::resolve::code_mentions;
use crate::resolve::mentions::Mention;
use crate::utils::html::{escape, escape_attr};

/// A fenced code block and its text.
struct Fence {
    range: Range<usize>,
    /// Text between the start of the line and the opening fence.
    indent: String,
    lang: String,
    code: String,
}

pub struct CodeTransform<'a> {
    ctx: &'a RenderContext<'a>,
    page: &'a VirtualPage,
    from: UrlPath,
}

impl<'a> CodeTransform<'a> {
    pub fn new(ctx: &'a RenderContext<'a>, page: &'a VirtualPage) -> Self {
        Self {
            ctx,
            page,
            from: page.url(ctx.directory_urls()),
        }
    }

    pub fn edits(&self, diagnostics: &mut Diagnostics) -> Vec<Edit> {
        // Resolve each identifier once per page so warnings are not repeated.
        let mut resolved: FxHashMap<String, Option<(usize, String)>> = FxHashMap::default();

        self.fences()
            .into_iter()
            .filter_map(|fence| {
                let links: Vec<(Range<usize>, String)> = code_mentions(&fence.code)
                    .into_iter()
                    .filter_map(|m| {
                        let (dropped, href) = resolved
                            .entry(m.identifier.clone())
                            .or_insert_with(|| self.link(&m, diagnostics))
                            .clone()?;
                        let (range, _) = m.prefix(dropped)?;
                        Some((range, href))
                    })
                    .collect();

                if links.is_empty() {
                    return None;
                }
                let mut html = render(&fence, &links);
                if !fence.indent.is_empty() {
                    html = html.replace('\n', &format!("\n{}", fence.indent));
                }
                if self.page.content[fence.range.clone()].ends_with('\n') {
                    html.push('\n');
                }
                Some(Edit::new(fence.range, html))
            })
            .collect()
    }

    /// Link the longest prefix of the chain that resolves, so that
    /// `Model.from_config` still links `Model`. Returns how many trailing
    /// names were dropped.
    fn link(&self, mention: &Mention, diagnostics: &mut Diagnostics) -> Option<(usize, String)> {
        let resolver = &self.ctx.resolver;
        let route = &self.page.route;

        let found = (0..)
            .map_while(|dropped| mention.prefix(dropped).map(|(_, id)| (dropped, id)))
            .filter(|(_, id)| self.ctx.eligible(id))
            .find(|(_, id)| resolver.resolve(id).anchor().is_some());

        let Some((dropped, identifier)) = found else {
            if self.ctx.eligible(&mention.identifier) {
                resolver.resolve_reported(&mention.identifier, route, diagnostics);
            }
            return None;
        };
        let anchor = resolver.resolve_reported(identifier, route, diagnostics)?;
        Some((dropped, relative_url(&self.from, &anchor.url, &anchor.id)))
    }

    /// Fenced blocks in a scanned language. A block nested in a list item
    /// or block quote keeps its line prefix.
    fn fences(&self) -> Vec<Fence> {
        let content = self.page.content.as_str();
        let mut out = Vec::new();
        let mut current: Option<Fence> = None;

        for (event, range) in Parser::new_ext(content, markdown::options()).into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    let line_start = content[..range.start].rfind('\n').map_or(0, |i| i + 1);
                    let start = content[range.start..]
                        .find(|c| !is_prefix_char(c))
                        .map_or(range.start, |i| range.start + i);
                    let indent = &content[line_start..start];
                    let fenced =
                        content[start..].starts_with("```") || content[start..].starts_with("~~~");
                    let lang = info.split_whitespace().next().unwrap_or("").to_string();
                    if fenced
                        && indent.chars().all(is_prefix_char)
                        && self.ctx.config.links.is_code_language(&lang)
                    {
                        current = Some(Fence {
                            range: start..range.end,
                            indent: indent.to_string(),
                            lang,
                            code: String::new(),
                        });
                    }
                }
                Event::Text(text) => {
                    if let Some(fence) = current.as_mut() {
                        fence.code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(fence) = current.take() {
                        out.push(fence);
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// Indentation and block quote markers in front of a nested fence.
fn is_prefix_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '>')
}

fn render(fence: &Fence, links: &[(Range<usize>, String)]) -> String {
    let code = fence.code.as_str();
    let mut html = format!("<pre><code class=\"language-{}\">", escape_attr(&fence.lang));
    let mut cursor = 0;
    for (range, href) in links {
        html.push_str(&escape(&code[cursor..range.start]));
        html.push_str(&format!(
            "<a class=\"clickable-discrete-link\" href=\"{}\">{}</a>",
            escape_attr(href),
            escape(&code[range.clone()])
        ));
        cursor = range.end;
    }
    html.push_str(&escape(&code[cursor..]));
    html.push_str("</code></pre>");
    html
}
