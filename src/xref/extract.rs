//! Anchor extraction from raw page text.
//!
//! A pure pass over Markdown source: it predicts the ids the renderer will
//! give each heading, and the anchors each `::: ident` directive will expand
//! to, without rendering anything.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::ops::Range;
use std::sync::LazyLock;

use crate::core::ident;
use crate::package::SymbolTable;
use crate::page::markdown;

static RE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:::[ \t]+([A-Za-z_][\w.]*)").unwrap());
static RE_ID_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*)_([0-9]+)$").unwrap());

/// A heading with its final id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub id: String,
    /// Id came from a `{#id}` attribute.
    pub explicit: bool,
    pub text: String,
    /// Byte range of the heading in the page.
    pub range: Range<usize>,
}

/// A `::: ident` directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub ident: String,
    pub offset: usize,
}

/// Slugify heading text the way the renderer's table of contents does:
/// ASCII only, punctuation dropped, whitespace and dashes collapsed to `-`.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_ascii_whitespace())
        .collect();
    let lowered = kept.trim().to_ascii_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c == '-' || c.is_ascii_whitespace() {
            pending_dash = true;
        } else {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }
    if pending_dash {
        slug.push('-');
    }
    slug
}

/// Make `id` unique among `used` by bumping an `_N` suffix.
pub fn unique_id(id: &str, used: &mut FxHashSet<String>) -> String {
    let mut id = id.to_string();
    while id.is_empty() || used.contains(&id) {
        id = match RE_ID_COUNT.captures(&id) {
            Some(caps) => {
                let n: u64 = caps[2].parse().unwrap_or(0);
                format!("{}_{}", &caps[1], n + 1)
            }
            None => format!("{id}_1"),
        };
    }
    used.insert(id.clone());
    id
}

/// Headings of a page in document order, with their final ids.
pub fn headings(content: &str) -> Vec<Heading> {
    let mut out = Vec::new();
    let mut used = FxHashSet::default();
    let mut current: Option<(Option<String>, String, usize)> = None;

    for (event, range) in Parser::new_ext(content, markdown::options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { id, .. }) => {
                current = Some((id.map(|s| s.to_string()), String::new(), range.start));
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, text, _)) = current.as_mut() {
                    text.push_str(&t);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((explicit, text, start)) = current.take() {
                    let text = text.trim().to_string();
                    let (id, explicit) = match explicit {
                        Some(id) => {
                            used.insert(id.clone());
                            (id, true)
                        }
                        None => (unique_id(&slugify(&text), &mut used), false),
                    };
                    out.push(Heading {
                        id,
                        explicit,
                        text,
                        range: start..range.end,
                    });
                }
            }
            _ => {}
        }
    }
    out
}

/// Byte ranges of fenced and indented code blocks.
pub fn code_block_ranges(content: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = None;
    for (event, range) in Parser::new_ext(content, markdown::options()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_)) => start = Some(range.start),
            Event::End(TagEnd::CodeBlock) => {
                if let Some(s) = start.take() {
                    out.push(s..range.end);
                }
            }
            _ => {}
        }
    }
    out
}

/// `::: ident` lines outside code blocks.
pub fn directives(content: &str) -> Vec<Directive> {
    let code = code_block_ranges(content);
    let mut out = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        if code.iter().any(|r| r.contains(&start)) {
            continue;
        }
        if let Some(caps) = RE_DIRECTIVE.captures(line) {
            let ident = caps[1].trim_end_matches('.');
            if ident::is_dotted(ident) {
                out.push(Directive {
                    ident: ident.to_string(),
                    offset: start,
                });
            }
        }
    }
    out
}

/// All anchor ids a page will carry, in document order, without duplicates.
pub fn anchor_ids(content: &str, symbols: &SymbolTable) -> Vec<String> {
    let mut positioned: Vec<(usize, String)> = headings(content)
        .into_iter()
        .map(|h| (h.range.start, h.id))
        .collect();
    for directive in directives(content) {
        positioned.extend(
            symbols
                .directive_anchors(&directive.ident)
                .into_iter()
                .map(|id| (directive.offset, id)),
        );
    }
    positioned.sort_by_key(|(offset, _)| *offset);

    let mut seen = FxHashSet::default();
    positioned
        .into_iter()
        .filter_map(|(_, id)| seen.insert(id.clone()).then_some(id))
        .collect()
}
