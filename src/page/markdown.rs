//! Markdown parsing helpers shared by page loading, indexing and rewriting.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Parser options used for every pass over page content.
pub fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    opts
}

/// Split YAML (`---`) frontmatter from the body.
///
/// Returns `(frontmatter, body_offset)`; offsets let later passes keep
/// byte positions relative to the whole page.
pub fn split_frontmatter(content: &str) -> (Option<&str>, usize) {
    let Some(rest) = content.strip_prefix("---") else {
        return (None, 0);
    };
    let Some(first_break) = rest.find('\n') else {
        return (None, 0);
    };
    if !rest[..first_break].trim().is_empty() {
        return (None, 0);
    }

    let body_start = 3 + first_break + 1;
    let mut offset = body_start;
    for line in content[body_start..].split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim_end() == "---" {
            return (Some(&content[body_start..offset]), end);
        }
        offset = end;
    }
    (None, 0)
}

/// `title:` value of simple `key: value` frontmatter.
pub fn frontmatter_title(frontmatter: &str) -> Option<String> {
    frontmatter.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("title") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Plain text of the first level-1 heading.
pub fn first_h1(body: &str) -> Option<String> {
    let mut in_h1 = false;
    let mut text = String::new();
    for event in Parser::new_ext(body, options()) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_h1 = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let title = text.trim().to_string();
                return (!title.is_empty()).then_some(title);
            }
            Event::Text(t) | Event::Code(t) if in_h1 => text.push_str(&t),
            _ => {}
        }
    }
    None
}

/// Title for a page: frontmatter `title`, then first `#` heading, then the
/// humanized file stem.
pub fn page_title(content: &str, stem: &str) -> String {
    let (frontmatter, body_offset) = split_frontmatter(content);
    frontmatter
        .and_then(frontmatter_title)
        .or_else(|| first_h1(&content[body_offset..]))
        .unwrap_or_else(|| humanize(stem))
}

/// `getting_started` -> `Getting started`.
pub fn humanize(stem: &str) -> String {
    let spaced = stem.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_frontmatter() {
        let content = "---\ntitle: Guide\n---\n# Body\n";
        let (fm, offset) = split_frontmatter(content);
        assert_eq!(fm, Some("title: Guide\n"));
        assert_eq!(&content[offset..], "# Body\n");

        assert_eq!(split_frontmatter("# No frontmatter\n"), (None, 0));
        assert_eq!(split_frontmatter("---\nunterminated\n"), (None, 0));
        assert_eq!(split_frontmatter("--- x\n---\n"), (None, 0));
    }

    #[test]
    fn test_page_title() {
        assert_eq!(page_title("---\ntitle: \"From meta\"\n---\n# Heading\n", "x"), "From meta");
        assert_eq!(page_title("intro\n\n# The `pkg` guide {#guide}\n", "x"), "The pkg guide");
        assert_eq!(page_title("no heading", "getting_started"), "Getting started");
    }
}
