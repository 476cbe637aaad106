//! `[source]` links on identifier headings.

use super::{Edit, RenderContext};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::page::VirtualPage;
use crate::source::SourceLocator;
use crate::utils::html::escape_attr;
use crate::xref::extract::{Heading, headings};

pub struct SourceTransform<'a> {
    ctx: &'a RenderContext<'a>,
    page: &'a VirtualPage,
    locator: &'a SourceLocator<'a>,
}

impl<'a> SourceTransform<'a> {
    pub fn new(ctx: &'a RenderContext<'a>, page: &'a VirtualPage, locator: &'a SourceLocator<'a>) -> Self {
        Self { ctx, page, locator }
    }

    pub fn edits(&self, diagnostics: &mut Diagnostics) -> Vec<Edit> {
        let content = self.page.content.as_str();
        headings(content)
            .into_iter()
            .filter(|h| is_sourced(&h.id) && self.ctx.matches_pattern(&h.id))
            .filter_map(|heading| {
                let Some(url) = self.locator.source_url(&heading.id) else {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::SourceNotFound,
                        &self.page.route,
                        &heading.id,
                        "no declaration found for heading",
                    ));
                    return None;
                };
                let at = insertion_point(content, &heading);
                Some(Edit::insert(
                    at,
                    format!(
                        " <a class=\"sourced-heading\" href=\"{}\" target=\"_blank\">[source]</a>",
                        escape_attr(&url)
                    ),
                ))
            })
            .collect()
    }
}

/// Headings with a qualified identifier id, skipping `--` suffixed ids.
fn is_sourced(id: &str) -> bool {
    crate::core::ident::is_qualified(id) && !id.contains("--")
}

/// Before a trailing `{#id}` block or closing `#`s, else at the end of the
/// heading's first line.
fn insertion_point(content: &str, heading: &Heading) -> usize {
    let text = &content[heading.range.clone()];
    let line = text.split('\n').next().unwrap_or(text);
    let mut end = line.trim_end().len();

    if let Some(attrs) = line[..end].rfind('{')
        && line[..end].ends_with('}')
    {
        end = line[..attrs].trim_end().len();
    }
    if line.starts_with('#') {
        let without_closing = line[..end].trim_end_matches('#');
        if without_closing.ends_with(' ') {
            end = without_closing.trim_end().len();
        }
    }
    heading.range.start + end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xref::extract::headings;

    fn point(content: &str) -> String {
        let heading = &headings(content)[0];
        let at = insertion_point(content, heading);
        format!("{}|{}", &content[..at], &content[at..])
    }

    #[test]
    fn test_insertion_point() {
        assert_eq!(point("## Title {#pkg.add}\n"), "## Title| {#pkg.add}\n");
        assert_eq!(point("## Title\n"), "## Title|\n");
        assert_eq!(point("## Title ##\n"), "## Title| ##\n");
        assert_eq!(point("Title {#pkg.add}\n=====\n"), "Title| {#pkg.add}\n=====\n");
    }

    #[test]
    fn test_is_sourced() {
        assert!(is_sourced("pkg.math.add"));
        assert!(!is_sourced("add"));
        assert!(!is_sourced("getting-started"));
        assert!(!is_sourced("pkg.math--params"));
    }
}
