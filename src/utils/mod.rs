//! Shared helpers with no build state.
//!
//! - [`html`]: HTML escaping for re-emitted code blocks and anchors
//! - [`path`]: filesystem path normalization and display

pub mod html;
pub mod path;

/// Format a count with a noun, pluralized with a trailing `s`.
///
/// `plural(1, "page")` is `"1 page"`, `plural(3, "page")` is `"3 pages"`.
pub fn plural(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
