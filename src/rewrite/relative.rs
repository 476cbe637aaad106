//! Page-relative URLs.
//!
//! ```text
//! from /reference/pkg/math/  to /guide/avg/#pkg.math.MovingAverage
//!   common prefix: []
//!   up:            ../../../
//!   down:          guide/avg/
//!   result:        ../../../guide/avg/#pkg.math.MovingAverage
//! ```

use crate::core::UrlPath;

/// URL of `to` relative to the page served at `from`.
///
/// An empty fragment adds nothing. Linking a page to itself yields just
/// the fragment (or `./` for a directory URL without one).
pub fn relative_url(from: &UrlPath, to: &UrlPath, fragment: &str) -> String {
    if from == to && !fragment.is_empty() {
        return format!("#{fragment}");
    }

    let from_dirs = from.dir_segments();
    let to_dirs = to.dir_segments();
    let common = from_dirs
        .iter()
        .zip(&to_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_dirs.len() - common];
    parts.extend(&to_dirs[common..]);

    let mut url = match to.file_name() {
        Some(file) => {
            parts.push(file);
            parts.join("/")
        }
        None if parts.is_empty() => "./".to_string(),
        None => format!("{}/", parts.join("/")),
    };
    if !fragment.is_empty() {
        url.push('#');
        url.push_str(fragment);
    }
    url
}
