//! Authored pages and copied files.

use jwalk::WalkDir;
use std::fs;
use std::io;
use std::path::Path;

use super::{StaticFile, VirtualPage, markdown};
use crate::config::{ConfigError, SiteConfig};
use crate::core::Route;
use crate::debug;
use crate::package::ExcludeMatcher;

/// Load every `*.md` file under `docs_dir`, sorted by route.
///
/// A missing docs directory yields no pages; an unreadable entry below it
/// is an error.
pub fn load_authored(docs_dir: &Path, exclude: &ExcludeMatcher) -> Result<Vec<VirtualPage>, ConfigError> {
    if !docs_dir.is_dir() {
        debug!("pages"; "no docs directory at {}", docs_dir.display());
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(docs_dir).skip_hidden(true).sort(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| docs_dir.to_path_buf(), Path::to_path_buf);
            ConfigError::Io(path, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let rel = path.strip_prefix(docs_dir).unwrap_or(&path);
        if exclude.is_match(rel) {
            debug!("pages"; "excluded {}", rel.display());
            continue;
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = markdown::page_title(&content, &stem);
        pages.push(VirtualPage::authored(
            Route::from_source_path(rel),
            title,
            content,
            path.clone(),
        ));
    }

    pages.sort_by(|a, b| a.route.cmp(&b.route));
    Ok(pages)
}

/// Read every `copy_files` source. A missing source is fatal.
pub fn load_static_files(config: &SiteConfig) -> Result<Vec<StaticFile>, ConfigError> {
    config
        .reference
        .copy_files
        .iter()
        .map(|(dest, source)| {
            let dest = dest.trim_start_matches('/').to_string();
            if !source.is_file() {
                return Err(ConfigError::CopyFile {
                    dest,
                    source_path: source.clone(),
                });
            }
            let bytes = fs::read(source).map_err(|e| ConfigError::Io(source.clone(), e))?;
            Ok(StaticFile {
                dest,
                source: source.clone(),
                bytes,
            })
        })
        .collect()
}
