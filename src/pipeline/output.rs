//! Phase 5: write the build to `site.output`.
//!
//! ```text
//! <output>/
//! ├── <route>.md         # rewritten pages
//! ├── <dest>             # copy_files
//! ├── nav.json
//! ├── anchors.json
//! ├── sources.json
//! └── diagnostics.json
//! ```
//!
//! All JSON is written from ordered maps and vectors, so unchanged inputs
//! produce byte-identical files.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use super::BuildOutput;
use crate::config::{ConfigError, SiteConfig};
use crate::log;
use crate::utils::plural;

pub const NAV_FILE: &str = "nav.json";
pub const ANCHORS_FILE: &str = "anchors.json";
pub const SOURCES_FILE: &str = "sources.json";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.json";

/// Write every page, copied file and index. Returns the number of files written.
pub fn emit(config: &SiteConfig, output: &BuildOutput, clean: bool) -> Result<usize, ConfigError> {
    let out_dir = config.site.output.as_path();

    if clean && out_dir.exists() {
        if config.site.docs_dir.starts_with(out_dir) || config.root.starts_with(out_dir) {
            return Err(ConfigError::Validation(format!(
                "refusing to clean `{}`: it contains the project sources",
                config.root_relative(out_dir)
            )));
        }
        fs::remove_dir_all(out_dir).map_err(|e| ConfigError::Io(out_dir.to_path_buf(), e))?;
        log!("clean"; "removed {}", config.root_relative(out_dir));
    }

    let mut written = 0;
    for page in &output.rendered {
        write_file(out_dir, &page.route.output_file(), page.content.as_bytes())?;
        written += 1;
    }
    for file in &output.pages.files {
        write_file(out_dir, &file.dest, &file.bytes)?;
        written += 1;
    }

    write_json(out_dir, NAV_FILE, &output.nav)?;
    write_json(out_dir, ANCHORS_FILE, &output.index)?;
    write_json(out_dir, SOURCES_FILE, &output.sources)?;
    write_json(out_dir, DIAGNOSTICS_FILE, &output.diagnostics)?;
    written += 4;

    log!(
        "emit";
        "{} to {}",
        plural(written, "file"),
        config.root_relative(out_dir)
    );
    Ok(written)
}

fn write_json<T: Serialize>(out_dir: &Path, name: &str, value: &T) -> Result<(), ConfigError> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|e| ConfigError::Io(out_dir.join(name), io::Error::other(e)))?;
    json.push('\n');
    write_file(out_dir, name, json.as_bytes())
}

fn write_file(out_dir: &Path, rel: &str, bytes: &[u8]) -> Result<(), ConfigError> {
    let path = out_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
    }
    fs::write(&path, bytes).map_err(|e| ConfigError::Io(path, e))
}
