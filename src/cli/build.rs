//! `build`: run every phase and write the output.
//!
//! - **Scan** - package roots -> module forest + symbol table
//! - **Tree** - generated + authored pages, spliced navigation
//! - **Index** - identifier -> candidate anchors
//! - **Render** - per-page link, code and source rewriting (parallel)
//! - **Emit** - pages, copied files and JSON indexes

use anyhow::Result;
use std::time::Instant;

use crate::{config::SiteConfig, log, logger, pipeline};

pub fn build_site(config: &SiteConfig, clean: bool) -> Result<()> {
    let start = Instant::now();

    let output = pipeline::run(config)?;
    pipeline::emit(config, &output, clean)?;

    output.diagnostics.print(logger::is_verbose());
    log!(
        "build";
        "done in {:.2?}, {}",
        start.elapsed(),
        output.diagnostics
    );
    Ok(())
}
