//! `check`: resolve everything, write nothing.

use anyhow::{Result, bail};

use crate::{config::SiteConfig, log, logger, pipeline, utils::plural};

pub fn check_site(config: &SiteConfig, strict: bool) -> Result<()> {
    let output = pipeline::run(config)?;
    let diagnostics = &output.diagnostics;

    diagnostics.print(logger::is_verbose());
    log!("check"; "{}", diagnostics);

    let warnings = diagnostics.warning_count();
    if strict && warnings > 0 {
        bail!("found {} in strict mode", plural(warnings, "warning"));
    }
    Ok(())
}
