//! `locate`: where is an identifier declared?

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::config::SiteConfig;
use crate::core::ident;
use crate::source::{Remote, SourceLocator};
use crate::{debug, pipeline};

pub fn locate_ident(config: &SiteConfig, identifier: &str) -> Result<()> {
    if !ident::is_dotted(identifier) {
        bail!("`{identifier}` is not a dotted identifier");
    }

    let scanned = pipeline::scan(config)?;

    // The URL is a bonus here, a missing remote is not an error.
    let remote = match Remote::discover(&config.root, &config.links) {
        Ok(remote) => Some(remote),
        Err(e) => {
            debug!("locate"; "no remote: {e}");
            None
        }
    };
    let locator = SourceLocator::new(&scanned.symbols, config.root.clone(), remote);

    let Some(location) = locator.locate(identifier) else {
        bail!("no declaration found for `{identifier}`");
    };
    println!("{}", location.bold());
    if let Some(url) = locator.url(&location) {
        println!("{}", url.dimmed());
    }
    Ok(())
}
