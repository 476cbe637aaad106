//! The build pipeline.
//!
//! Five strictly ordered phases, each a function of the previous phase's
//! output plus the config:
//!
//! ```text
//! scan    package_dirs           -> ModuleForest + SymbolTable
//! tree    forest + docs + nav    -> PageSet + nav tree
//! index   PageSet                -> IdentifierIndex
//! render  PageSet + index        -> rewritten pages + diagnostics   (rayon)
//! emit    everything             -> files under `site.output`
//! ```
//!
//! Only `emit` touches the output directory, so `check` runs the first four
//! phases and stops.

pub mod output;


pub use output::emit;

use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::config::{ConfigError, SiteConfig};
use crate::diagnostics::Diagnostics;
use crate::package::{ExcludeMatcher, ModuleForest, SymbolTable, scan_roots};
use crate::page::{NavNode, PageSet, PageTreeBuilder, load_authored, load_static_files};
use crate::rewrite::{RenderContext, RenderedPage, render_page};
use crate::source::{Remote, SourceLocator};
use crate::utils::plural;
use crate::xref::{IdentifierIndex, build_index};
use crate::{debug, log};

/// Output of the scan phase.
pub struct Scanned {
    pub forest: ModuleForest,
    pub symbols: SymbolTable,
    pub exclude: ExcludeMatcher,
}

/// Everything a build produces before it is written out.
#[derive(Debug)]
pub struct BuildOutput {
    pub nav: Vec<NavNode>,
    pub pages: PageSet,
    /// Rewritten pages, in processing order.
    pub rendered: Vec<RenderedPage>,
    pub index: IdentifierIndex,
    /// Identifier -> remote source URL, empty without `[source]` links.
    pub sources: BTreeMap<String, String>,
    pub diagnostics: Diagnostics,
}

/// Phase 1: walk the package roots and parse their declarations.
pub fn scan(config: &SiteConfig) -> Result<Scanned, ConfigError> {
    let exclude = ExcludeMatcher::new(&config.reference.exclude_glob)?;
    let forest = scan_roots(&config.reference.package_dirs, &exclude)?;
    let symbols = SymbolTable::build(&forest)?;

    log!(
        "scan";
        "{} in {}",
        plural(forest.len(), "module"),
        plural(config.reference.package_dirs.len(), "package root")
    );
    Ok(Scanned {
        forest,
        symbols,
        exclude,
    })
}

/// Run phases 1 to 4. Nothing is written.
pub fn run(config: &SiteConfig) -> Result<BuildOutput, ConfigError> {
    let scanned = scan(config)?;
    let directory_urls = config.site.directory_urls;

    // Phase 2: page tree
    let authored = load_authored(&config.site.docs_dir, &scanned.exclude)?;
    let files = load_static_files(config)?;
    let tree = PageTreeBuilder::new(config).build(&scanned.forest, authored, files)?;
    log!(
        "pages";
        "{} ({} generated), {}",
        plural(tree.pages.len(), "page"),
        tree.pages.generated_count(),
        plural(tree.pages.files.len(), "copied file")
    );

    // Phase 3: identifier index
    let index = build_index(&tree.pages, &scanned.symbols, directory_urls);
    log!(
        "index";
        "{} over {}",
        plural(index.len(), "identifier"),
        plural(index.anchor_count(), "anchor")
    );

    // Phase 4: resolve and rewrite
    let locator = if config.links.source_links {
        let remote = Remote::discover(&config.root, &config.links)?;
        Some(SourceLocator::new(&scanned.symbols, config.root.clone(), Some(remote)))
    } else {
        None
    };
    let ctx = RenderContext::new(config, &tree.pages, &index, &scanned.forest, locator.as_ref());

    let rendered: Vec<RenderedPage> = tree
        .pages
        .pages()
        .par_iter()
        .map(|page| render_page(&ctx, page))
        .collect();

    let mut diagnostics = tree.diagnostics.clone();
    for page in &rendered {
        diagnostics.extend(page.diagnostics.iter().cloned());
    }

    let sources = locator
        .as_ref()
        .map(|locator| source_urls(&index, locator))
        .unwrap_or_default();
    if let Some(locator) = &locator {
        debug!("source"; "{} looked up", plural(locator.cached(), "identifier"));
    }

    log!("render"; "{}, {diagnostics}", plural(rendered.len(), "page"));
    drop(ctx);

    Ok(BuildOutput {
        nav: tree.nav,
        pages: tree.pages,
        rendered,
        index,
        sources,
        diagnostics,
    })
}

/// Remote source URL of every locatable identifier in the index.
fn source_urls(index: &IdentifierIndex, locator: &SourceLocator<'_>) -> BTreeMap<String, String> {
    let identifiers: Vec<&str> = index.iter().map(|(identifier, _)| identifier).collect();
    identifiers
        .par_iter()
        .filter_map(|identifier| {
            locator
                .source_url(identifier)
                .map(|url| (identifier.to_string(), url))
        })
        .collect()
}
