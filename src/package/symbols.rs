//! Symbol table over the scanned modules.
//!
//! Built once after scanning, then shared read-only by the anchor indexer
//! (directive expansion) and the source locator (definition lines).

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::python::{DefKind, Definition, ImportBase, ModuleSymbols, parse_module};
use super::ModuleForest;
use crate::config::ConfigError;
use crate::core::ident;

/// Import chains longer than this are treated as unresolvable.
const MAX_IMPORT_HOPS: usize = 8;

#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub dotted: String,
    pub file: PathBuf,
    pub is_package: bool,
    pub symbols: ModuleSymbols,
}

/// What a dotted identifier refers to.
#[derive(Debug, Clone, Copy)]
pub enum Symbol<'a> {
    Module(&'a ModuleInfo),
    Item {
        module: &'a ModuleInfo,
        definition: &'a Definition,
    },
}

impl<'a> Symbol<'a> {
    /// Declaring file.
    pub fn file(&self) -> &'a Path {
        match *self {
            Self::Module(m) | Self::Item { module: m, .. } => &m.file,
        }
    }

    /// 1-based starting line. Modules start at line 1.
    pub fn line(&self) -> usize {
        match *self {
            Self::Module(_) => 1,
            Self::Item { definition, .. } => definition.line,
        }
    }

    fn as_class(&self) -> Option<&'a Definition> {
        match *self {
            Self::Item { definition, .. } if definition.kind == DefKind::Class => Some(definition),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    modules: FxHashMap<String, ModuleInfo>,
}

impl SymbolTable {
    /// Parse every module of the forest in parallel.
    pub fn build(forest: &ModuleForest) -> Result<Self, ConfigError> {
        let nodes: Vec<_> = forest.iter().collect();
        let modules = nodes
            .par_iter()
            .map(|node| {
                let bytes = fs::read(&node.path).map_err(|e| ConfigError::Io(node.path.clone(), e))?;
                let source = String::from_utf8_lossy(&bytes);
                let symbols = parse_module(
                    &source,
                    ImportBase {
                        module: &node.dotted,
                        is_package: node.is_package,
                    },
                );
                Ok((
                    node.dotted.clone(),
                    ModuleInfo {
                        dotted: node.dotted.clone(),
                        file: node.path.clone(),
                        is_package: node.is_package,
                        symbols,
                    },
                ))
            })
            .collect::<Result<FxHashMap<_, _>, ConfigError>>()?;
        Ok(Self { modules })
    }

    /// Build from already parsed modules.
    pub fn from_modules(modules: impl IntoIterator<Item = ModuleInfo>) -> Self {
        Self {
            modules: modules.into_iter().map(|m| (m.dotted.clone(), m)).collect(),
        }
    }

    pub fn module(&self, dotted: &str) -> Option<&ModuleInfo> {
        self.modules.get(dotted)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolve a dotted identifier to its declaration, following re-exports.
    pub fn lookup(&self, dotted: &str) -> Option<Symbol<'_>> {
        self.lookup_within(dotted, 0)
    }

    fn lookup_within(&self, dotted: &str, hops: usize) -> Option<Symbol<'_>> {
        if hops > MAX_IMPORT_HOPS || !ident::is_dotted(dotted) {
            return None;
        }
        let segments: Vec<&str> = dotted.split('.').collect();
        let (module, rest) = (1..=segments.len()).rev().find_map(|k| {
            self.modules
                .get(&segments[..k].join("."))
                .map(|m| (m, &segments[k..]))
        })?;

        let Some((first, tail)) = rest.split_first() else {
            return Some(Symbol::Module(module));
        };

        if let Some(definition) = module.symbols.definition(first) {
            return tail
                .iter()
                .try_fold(definition, |definition, name| definition.member(name))
                .map(|definition| Symbol::Item { module, definition });
        }

        let binding = module.symbols.import(first)?;
        let target = tail
            .iter()
            .fold(binding.target.clone(), |acc, seg| ident::join(&acc, seg));
        self.lookup_within(&target, hops + 1)
    }

    /// Anchors a `::: ident` directive renders: the identifier itself and
    /// its public members, one level deep.
    pub fn directive_anchors(&self, dotted: &str) -> Vec<String> {
        let mut anchors = vec![dotted.to_string()];
        match self.lookup(dotted) {
            Some(Symbol::Module(module)) => {
                for name in module.symbols.public_names() {
                    let child = ident::join(dotted, &name);
                    let class = self.lookup(&child).and_then(|s| s.as_class());
                    anchors.push(child.clone());
                    if let Some(class) = class {
                        anchors.extend(public_members(class).map(|m| ident::join(&child, m)));
                    }
                }
            }
            Some(symbol) => {
                if let Some(class) = symbol.as_class() {
                    anchors.extend(public_members(class).map(|m| ident::join(dotted, m)));
                }
            }
            None => {}
        }
        anchors
    }
}

fn public_members(class: &Definition) -> impl Iterator<Item = &str> {
    class
        .members
        .iter()
        .filter(|m| !m.name.starts_with('_'))
        .map(|m| m.name.as_str())
}
