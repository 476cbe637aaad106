//! Static introspection of Python sources.
//!
//! Sources are parsed with tree-sitter and never executed. Only the parts
//! of the syntax tree that say where a name is declared, or where an
//! imported name comes from, are walked.
//!
//! ```text
//! module
//! ├── class_definition       -> Definition (members walked recursively)
//! ├── function_definition    -> Definition
//! ├── decorated_definition   -> the wrapped definition
//! ├── expression_statement   -> assignment targets, `__all__`
//! ├── import[_from]_statement -> ImportBinding
//! └── if/try/with            -> same scope, walked through
//! ```

use std::ops::Range;
use tree_sitter::{Node, Parser, Tree};

use crate::core::ident;
use crate::debug;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefKind {
    Class,
    Function,
    Attribute,
}

/// A named declaration and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub kind: DefKind,
    pub line: usize,
    /// Methods, class attributes and nested classes (classes only).
    pub members: Vec<Definition>,
}

impl Definition {
    fn new(name: &str, kind: DefKind, line: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            line,
            members: Vec::new(),
        }
    }

    pub fn member(&self, name: &str) -> Option<&Definition> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Record an assigned name unless it is a dunder or already declared.
    fn add_attribute(&mut self, name: &str, line: usize) {
        if !is_dunder(name) && self.member(name).is_none() {
            self.members.push(Definition::new(name, DefKind::Attribute, line));
        }
    }
}

/// A name bound by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Name visible in the importing scope (`np` for `import numpy as np`).
    pub local: String,
    /// Absolute dotted target (`numpy`).
    pub target: String,
}

/// Everything the parser learned about one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSymbols {
    /// Top-level declarations in source order.
    pub definitions: Vec<Definition>,
    /// Names listed in `__all__`, if the module declares it.
    pub all: Option<Vec<String>>,
    /// Module-level import bindings in source order.
    pub imports: Vec<ImportBinding>,
}

impl ModuleSymbols {
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Last binding of `local` (later imports shadow earlier ones).
    pub fn import(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.iter().rev().find(|b| b.local == local)
    }

    /// Public top-level names: `__all__` when declared, otherwise every
    /// definition without a leading underscore.
    pub fn public_names(&self) -> Vec<String> {
        match &self.all {
            Some(all) => all.clone(),
            None => self
                .definitions
                .iter()
                .filter(|d| !d.name.starts_with('_'))
                .map(|d| d.name.clone())
                .collect(),
        }
    }
}

/// Where relative imports are anchored.
#[derive(Debug, Clone, Copy)]
pub struct ImportBase<'a> {
    /// Dotted path of the importing module.
    pub module: &'a str,
    /// Whether the importing module is a package `__init__`.
    pub is_package: bool,
}

impl ImportBase<'_> {
    /// Resolve a relative module reference (`level` leading dots).
    fn resolve(&self, level: usize, module: &str) -> Option<String> {
        let mut parts: Vec<&str> = self.module.split('.').collect();
        // A plain module's package is its parent; a package is its own.
        if !self.is_package {
            parts.pop();
        }
        for _ in 1..level {
            parts.pop()?;
        }
        if parts.is_empty() {
            return None;
        }
        Some(ident::join(&parts.join("."), module))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse Python source into a syntax tree.
///
/// tree-sitter recovers from syntax errors locally, so a broken statement
/// only hides itself.
pub fn parse(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
        debug!("python"; "grammar unavailable: {e}");
        return None;
    }
    parser.parse(source, None)
}

/// Parse a module's source.
pub fn parse_module(source: &str, base: ImportBase<'_>) -> ModuleSymbols {
    let mut symbols = ModuleSymbols::default();
    if let Some(tree) = parse(source) {
        module_scope(tree.root_node(), source, base, &mut symbols);
    }
    symbols
}

fn module_scope(node: Node, source: &str, base: ImportBase<'_>, symbols: &mut ModuleSymbols) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_statement" | "import_from_statement" => {
                symbols.imports.extend(import_bindings(child, source, Some(base)));
            }
            "expression_statement" => module_assignments(child, source, symbols),
            "if_statement" | "try_statement" | "with_statement" => {
                for block in nested_blocks(child) {
                    module_scope(block, source, base, symbols);
                }
            }
            _ => {
                if let Some(definition) = declaration(child, source) {
                    symbols.definitions.push(definition);
                }
            }
        }
    }
}

/// Class or function declared by `node`, with class members filled in.
fn declaration(node: Node, source: &str) -> Option<Definition> {
    match node.kind() {
        "decorated_definition" => declaration(node.child_by_field_name("definition")?, source),
        "function_definition" => {
            let name = node.child_by_field_name("name")?;
            Some(Definition::new(text(name, source), DefKind::Function, line(node)))
        }
        "class_definition" => {
            let name = node.child_by_field_name("name")?;
            let mut class = Definition::new(text(name, source), DefKind::Class, line(node));
            if let Some(body) = node.child_by_field_name("body") {
                class_body(body, source, &mut class);
            }
            Some(class)
        }
        _ => None,
    }
}

fn class_body(body: Node, source: &str, class: &mut Definition) {
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        match child.kind() {
            "expression_statement" => {
                for name in assigned_names(child, source) {
                    class.add_attribute(name, line(child));
                }
            }
            "if_statement" | "try_statement" | "with_statement" => {
                for block in nested_blocks(child) {
                    class_body(block, source, class);
                }
            }
            _ => {
                if let Some(member) = declaration(child, source) {
                    class.members.push(member);
                }
            }
        }
    }
}

fn module_assignments(statement: Node, source: &str, symbols: &mut ModuleSymbols) {
    let mut cursor = statement.walk();
    for node in statement.named_children(&mut cursor) {
        match node.kind() {
            "assignment" => {
                let mut names = Vec::new();
                assignment_targets(node, source, &mut names);
                for name in names {
                    if name == "__all__" {
                        symbols.all = assigned_value(node).map(|value| listed_names(value, source));
                    } else if !is_dunder(name) && symbols.definition(name).is_none() {
                        symbols
                            .definitions
                            .push(Definition::new(name, DefKind::Attribute, line(node)));
                    }
                }
            }
            // __all__ += [...]
            "augmented_assignment" => {
                let target = node.child_by_field_name("left").map(|n| text(n, source));
                if target == Some("__all__")
                    && let Some(value) = node.child_by_field_name("right")
                {
                    symbols
                        .all
                        .get_or_insert_with(Vec::new)
                        .extend(listed_names(value, source));
                }
            }
            _ => {}
        }
    }
}

/// Names bound by the assignments of an expression statement.
fn assigned_names<'s>(statement: Node, source: &'s str) -> Vec<&'s str> {
    let mut names = Vec::new();
    let mut cursor = statement.walk();
    for node in statement.named_children(&mut cursor) {
        if node.kind() == "assignment" {
            assignment_targets(node, source, &mut names);
        }
    }
    names
}

/// Targets of `a = b = 1` and `x, (y, *z) = ...`. Attribute and subscript
/// targets bind nothing in the enclosing scope.
fn assignment_targets<'s>(assignment: Node, source: &'s str, out: &mut Vec<&'s str>) {
    if let Some(left) = assignment.child_by_field_name("left") {
        pattern_names(left, source, out);
    }
    if let Some(right) = assignment.child_by_field_name("right")
        && right.kind() == "assignment"
    {
        assignment_targets(right, source, out);
    }
}

fn pattern_names<'s>(node: Node, source: &'s str, out: &mut Vec<&'s str>) {
    match node.kind() {
        "identifier" => out.push(text(node, source)),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                pattern_names(child, source, out);
            }
        }
        _ => {}
    }
}

/// The value at the end of an assignment chain.
fn assigned_value(mut node: Node) -> Option<Node> {
    loop {
        let right = node.child_by_field_name("right")?;
        if right.kind() != "assignment" {
            return Some(right);
        }
        node = right;
    }
}

/// String literals of a list or tuple that are valid names.
fn listed_names(node: Node, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    collect_strings(node, source, &mut out);
    out
}

fn collect_strings(node: Node, source: &str, out: &mut Vec<String>) {
    let mut cursor = node.walk();
    if node.kind() == "string" {
        let value: String = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "string_content")
            .map(|n| text(n, source))
            .collect();
        if ident::is_segment(&value) {
            out.push(value);
        }
        return;
    }
    for child in node.named_children(&mut cursor) {
        collect_strings(child, source, out);
    }
}

/// Bodies of a compound statement and its clauses (`elif`, `except`, ...).
fn nested_blocks(node: Node) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "block" {
            blocks.push(child);
        } else if child.kind().ends_with("_clause") {
            blocks.extend(nested_blocks(child));
        }
    }
    blocks
}

/// Bindings of one import statement. Relative imports need a `base`.
fn import_bindings(node: Node, source: &str, base: Option<ImportBase<'_>>) -> Vec<ImportBinding> {
    let mut cursor = node.walk();
    let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();

    match node.kind() {
        "import_statement" => names
            .into_iter()
            .map(|item| {
                let (module, alias) = aliased(item, source);
                match alias {
                    Some(alias) => ImportBinding {
                        local: alias.to_string(),
                        target: module,
                    },
                    None => {
                        let root = ident::root_segment(&module).to_string();
                        ImportBinding {
                            local: root.clone(),
                            target: root,
                        }
                    }
                }
            })
            .collect(),
        "import_from_statement" => {
            let from = node
                .child_by_field_name("module_name")
                .and_then(|module| import_source(module, source, base));
            let Some(from) = from else {
                return Vec::new();
            };
            names
                .into_iter()
                .map(|item| {
                    let (name, alias) = aliased(item, source);
                    ImportBinding {
                        local: alias.map_or_else(|| name.clone(), str::to_string),
                        target: ident::join(&from, &name),
                    }
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Absolute module of a `from ... import` statement.
fn import_source(module: Node, source: &str, base: Option<ImportBase<'_>>) -> Option<String> {
    if module.kind() != "relative_import" {
        return Some(dotted(module, source));
    }
    let base = base?;
    let mut level = 0;
    let mut path = String::new();
    let mut cursor = module.walk();
    for child in module.named_children(&mut cursor) {
        match child.kind() {
            "import_prefix" => level = text(child, source).matches('.').count(),
            "dotted_name" => path = dotted(child, source),
            _ => {}
        }
    }
    base.resolve(level, &path)
}

/// `name` or `name as alias`.
fn aliased<'s>(node: Node, source: &'s str) -> (String, Option<&'s str>) {
    if node.kind() != "aliased_import" {
        return (dotted(node, source), None);
    }
    let name = node
        .child_by_field_name("name")
        .map(|n| dotted(n, source))
        .unwrap_or_default();
    let alias = node.child_by_field_name("alias").map(|n| text(n, source));
    (name, alias)
}

/// A `dotted_name` without the whitespace Python tolerates around dots.
fn dotted(node: Node, source: &str) -> String {
    if node.kind() != "dotted_name" {
        return text(node, source).to_string();
    }
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .map(|n| text(n, source))
        .collect::<Vec<_>>()
        .join(".")
}

fn text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn line(node: Node) -> usize {
    node.start_position().row + 1
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

// ============================================================================
// Snippets
// ============================================================================

/// A documentation code block, parsed.
///
/// Interactive sessions (`>>> ` / `... ` prompts) are parsed without their
/// prompts and output lines. Line structure is kept, so every offset into
/// [`Snippet::text`] maps back to the block through [`Snippet::original`].
pub struct Snippet {
    text: String,
    /// Start of each line in `text` and the bytes removed before that point.
    shifts: Vec<(usize, usize)>,
    tree: Option<Tree>,
}

impl Snippet {
    pub fn new(code: &str) -> Self {
        let session = code.lines().any(|line| prompt_len(line).is_some());
        let mut text = String::with_capacity(code.len());
        let mut shifts = Vec::new();
        let mut removed = 0;

        for line in code.split_inclusive('\n') {
            let kept = match (session, prompt_len(line)) {
                (false, _) => line,
                (true, Some(prompt)) => &line[prompt..],
                // output of the previous prompt
                (true, None) => &line[line.trim_end_matches(['\r', '\n']).len()..],
            };
            let cut = line.len() - kept.len();
            shifts.push((text.len(), removed + cut));
            text.push_str(kept);
            removed += cut;
        }

        let tree = parse(&text);
        Self { text, shifts, tree }
    }

    /// The parsed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Option<Node<'_>> {
        self.tree.as_ref().map(Tree::root_node)
    }

    /// Map a range of [`Snippet::text`] back onto the original block.
    pub fn original(&self, range: Range<usize>) -> Range<usize> {
        let line = self
            .shifts
            .partition_point(|&(start, _)| start <= range.start)
            .saturating_sub(1);
        let shift = self.shifts.get(line).map_or(0, |&(_, shift)| shift);
        range.start + shift..range.end + shift
    }

    /// Import bindings anywhere in the snippet. Relative imports have no
    /// anchor here and are ignored.
    pub fn imports(&self) -> Vec<ImportBinding> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            snippet_imports(root, &self.text, &mut out);
        }
        out
    }
}

fn snippet_imports(node: Node, source: &str, out: &mut Vec<ImportBinding>) {
    match node.kind() {
        "import_statement" | "import_from_statement" => {
            out.extend(import_bindings(node, source, None));
        }
        "string" | "comment" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                snippet_imports(child, source, out);
            }
        }
    }
}

/// Length of an interactive prompt at the start of `line`.
fn prompt_len(line: &str) -> Option<usize> {
    [">>>", "..."].into_iter().find_map(|prompt| {
        let rest = line.strip_prefix(prompt)?;
        if rest.starts_with(' ') {
            Some(prompt.len() + 1)
        } else if rest.trim_end_matches(['\r', '\n']).is_empty() {
            Some(prompt.len())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATH: &str = r#""""Math helpers.

def not_real(): pass
"""

from __future__ import annotations

import numpy as np
from typing import (
    Iterable,
    Sequence as Seq,
)

PRECISION: int = 6
_cache = {}


def add(a: float, b: float) -> float:
    """Add two numbers."""
    def inner():
        pass
    return a + b


@decorator
async def scale_values(values, factor=2):
    return [v * factor for v in values]


class MovingAverage:
    """Rolling mean."""

    window = 3

    def __init__(self, window: int) -> None:
        self.window = window

    def update(self, value):
        # def fake(self):
        return value

    def as_dict(self):
        return {"window": self.window}
"#;

    fn base() -> ImportBase<'static> {
        ImportBase {
            module: "pkg.math",
            is_package: false,
        }
    }

    fn names(definitions: &[Definition]) -> Vec<&str> {
        definitions.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_top_level_definitions() {
        let symbols = parse_module(MATH, base());
        assert_eq!(
            names(&symbols.definitions),
            vec!["PRECISION", "_cache", "add", "scale_values", "MovingAverage"]
        );
        assert_eq!(symbols.definition("add").unwrap().line, 18);
        assert_eq!(symbols.definition("scale_values").unwrap().line, 26);
        assert_eq!(symbols.definition("MovingAverage").unwrap().kind, DefKind::Class);
    }

    #[test]
    fn test_class_members() {
        let symbols = parse_module(MATH, base());
        let class = symbols.definition("MovingAverage").unwrap();
        assert_eq!(names(&class.members), vec!["window", "__init__", "update", "as_dict"]);
        assert_eq!(class.line, 30);
        assert_eq!(class.member("update").unwrap().line, 38);
    }

    #[test]
    fn test_tuple_and_chained_assignments() {
        let source = "WIDTH, HEIGHT = 3, 4\n(LOW, *REST) = range(3)\nA = B = 0\nobj.attr = 1\nitems[0] = 2\n";
        let symbols = parse_module(source, base());
        assert_eq!(
            names(&symbols.definitions),
            vec!["WIDTH", "HEIGHT", "LOW", "REST", "A", "B"]
        );
        assert_eq!(symbols.definition("HEIGHT").unwrap().line, 1);
        assert_eq!(symbols.definition("B").unwrap().line, 3);
    }

    #[test]
    fn test_nested_classes() {
        let source = "class Outer:\n    class Inner:\n        LIMIT = 2\n\n        def method(self):\n            class Local:\n                pass\n";
        let symbols = parse_module(source, base());
        let outer = symbols.definition("Outer").unwrap();
        let inner = outer.member("Inner").unwrap();
        assert_eq!(inner.kind, DefKind::Class);
        assert_eq!(inner.line, 2);
        assert_eq!(names(&inner.members), vec!["LIMIT", "method"]);
        assert_eq!(inner.member("method").unwrap().line, 5);
        assert!(inner.member("method").unwrap().members.is_empty());
    }

    #[test]
    fn test_conditional_definitions() {
        let source = "try:\n    import ujson as json\nexcept ImportError:\n    import json\n\nif TYPE_CHECKING:\n    Alias = int\nelse:\n    def fallback():\n        pass\n";
        let symbols = parse_module(source, base());
        assert_eq!(symbols.import("json").unwrap().target, "json");
        assert_eq!(symbols.imports.len(), 2);
        assert_eq!(names(&symbols.definitions), vec!["Alias", "fallback"]);
        assert_eq!(symbols.definition("fallback").unwrap().line, 9);
    }

    #[test]
    fn test_imports() {
        let symbols = parse_module(MATH, base());
        assert_eq!(symbols.import("np").unwrap().target, "numpy");
        assert_eq!(symbols.import("Iterable").unwrap().target, "typing.Iterable");
        assert_eq!(symbols.import("Seq").unwrap().target, "typing.Sequence");
        assert!(symbols.import("Sequence").is_none());
        assert!(symbols.import("annotations").is_none());
    }

    #[test]
    fn test_package_relative_imports() {
        let source = "from .math import add, MovingAverage\nfrom . import math\n__all__ = [\n    'add',\n    \"MovingAverage\",\n]\n__all__ += ('math',)\n";
        let symbols = parse_module(
            source,
            ImportBase {
                module: "pkg",
                is_package: true,
            },
        );
        assert_eq!(symbols.import("add").unwrap().target, "pkg.math.add");
        assert_eq!(symbols.import("math").unwrap().target, "pkg.math");
        assert_eq!(symbols.public_names(), vec!["add", "MovingAverage", "math"]);
    }

    #[test]
    fn test_module_relative_imports() {
        let source = "from .helpers import clamp\nfrom ..other import thing\nfrom . import *\n";
        let symbols = parse_module(
            source,
            ImportBase {
                module: "pkg.sub.mod",
                is_package: false,
            },
        );
        assert_eq!(symbols.import("clamp").unwrap().target, "pkg.sub.helpers.clamp");
        assert_eq!(symbols.import("thing").unwrap().target, "pkg.other.thing");
        assert_eq!(symbols.imports.len(), 2);
    }

    #[test]
    fn test_relative_import_beyond_top() {
        let symbols = parse_module(
            "from ... import x\n",
            ImportBase {
                module: "pkg",
                is_package: true,
            },
        );
        assert!(symbols.imports.is_empty());
    }

    #[test]
    fn test_public_names_without_all() {
        let symbols = parse_module(MATH, base());
        assert_eq!(
            symbols.public_names(),
            vec!["PRECISION", "add", "scale_values", "MovingAverage"]
        );
    }

    #[test]
    fn test_snippet_imports() {
        let snippet = Snippet::new(
            "import pkg.math\nfrom pkg.math import MovingAverage as MA, add\nfrom .x import y\nprint('import os')\n\ndef f():\n    import numpy as np\n",
        );
        let pairs: Vec<_> = snippet
            .imports()
            .into_iter()
            .map(|b| (b.local, b.target))
            .collect();
        let pairs: Vec<_> = pairs.iter().map(|(l, t)| (l.as_str(), t.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("pkg", "pkg"),
                ("MA", "pkg.math.MovingAverage"),
                ("add", "pkg.math.add"),
                ("np", "numpy"),
            ]
        );
    }

    #[test]
    fn test_session_offsets() {
        let code = ">>> import pkg\n>>> pkg.add(1,\n...         2)\n3\n";
        let snippet = Snippet::new(code);
        assert_eq!(snippet.text(), "import pkg\npkg.add(1,\n        2)\n\n");

        let at = snippet.text().find("pkg.add").unwrap();
        let range = snippet.original(at..at + 7);
        assert_eq!(&code[range], "pkg.add");
        assert_eq!(snippet.imports().len(), 1);
    }

    #[test]
    fn test_plain_snippet_keeps_text() {
        let code = "x = ...\nprint(x)\n";
        let snippet = Snippet::new(code);
        assert_eq!(snippet.text(), code);
        assert_eq!(snippet.original(4..7), 4..7);
    }
}
