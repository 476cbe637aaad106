//! Identifier mentions inside a Python code block.
//!
//! Bare names are only expanded through the block's own import bindings:
//! a name the block never imported is not a mention. Module paths inside
//! import statements are skipped; names imported by `from m import a` point
//! at `m.a` directly.

use rustc_hash::FxHashMap;
use std::ops::Range;
use tree_sitter::Node;

use crate::core::ident;
use crate::package::python::Snippet;

/// A linkable name chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Byte range of the name chain in the block.
    pub range: Range<usize>,
    /// Fully-qualified identifier it refers to.
    pub identifier: String,
    /// End offset of each name in the chain.
    ends: Vec<usize>,
}

impl Mention {
    /// The chain without its last `dropped` names, and what that spells.
    ///
    /// ```text
    /// np.linalg.norm -> numpy.linalg.norm
    ///   dropped 1    -> np.linalg  / numpy.linalg
    ///   dropped 2    -> np         / numpy
    /// ```
    pub fn prefix(&self, dropped: usize) -> Option<(Range<usize>, &str)> {
        let last = self.ends.len().checked_sub(dropped + 1)?;
        let identifier = (0..dropped).try_fold(self.identifier.as_str(), |id, _| {
            id.rsplit_once('.').map(|(head, _)| head)
        })?;
        Some((self.range.start..self.ends[last], identifier))
    }
}

/// Find every mention in `code`, in source order.
pub fn code_mentions(code: &str) -> Vec<Mention> {
    let snippet = Snippet::new(code);
    let Some(root) = snippet.root() else {
        return Vec::new();
    };
    let bindings: FxHashMap<String, String> = snippet
        .imports()
        .into_iter()
        .map(|b| (b.local, b.target))
        .collect();

    let mut finder = Finder {
        snippet: &snippet,
        bindings,
        out: Vec::new(),
    };
    finder.visit(root);
    finder.out
}

struct Finder<'s> {
    snippet: &'s Snippet,
    bindings: FxHashMap<String, String>,
    out: Vec<Mention>,
}

impl<'s> Finder<'s> {
    fn visit(&mut self, node: Node) {
        match node.kind() {
            "string" | "comment" | "import_statement" | "future_import_statement" => {}
            "import_from_statement" => self.from_import(node),
            "identifier" | "attribute" => {
                let mut chain = Vec::new();
                if name_chain(node, &mut chain) {
                    self.chain(node, &chain);
                } else if let Some(object) = node.child_by_field_name("object") {
                    // `f().name`: only the call can mention anything
                    self.visit(object);
                }
            }
            "keyword_argument" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.visit(value);
                }
            }
            _ => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                for child in children {
                    self.visit(child);
                }
            }
        }
    }

    /// `from m import a, b as c`: `a`, `b` and `c` all mention `m.*`.
    fn from_import(&mut self, node: Node) {
        let text: &'s str = self.snippet.text();
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };
        if module.kind() != "dotted_name" {
            return;
        }
        let module = dotted_text(module, text);

        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for item in names {
            let (name, alias) = match item.kind() {
                "aliased_import" => (
                    item.child_by_field_name("name"),
                    item.child_by_field_name("alias"),
                ),
                _ => (Some(item), None),
            };
            let Some(name) = name else {
                continue;
            };
            let identifier = ident::join(&module, &dotted_text(name, text));
            for spelled in std::iter::once(name).chain(alias) {
                self.push(spelled.byte_range(), identifier.clone(), &[spelled]);
            }
        }
    }

    /// A bare name or attribute chain whose head is an import binding.
    fn chain(&mut self, node: Node, names: &[Node]) {
        let text: &'s str = self.snippet.text();
        let Some((head, tail)) = names.split_first() else {
            return;
        };
        let Some(target) = self.bindings.get(&text[head.byte_range()]) else {
            return;
        };
        let tail: Vec<&str> = tail.iter().map(|n| &text[n.byte_range()]).collect();
        let identifier = ident::join(target, &tail.join("."));
        self.push(node.byte_range(), identifier, names);
    }

    fn push(&mut self, range: Range<usize>, identifier: String, names: &[Node]) {
        let ends = names
            .iter()
            .map(|n| self.snippet.original(n.byte_range()).end)
            .collect();
        self.out.push(Mention {
            range: self.snippet.original(range),
            identifier,
            ends,
        });
    }
}

/// Collect the names of `a.b.c`. False when the chain hangs off anything
/// other than a plain name.
fn name_chain<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) -> bool {
    match node.kind() {
        "identifier" => {
            out.push(node);
            true
        }
        "attribute" => {
            let (Some(object), Some(attribute)) = (
                node.child_by_field_name("object"),
                node.child_by_field_name("attribute"),
            ) else {
                return false;
            };
            if !name_chain(object, out) {
                return false;
            }
            out.push(attribute);
            true
        }
        _ => false,
    }
}

fn dotted_text(node: Node, source: &str) -> String {
    source[node.byte_range()]
        .split('.')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(code: &str) -> Vec<(&str, String)> {
        code_mentions(code)
            .into_iter()
            .map(|m| (&code[m.range], m.identifier))
            .collect()
    }

    #[test]
    fn test_from_import_names() {
        let code = "from pkg.math import MovingAverage, add as plus\n\nma = MovingAverage(3)\nplus(1, 2)\n";
        assert_eq!(
            found(code),
            vec![
                ("MovingAverage", "pkg.math.MovingAverage".to_string()),
                ("add", "pkg.math.add".to_string()),
                ("plus", "pkg.math.add".to_string()),
                ("MovingAverage", "pkg.math.MovingAverage".to_string()),
                ("plus", "pkg.math.add".to_string()),
            ]
        );
    }

    #[test]
    fn test_module_import_expansion() {
        let code = "import pkg.math\nimport numpy as np\n\npkg.math.scale_values([1])\nnp.array([])\n";
        assert_eq!(
            found(code),
            vec![
                ("pkg.math.scale_values", "pkg.math.scale_values".to_string()),
                ("np.array", "numpy.array".to_string()),
            ]
        );
    }

    #[test]
    fn test_unbound_names_are_skipped() {
        let code = "x = MovingAverage(3)\nx.update(1)\n";
        assert!(found(code).is_empty());
    }

    #[test]
    fn test_strings_and_comments() {
        let code = "from pkg import add\n# add(1)\ns = \"add\"\nt = f'{add}'\ndoc = \"\"\"\nadd\n\"\"\"\nadd(1)\n";
        let mentions = found(code);
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[1].0, "add");
        assert_eq!(&code[code_mentions(code)[1].range.end..][..3], "(1)");
    }

    #[test]
    fn test_parenthesized_from_import() {
        let code = "from pkg.math import (\n    add,\n    MovingAverage,\n)\n";
        let idents: Vec<_> = found(code).into_iter().map(|(_, i)| i).collect();
        assert_eq!(idents, vec!["pkg.math.add", "pkg.math.MovingAverage"]);
    }

    #[test]
    fn test_relative_import_ignored() {
        let code = "from .math import add\nadd(1)\n";
        assert!(found(code).is_empty());
    }

    #[test]
    fn test_attribute_of_expression_skipped() {
        let code = "from pkg import math\nf().math\nmath.add\n";
        assert_eq!(
            found(code),
            vec![
                ("math", "pkg.math".to_string()),
                ("math.add", "pkg.math.add".to_string())
            ]
        );
    }

    #[test]
    fn test_keyword_names_skipped() {
        let code = "from pkg.math import add, scale_values\nscale_values(add=add)\n";
        let spans: Vec<_> = code_mentions(code).into_iter().map(|m| m.range.start).collect();
        let call = code.find("scale_values(").unwrap();
        let value = code.rfind("add").unwrap();
        assert_eq!(spans[2..], [call, value]);
    }

    #[test]
    fn test_pycon_prompts() {
        let code = ">>> from pkg.math import add\n>>> add(1, 2)\n3\n";
        let mentions = code_mentions(code);
        let idents: Vec<_> = mentions.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(idents, vec!["pkg.math.add", "pkg.math.add"]);
        assert_eq!(mentions[1].range, 33..36);
        assert_eq!(&code[mentions[1].range.clone()], "add");
    }

    #[test]
    fn test_chain_prefixes() {
        let code = "from pkg.math import MovingAverage\nMovingAverage.from_config({})\n";
        let mentions = code_mentions(code);
        let chain = &mentions[1];
        assert_eq!(chain.identifier, "pkg.math.MovingAverage.from_config");

        let (range, identifier) = chain.prefix(0).unwrap();
        assert_eq!(&code[range], "MovingAverage.from_config");
        assert_eq!(identifier, "pkg.math.MovingAverage.from_config");

        let (range, identifier) = chain.prefix(1).unwrap();
        assert_eq!(&code[range], "MovingAverage");
        assert_eq!(identifier, "pkg.math.MovingAverage");

        assert!(chain.prefix(2).is_none());
    }
}
