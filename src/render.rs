//! Interface rendering.
//!
//! Turns a [`NamespaceTree`] into the nested `interface` text block embedded
//! in a declaration file. Output is deterministic: sibling order is insertion
//! order and is never re-sorted.

use std::sync::Arc;

/// One indentation level of rendered output.
pub const INDENT_UNIT: &str = "  ";

/// Nested property tree mirroring a watch directory's structure.
///
/// Built fresh per generation pass from the full file list; a collision on a
/// property path is resolved by last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceTree {
    entries: Vec<(String, NamespaceNode)>,
}

/// A tree entry: either a generated module identifier or a nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceNode {
    /// Rendered `name: value;`
    Leaf(String),
    /// Rendered `name: { ... }`
    Branch(NamespaceTree),
}

impl NamespaceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `leaf` at the property path `props`. Inserting over an
    /// existing leaf or subtree replaces it.
    pub fn insert(&mut self, props: &[String], leaf: &str) {
        let Some((head, tail)) = props.split_first() else {
            return;
        };
        if tail.is_empty() {
            self.put(head, NamespaceNode::Leaf(leaf.to_string()));
            return;
        }
        if !matches!(self.get_mut(head), Some(NamespaceNode::Branch(_))) {
            self.put(head, NamespaceNode::Branch(NamespaceTree::new()));
        }
        if let Some(NamespaceNode::Branch(sub)) = self.get_mut(head) {
            sub.insert(tail, leaf);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamespaceNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn put(&mut self, key: &str, node: NamespaceNode) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = node;
        } else {
            self.entries.push((key.to_string(), node));
        }
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut NamespaceNode> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Per-leaf post-processing applied while rendering, e.g. wrapping the
/// module identifier in a generic.
#[derive(Clone)]
pub enum LeafHandle {
    /// Template with `{{ 0 }}` placeholders substituted with the leaf value.
    Template(String),
    /// Arbitrary transform.
    Func(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl LeafHandle {
    pub fn apply(&self, value: &str) -> String {
        match self {
            LeafHandle::Template(template) => expand_template(template, &[value]),
            LeafHandle::Func(f) => f(value),
        }
    }
}

impl std::fmt::Debug for LeafHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeafHandle::Template(t) => f.debug_tuple("Template").field(t).finish(),
            LeafHandle::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Substitutes `{{ <index> }}` placeholders with positional arguments.
/// Placeholders with no matching argument are kept verbatim.
fn expand_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        match after[..end].trim().parse::<usize>().ok().and_then(|i| args.get(i)) {
            Some(arg) => out.push_str(arg),
            None => {
                out.push_str("{{");
                out.push_str(&after[..end]);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Renders a namespace tree as interface members.
///
/// Leaves render as `name: value;`, branches as `name: { ... }` with one
/// more [`INDENT_UNIT`] per level. With `wrap` the whole block is wrapped in
/// `interface <wrap> { ... }`. `indent` is the prefix of the outermost lines.
pub fn compose_interface(
    tree: &NamespaceTree,
    wrap: Option<&str>,
    handle: Option<&LeafHandle>,
    indent: &str,
) -> String {
    let mut prev = String::new();
    let mut after = String::new();
    let mut inner = indent.to_string();
    if let Some(name) = wrap {
        prev = format!("{indent}interface {name} {{\n");
        after = format!("{indent}}}\n");
        inner.push_str(INDENT_UNIT);
    }
    let mut mid = String::new();
    for (key, node) in tree.iter() {
        match node {
            NamespaceNode::Leaf(value) => {
                let value = match handle {
                    Some(h) => h.apply(value),
                    None => value.clone(),
                };
                mid.push_str(&format!("{inner}{key}: {value};\n"));
            }
            NamespaceNode::Branch(sub) => {
                let nested =
                    compose_interface(sub, None, handle, &format!("{inner}{INDENT_UNIT}"));
                if !nested.is_empty() {
                    mid.push_str(&format!("{inner}{key}: {{\n{nested}{inner}}}\n"));
                }
            }
        }
    }
    format!("{prev}{mid}{after}")
}

/// Renders a flat key sequence as a single-chain interface block: the
/// sequence is folded right to left, so `[a, b, c]` renders as the tree
/// `{ a: { b: c } }` would.
pub fn compose_chain(keys: &[String], wrap: Option<&str>, indent: &str) -> String {
    let mut tree = NamespaceTree::new();
    if let Some((leaf, path)) = keys.split_last() {
        tree.insert(path, leaf);
    }
    compose_interface(&tree, wrap, None, indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> NamespaceTree {
        let mut tree = NamespaceTree::new();
        tree.insert(&["a".into(), "b".into()], "ExportB");
        tree.insert(&["c".into()], "ExportC");
        tree
    }

    #[test]
    fn test_compose_interface_nested() {
        let rendered = compose_interface(&sample_tree(), Some("T"), None, "");
        assert_eq!(
            rendered,
            "interface T {\n  a: {\n    b: ExportB;\n  }\n  c: ExportC;\n}\n"
        );
    }

    #[test]
    fn test_compose_interface_leaf_handle() {
        let mut tree = NamespaceTree::new();
        tree.insert(&["foo".into()], "ExportFoo");
        let handle = LeafHandle::Template("ReturnType<typeof {{ 0 }}>".to_string());
        let rendered = compose_interface(&tree, Some("T"), Some(&handle), "");
        assert_eq!(
            rendered,
            "interface T {\n  foo: ReturnType<typeof ExportFoo>;\n}\n"
        );
    }

    #[test]
    fn test_compose_interface_insertion_order_is_stable() {
        let mut tree = NamespaceTree::new();
        tree.insert(&["z".into()], "Z");
        tree.insert(&["a".into()], "A");
        let rendered = compose_interface(&tree, None, None, "");
        assert_eq!(rendered, "z: Z;\na: A;\n");
    }

    #[test]
    fn test_insert_last_write_wins() {
        let mut tree = NamespaceTree::new();
        tree.insert(&["a".into()], "First");
        tree.insert(&["a".into()], "Second");
        assert_eq!(compose_interface(&tree, None, None, ""), "a: Second;\n");

        // a deeper path replaces an existing leaf with a branch
        let mut tree = NamespaceTree::new();
        tree.insert(&["a".into()], "Leaf");
        tree.insert(&["a".into(), "b".into()], "Deep");
        assert_eq!(
            compose_interface(&tree, None, None, ""),
            "a: {\n  b: Deep;\n}\n"
        );
    }

    #[test]
    fn test_compose_chain_fold() {
        let keys: Vec<String> = vec!["foo".into(), "bar".into(), "T".into()];
        let rendered = compose_chain(&keys, Some("app"), "");
        assert_eq!(
            rendered,
            "interface app {\n  foo: {\n    bar: T;\n  }\n}\n"
        );
    }

    #[test]
    fn test_compose_chain_two_keys() {
        let keys: Vec<String> = vec!["foo".into(), "T".into()];
        assert_eq!(
            compose_chain(&keys, Some("app"), "  "),
            "  interface app {\n    foo: T;\n  }\n"
        );
    }

    #[test]
    fn test_expand_template_unknown_index_kept() {
        assert_eq!(expand_template("x {{ 1 }} y", &["a"]), "x {{ 1 }} y");
        assert_eq!(expand_template("{{0}}!", &["a"]), "a!");
    }
}
