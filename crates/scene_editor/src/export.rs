//! Text scene export
//!
//! One stanza per editable node, in pre-order:
//!
//! ```text
//!
//! @MeshNode Cube
//! $material "metal"
//! $pos 0 1 0
//! ```
//!
//! Attributes at their schema default and the name attribute are omitted.
//! Non-editable nodes produce no stanza, but their descendants are visited.

use std::fmt::Write as _;
use std::path::Path;

use scene_graph::{NodeId, SceneGraph};
use scene_schema::{AttributeValue, NAME_ATTRIBUTE};

use crate::atomic::write_atomic;
use crate::error::PersistenceError;

/// Render the subtree at `root` in the text export format
pub fn export_text(graph: &SceneGraph, root: NodeId) -> String {
    let mut out = String::new();
    for id in graph.subtree(root) {
        if !graph.is_editable(id) {
            continue;
        }
        let Ok(node_type) = graph.node_type(id) else {
            continue;
        };
        let Some(name) = graph.name(id) else {
            continue;
        };

        // Writing into a String cannot fail
        let _ = write!(out, "\n@{} {}\n", node_type.short_name(), name);

        let Ok(values) = graph.attributes(id) else {
            continue;
        };
        for (def, (attribute, value)) in node_type.attributes().iter().zip(values) {
            if attribute == NAME_ATTRIBUTE || def.is_default(value) {
                continue;
            }
            let _ = writeln!(out, "${} {}", attribute, format_value(value));
        }
    }
    out
}

/// Write the text export of `root` to `path`
pub fn write_text(graph: &SceneGraph, root: NodeId, path: &Path) -> Result<(), PersistenceError> {
    write_atomic(path, export_text(graph, root).as_bytes())
}

fn format_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s) => quote(s),
        other => other.to_text(),
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::SceneTree;

    fn scene() -> SceneTree {
        SceneTree::new(scene_schema::builtin(), "Scene").unwrap()
    }

    #[test]
    fn test_export_skips_defaults() {
        let mut tree = scene();
        let cube = tree.graph.create_node_by_name("MeshNode").unwrap();
        tree.graph.set_attribute(cube, "name", "Cube").unwrap();
        tree.graph.set_attribute(cube, "material", "metal").unwrap();
        tree.graph.append_child(tree.root, cube).unwrap();

        assert_eq!(export_text(&tree.graph, tree.root), "\n@MeshNode Cube\n$material \"metal\"\n");
    }

    #[test]
    fn test_export_kinds_and_order() {
        let mut tree = scene();
        let parent = tree.graph.create_node_by_name("LocatorNode").unwrap();
        tree.graph.set_attribute(parent, "name", "Pivot").unwrap();
        tree.graph.set_attribute(parent, "pos", vec![0.0f32, 1.5, -2.0]).unwrap();
        let child = tree.graph.create_node_by_name("MeshNode").unwrap();
        tree.graph.set_attribute(child, "name", "Wheel").unwrap();
        tree.graph.set_attribute(child, "cast_shadows", false).unwrap();
        tree.graph.set_attribute(child, "lod", 2).unwrap();
        tree.graph.append_child(parent, child).unwrap();
        tree.graph.append_child(tree.root, parent).unwrap();

        let text = export_text(&tree.graph, tree.root);
        assert_eq!(
            text,
            "\n@LocatorNode Pivot\n$pos 0 1.5 -2\n\n@MeshNode Wheel\n$cast_shadows false\n$lod 2\n"
        );
    }

    #[test]
    fn test_export_skips_root() {
        let tree = scene();
        assert_eq!(export_text(&tree.graph, tree.root), "");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a "b" \c"#), r#""a \"b\" \\c""#);
        assert_eq!(quote("two\nlines"), "\"two\\nlines\"");
    }
}
