//! XML scene files
//!
//! The document element is the schema's root element and holds the root
//! node. Children are written as elements named after their parent's child
//! slot; a child whose type is not the slot's base type carries an
//! `xsi:type` attribute with the short type name. Only attributes that
//! differ from their defaults are written.

use std::path::Path;
use std::sync::Arc;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use scene_graph::{NodeId, SceneGraph, SceneTree};
use scene_schema::{NodeTypeId, TypeHierarchy};

use crate::atomic::write_atomic;
use crate::error::PersistenceError;

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSI_TYPE: &str = "xsi:type";

type Result<T> = std::result::Result<T, PersistenceError>;

fn xml_error(e: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::Xml(e.to_string())
}

// =============================================================================
// Writing
// =============================================================================

/// Serialize the tree at `root`. An `indent` of zero writes a single line.
pub fn write_scene(graph: &SceneGraph, root: NodeId, indent: usize) -> Result<String> {
    let mut writer = if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;

    let schema = graph.schema();
    let mut element = BytesStart::new(schema.root_element());
    element.push_attribute(("xmlns", schema.namespace()));
    element.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    write_node(&mut writer, graph, root, element, None)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    graph: &SceneGraph,
    id: NodeId,
    mut element: BytesStart<'_>,
    slot_base: Option<NodeTypeId>,
) -> Result<()> {
    let node_type = graph.node_type(id)?;
    if slot_base.is_some_and(|base| base != node_type.id()) {
        element.push_attribute((XSI_TYPE, node_type.short_name()));
    }

    for (def, (name, value)) in node_type.attributes().iter().zip(graph.attributes(id)?) {
        if !def.is_default(value) {
            element.push_attribute((name, value.to_text().as_str()));
        }
    }

    let children = graph.children(id);
    let Some(slot) = node_type.child_slot().filter(|_| !children.is_empty()) else {
        return writer.write_event(Event::Empty(element)).map_err(xml_error);
    };

    let end = BytesEnd::new(String::from_utf8_lossy(element.name().as_ref()).into_owned());
    writer.write_event(Event::Start(element)).map_err(xml_error)?;
    for child in children {
        write_node(writer, graph, *child, BytesStart::new(slot.name()), Some(slot.base()))?;
    }
    writer.write_event(Event::End(end)).map_err(xml_error)
}

/// Write the tree at `root` to `path`, replacing it only on success
pub fn save_scene(graph: &SceneGraph, root: NodeId, path: &Path, indent: usize) -> Result<()> {
    let text = write_scene(graph, root, indent)?;
    write_atomic(path, text.as_bytes())
}

// =============================================================================
// Reading
// =============================================================================

/// Parse a scene document into a fresh tree
pub fn read_scene(schema: Arc<TypeHierarchy>, text: &str) -> Result<SceneTree> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut graph = SceneGraph::new(schema);
    let mut root = None;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                let id = read_element(&mut graph, &e, stack.last().copied(), root.is_some())?;
                root.get_or_insert(id);
                stack.push(id);
            }
            Event::Empty(e) => {
                let id = read_element(&mut graph, &e, stack.last().copied(), root.is_some())?;
                root.get_or_insert(id);
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(PersistenceError::Malformed("unclosed element".into()));
    }
    let root = root.ok_or_else(|| PersistenceError::Malformed("no root element".into()))?;
    Ok(SceneTree { graph, root })
}

/// Create the node for one element and attach it under `parent`
fn read_element(
    graph: &mut SceneGraph,
    element: &BytesStart<'_>,
    parent: Option<NodeId>,
    have_root: bool,
) -> Result<NodeId> {
    let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let attributes = element
        .attributes()
        .map(|a| a.map_err(xml_error).and_then(decode_attribute))
        .collect::<Result<Vec<(String, String)>>>()?;

    let schema = Arc::clone(graph.schema());
    let node_type = match parent {
        None if have_root => {
            return Err(PersistenceError::Malformed(format!("second root element <{}>", tag)));
        }
        None => {
            if tag != schema.root_element() {
                return Err(PersistenceError::Malformed(format!(
                    "expected <{}>, found <{}>",
                    schema.root_element(),
                    tag
                )));
            }
            schema.root_type()
        }
        Some(parent) => {
            let slot = graph
                .child_slot(parent)
                .filter(|slot| slot.name() == tag)
                .ok_or_else(|| PersistenceError::Malformed(format!("unexpected element <{}>", tag)))?;
            match attributes.iter().find(|(k, _)| k == XSI_TYPE) {
                Some((_, type_name)) => schema
                    .find(type_name)
                    .map(|t| t.id())
                    .ok_or_else(|| scene_graph::GraphError::UnknownType(type_name.clone()))?,
                None => slot.base(),
            }
        }
    };

    let id = graph.create_node(node_type)?;
    let ty = &schema[node_type];
    for (key, text) in &attributes {
        if key == "xmlns" || key.starts_with("xmlns:") || key == XSI_TYPE {
            continue;
        }
        let def = ty.attribute(key).ok_or_else(|| scene_graph::GraphError::UnknownAttribute {
            node_type: ty.name().to_string(),
            attribute: key.clone(),
        })?;
        let value = def
            .kind()
            .parse(text)
            .map_err(|e| PersistenceError::Malformed(format!("{}.{}: {}", ty.short_name(), key, e)))?;
        graph.set_attribute(id, key, value)?;
    }

    if let Some(parent) = parent {
        graph.append_child(parent, id)?;
    }
    Ok(id)
}

fn decode_attribute(attribute: Attribute<'_>) -> Result<(String, String)> {
    let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
    let value = attribute.unescape_value().map_err(xml_error)?.into_owned();
    Ok((key, value))
}

/// Read a scene file
pub fn load_scene(schema: Arc<TypeHierarchy>, path: &Path) -> Result<SceneTree> {
    let text = std::fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    let tree = read_scene(schema, &text)?;
    log::info!("Loaded {:?} ({} nodes)", path, tree.graph.len());
    Ok(tree)
}
