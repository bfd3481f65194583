//! Frozen node type hierarchy
//!
//! Built once by the loader and shared behind an `Arc` for the lifetime of
//! the process. Types are stored in declaration order and addressed by
//! [`NodeTypeId`].

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use crate::value::{AttributeKind, AttributeValue};

/// Name of the designated name attribute
pub const NAME_ATTRIBUTE: &str = "name";

/// Index of a type inside its hierarchy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeTypeId(pub(crate) u32);

impl NodeTypeId {
    /// Position in declaration order
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A named, typed, defaulted attribute
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDef {
    name: String,
    kind: AttributeKind,
    default: AttributeValue,
}

impl AttributeDef {
    pub(crate) fn new(name: impl Into<String>, kind: AttributeKind, default: AttributeValue) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn default_value(&self) -> &AttributeValue {
        &self.default
    }

    /// Whether `value` is the declared default (and would be omitted on export)
    pub fn is_default(&self, value: &AttributeValue) -> bool {
        &self.default == value
    }
}

/// An ordered collection of children of a declared base type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildSlot {
    name: String,
    base: NodeTypeId,
}

impl ChildSlot {
    pub(crate) fn new(name: impl Into<String>, base: NodeTypeId) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }

    /// Slot name; also the XML element name of its children
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type every child must be equal to or derived from
    pub fn base(&self) -> NodeTypeId {
        self.base
    }
}

/// A node type with its effective (inherited + own) attributes and slot
#[derive(Clone, Debug)]
pub struct NodeType {
    id: NodeTypeId,
    name: String,
    short_name: String,
    base: Option<NodeTypeId>,
    attributes: Vec<AttributeDef>,
    child_slot: Option<ChildSlot>,
}

impl NodeType {
    pub(crate) fn new(
        id: NodeTypeId,
        namespace: &str,
        short_name: &str,
        base: Option<NodeTypeId>,
        attributes: Vec<AttributeDef>,
    ) -> Self {
        Self {
            id,
            name: format!("{}:{}", namespace, short_name),
            short_name: short_name.to_string(),
            base,
            attributes,
            child_slot: None,
        }
    }

    pub(crate) fn set_child_slot(&mut self, slot: ChildSlot) {
        self.child_slot = Some(slot);
    }

    pub fn id(&self) -> NodeTypeId {
        self.id
    }

    /// Namespace-qualified name (`bitBox:MeshNode`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with the namespace prefix stripped (`MeshNode`)
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn base(&self) -> Option<NodeTypeId> {
        self.base
    }

    /// Effective attributes, base type's first
    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Position of an attribute; stable across derived types
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// The designated name attribute, if the type has a string one
    pub fn name_attribute(&self) -> Option<&AttributeDef> {
        self.attribute(NAME_ATTRIBUTE)
            .filter(|a| a.kind == AttributeKind::String)
    }

    pub fn child_slot(&self) -> Option<&ChildSlot> {
        self.child_slot.as_ref()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The static type hierarchy produced by loading a schema
#[derive(Debug)]
pub struct TypeHierarchy {
    namespace: String,
    root_element: String,
    types: Vec<NodeType>,
    by_name: HashMap<String, NodeTypeId>,
    root_type: NodeTypeId,
    editable_type: NodeTypeId,
}

impl TypeHierarchy {
    pub(crate) fn new(
        namespace: String,
        root_element: String,
        types: Vec<NodeType>,
        root_type: NodeTypeId,
        editable_type: NodeTypeId,
    ) -> Self {
        let mut by_name = HashMap::with_capacity(types.len() * 2);
        for ty in &types {
            by_name.insert(ty.name.clone(), ty.id);
            by_name.insert(ty.short_name.clone(), ty.id);
        }

        Self {
            namespace,
            root_element,
            types,
            by_name,
            root_type,
            editable_type,
        }
    }

    /// Target namespace of the schema
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Element name of the scene root in XML files
    pub fn root_element(&self) -> &str {
        &self.root_element
    }

    /// Type instantiated for a new document's root
    pub fn root_type(&self) -> NodeTypeId {
        self.root_type
    }

    /// Base of all editable (named, exported) node types
    pub fn editable_type(&self) -> NodeTypeId {
        self.editable_type
    }

    pub fn get(&self, id: NodeTypeId) -> Option<&NodeType> {
        self.types.get(id.index())
    }

    /// Look up a type by qualified or short name
    pub fn find(&self, name: &str) -> Option<&NodeType> {
        self.by_name.get(name).map(|id| &self[*id])
    }

    /// All declared types in declaration order
    pub fn types(&self) -> impl Iterator<Item = &NodeType> + Clone {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True if `ty` is `base` or inherits from it
    pub fn is_derived_from(&self, ty: NodeTypeId, base: NodeTypeId) -> bool {
        let mut current = Some(ty);
        while let Some(id) = current {
            if id == base {
                return true;
            }
            current = self.get(id).and_then(|t| t.base);
        }
        false
    }

    /// True if instances of `ty` take part in naming and export
    pub fn is_editable(&self, ty: NodeTypeId) -> bool {
        self.is_derived_from(ty, self.editable_type)
    }

    /// Types equal to or derived from `base`, in declaration order.
    ///
    /// The iterator is lazy and can be cloned to restart the walk.
    pub fn types_derived_from(
        &self,
        base: NodeTypeId,
    ) -> impl Iterator<Item = &NodeType> + Clone + '_ {
        self.types
            .iter()
            .filter(move |ty| self.is_derived_from(ty.id, base))
    }
}

impl Index<NodeTypeId> for TypeHierarchy {
    type Output = NodeType;

    fn index(&self, id: NodeTypeId) -> &NodeType {
        &self.types[id.index()]
    }
}
