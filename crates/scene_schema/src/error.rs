//! Error types for schema loading

use thiserror::Error;

use crate::value::AttributeKind;

/// Failure to turn text into a value of a given kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{text}' is not a valid {kind} value")]
pub struct ValueParseError {
    pub kind: AttributeKind,
    pub text: String,
}

/// The schema source is malformed or cannot be resolved.
///
/// Fatal at startup: no document can be opened without a schema.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    /// Schema file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema source is not valid TOML or has the wrong shape
    #[error("Malformed schema: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two types share a name
    #[error("Type declared twice: {0}")]
    DuplicateType(String),

    /// Base type is missing or declared after the derived type
    #[error("Type '{node_type}' derives from unknown type '{base}'")]
    UnknownBaseType { node_type: String, base: String },

    /// Child slot refers to a type that does not exist
    #[error("Child slot '{slot}' of '{node_type}' refers to unknown type '{child}'")]
    UnknownChildType {
        node_type: String,
        slot: String,
        child: String,
    },

    /// Attribute declared twice along an inheritance chain
    #[error("Attribute '{attribute}' declared twice on '{node_type}'")]
    DuplicateAttribute { node_type: String, attribute: String },

    /// Type declares a slot while inheriting one
    #[error("Type '{0}' has more than one child slot")]
    MultipleChildSlots(String),

    /// Default text does not parse as the attribute's kind
    #[error("Invalid default for '{node_type}.{attribute}': {source}")]
    InvalidDefault {
        node_type: String,
        attribute: String,
        #[source]
        source: ValueParseError,
    },

    /// Root or editable-node type named by the header is not declared
    #[error("Schema {role} type '{name}' is not declared")]
    MissingType { role: &'static str, name: String },

    /// Root type must carry the designated name attribute
    #[error("Schema {role} type '{name}' has no string 'name' attribute")]
    MissingNameAttribute { role: &'static str, name: String },
}

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaLoadError>;
