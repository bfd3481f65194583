//! Attribute kinds and values
//!
//! Every attribute declared by the schema has one of a fixed set of kinds.
//! Values carry their kind with them and know how to convert to and from
//! the canonical text form used by the XML codec and the text exporter.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValueParseError;

/// The value kind of an attribute definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// `true` / `false`
    #[serde(rename = "bool")]
    Bool,
    /// 32-bit signed integer
    #[serde(rename = "int32")]
    Int32,
    /// Single precision float
    #[serde(rename = "float")]
    Float,
    /// Array of single precision floats (positions, rotations, ...)
    #[serde(rename = "float-array")]
    FloatArray,
    /// UTF-8 string
    #[serde(rename = "string")]
    String,
}

impl AttributeKind {
    /// Schema spelling of the kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Float => "float",
            Self::FloatArray => "float-array",
            Self::String => "string",
        }
    }

    /// Value used when the schema declares no default
    pub fn zero(&self) -> AttributeValue {
        match self {
            Self::Bool => AttributeValue::Bool(false),
            Self::Int32 => AttributeValue::Int32(0),
            Self::Float => AttributeValue::Float(0.0),
            Self::FloatArray => AttributeValue::FloatArray(Vec::new()),
            Self::String => AttributeValue::String(String::new()),
        }
    }

    /// Parse the canonical text form of a value of this kind
    pub fn parse(&self, text: &str) -> Result<AttributeValue, ValueParseError> {
        let invalid = || ValueParseError {
            kind: *self,
            text: text.to_string(),
        };

        match self {
            Self::Bool => match text.trim() {
                "true" | "1" => Ok(AttributeValue::Bool(true)),
                "false" | "0" => Ok(AttributeValue::Bool(false)),
                _ => Err(invalid()),
            },
            Self::Int32 => text
                .trim()
                .parse()
                .map(AttributeValue::Int32)
                .map_err(|_| invalid()),
            Self::Float => text
                .trim()
                .parse()
                .map(AttributeValue::Float)
                .map_err(|_| invalid()),
            Self::FloatArray => text
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|part| !part.is_empty())
                .map(|part| part.parse::<f32>().map_err(|_| invalid()))
                .collect::<Result<Vec<_>, _>>()
                .map(AttributeValue::FloatArray),
            Self::String => Ok(AttributeValue::String(text.to_string())),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Int32(i32),
    Float(f32),
    FloatArray(Vec<f32>),
    String(String),
}

impl AttributeValue {
    /// Kind of this value
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Bool(_) => AttributeKind::Bool,
            Self::Int32(_) => AttributeKind::Int32,
            Self::Float(_) => AttributeKind::Float,
            Self::FloatArray(_) => AttributeKind::FloatArray,
            Self::String(_) => AttributeKind::String,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i32
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f32
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as float slice
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            Self::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical text form.
    ///
    /// Floats use the shortest representation that parses back to the same
    /// value, and array components are separated by a single space.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int32(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::FloatArray(v) => v
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            Self::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<f32>> for AttributeValue {
    fn from(v: Vec<f32>) -> Self {
        Self::FloatArray(v)
    }
}

impl From<[f32; 3]> for AttributeValue {
    fn from(v: [f32; 3]) -> Self {
        Self::FloatArray(v.to_vec())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}
