//! Typed node attributes
//!
//! Attributes are a tagged union over the small fixed set of kinds the
//! imported format provides.

use indexmap::IndexMap;

/// Attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Integer scalar (`axis`, `broadcast`, `group`)
    Int(i64),
    /// Float scalar (`epsilon`, `ratio`)
    Float(f32),
    /// Integer list (`shape`, `perm`, `kernel_shape`, `strides`, `pads`, `dilations`)
    Ints(Vec<i64>),
    /// Float list
    Floats(Vec<f32>),
    /// String
    String(String),
}

impl AttrValue {
    /// Kind name, used in typed accessor errors
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Ints(_) => "ints",
            AttrValue::Floats(_) => "floats",
            AttrValue::String(_) => "string",
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(v: Vec<i64>) -> Self {
        AttrValue::Ints(v)
    }
}

impl From<&[i64]> for AttrValue {
    fn from(v: &[i64]) -> Self {
        AttrValue::Ints(v.to_vec())
    }
}

impl From<Vec<f32>> for AttrValue {
    fn from(v: Vec<f32>) -> Self {
        AttrValue::Floats(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

/// Attribute map: name → value (insertion order preserved)
pub type Attributes = IndexMap<String, AttrValue>;
