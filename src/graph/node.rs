//! Operator nodes and declared graph values

use indexmap::IndexMap;

use crate::error::{GraphResult, TransformError};
use crate::tensor::Tensor;

use super::attr::{AttrValue, Attributes};

/// One operator instance
///
/// `tensors` holds the literal (initializer) values of inputs that are not
/// produced by another node, keyed by edge name.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique node name
    pub name: String,
    /// Operator kind (`Conv`, `Add`, `Reshape`, ...)
    pub op_type: String,
    /// Typed attributes
    pub attrs: Attributes,
    /// Positional input edge names
    pub inputs: Vec<String>,
    /// Positional output edge names
    pub outputs: Vec<String>,
    /// Literal input values: edge name → tensor
    pub tensors: IndexMap<String, Tensor>,
}

impl Node {
    /// Create a node without attributes or literals
    pub fn new(op_type: &str, name: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            op_type: op_type.to_string(),
            attrs: Attributes::new(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            tensors: IndexMap::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: attach a literal tensor
    pub fn with_tensor(mut self, edge: &str, tensor: Tensor) -> Self {
        self.tensors.insert(edge.to_string(), tensor);
        self
    }

    // ========================================================================
    // Attribute accessors
    // ========================================================================

    /// Get a raw attribute value
    pub fn attr(&self, name: &str) -> GraphResult<&AttrValue> {
        self.attrs
            .get(name)
            .ok_or_else(|| TransformError::AttributeNotFound {
                node: self.name.clone(),
                attr: name.to_string(),
            })
    }

    /// Get attribute value as i64
    pub fn attr_int(&self, name: &str) -> GraphResult<i64> {
        match self.attr(name)? {
            AttrValue::Int(v) => Ok(*v),
            other => Err(self.kind_error(name, "int", other)),
        }
    }

    /// Get attribute value as f32
    pub fn attr_float(&self, name: &str) -> GraphResult<f32> {
        match self.attr(name)? {
            AttrValue::Float(v) => Ok(*v),
            other => Err(self.kind_error(name, "float", other)),
        }
    }

    /// Get attribute value as i64 list
    pub fn attr_ints(&self, name: &str) -> GraphResult<&[i64]> {
        match self.attr(name)? {
            AttrValue::Ints(v) => Ok(v.as_slice()),
            other => Err(self.kind_error(name, "ints", other)),
        }
    }

    /// Get attribute value as f32 list
    pub fn attr_floats(&self, name: &str) -> GraphResult<&[f32]> {
        match self.attr(name)? {
            AttrValue::Floats(v) => Ok(v.as_slice()),
            other => Err(self.kind_error(name, "floats", other)),
        }
    }

    /// Get attribute value as string
    pub fn attr_str(&self, name: &str) -> GraphResult<&str> {
        match self.attr(name)? {
            AttrValue::String(v) => Ok(v.as_str()),
            other => Err(self.kind_error(name, "string", other)),
        }
    }

    /// Check if node has attribute
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Set or update an attribute
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    fn kind_error(&self, name: &str, expected: &'static str, found: &AttrValue) -> TransformError {
        TransformError::AttributeType {
            node: self.name.clone(),
            attr: name.to_string(),
            expected,
            found: found.kind(),
        }
    }

    // ========================================================================
    // Literal accessors
    // ========================================================================

    /// Check if an edge is a literal owned by this node
    pub fn is_literal(&self, edge: &str) -> bool {
        self.tensors.contains_key(edge)
    }

    /// Literal value for the input at `index`, if that input is a literal
    pub fn literal_input(&self, index: usize) -> Option<&Tensor> {
        self.inputs.get(index).and_then(|e| self.tensors.get(e))
    }

    /// Literal value for the input at `index`, or a locatable error
    pub fn require_literal_input(&self, index: usize) -> GraphResult<&Tensor> {
        let edge = self.inputs.get(index).ok_or_else(|| {
            TransformError::InvalidNode(format!("{} has no input[{}]", self.name, index))
        })?;
        self.tensors
            .get(edge)
            .ok_or_else(|| TransformError::TensorNotFound {
                node: self.name.clone(),
                tensor: edge.clone(),
            })
    }
}

/// Create a node: `make_node(op_type, inputs, outputs, name)`
pub fn make_node(op_type: &str, inputs: &[&str], outputs: &[&str], name: &str) -> Node {
    Node::new(op_type, name, inputs, outputs)
}

/// Declared graph input or output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueInfo {
    /// Edge name
    pub name: String,
    /// Declared shape (`-1` for unknown dims)
    pub shape: Vec<i64>,
}

impl ValueInfo {
    /// Create a value info
    pub fn new(name: &str, shape: &[i64]) -> Self {
        Self {
            name: name.to_string(),
            shape: shape.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::vec_to_tensor_f32;

    #[test]
    fn test_typed_accessors() {
        let node = make_node("Add", &["X", "B"], &["Y"], "add_0")
            .with_attr("axis", 1i64)
            .with_attr("perm", vec![0i64, 2, 1]);

        assert_eq!(node.attr_int("axis").unwrap(), 1);
        assert_eq!(node.attr_ints("perm").unwrap(), &[0, 2, 1]);
    }

    #[test]
    fn test_missing_attribute_is_locatable() {
        let node = make_node("Add", &["X"], &["Y"], "add_0");
        assert_eq!(
            node.attr_int("broadcast").unwrap_err(),
            TransformError::AttributeNotFound {
                node: "add_0".to_string(),
                attr: "broadcast".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_kind() {
        let node = make_node("Reshape", &["X"], &["Y"], "r").with_attr("shape", 4i64);
        let err = node.attr_ints("shape").unwrap_err();
        assert!(matches!(
            err,
            TransformError::AttributeType { expected: "ints", found: "int", .. }
        ));
    }

    #[test]
    fn test_literal_input() {
        let node = make_node("Add", &["X", "B"], &["Y"], "add_0")
            .with_tensor("B", vec_to_tensor_f32(&[1.0]));

        assert!(node.literal_input(0).is_none());
        assert!(node.literal_input(1).is_some());
        assert!(node.is_literal("B"));
        assert!(matches!(
            node.require_literal_input(0),
            Err(TransformError::TensorNotFound { .. })
        ));
    }
}
