//! Error types for onnx-chain-opt
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Main error type for graph rewrite operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A node does not carry the requested attribute
    #[error("Attribute '{attr}' not found on node '{node}'")]
    AttributeNotFound {
        /// Node name
        node: String,
        /// Attribute name
        attr: String,
    },

    /// A node carries the attribute, but with a different value kind
    #[error("Attribute '{attr}' on node '{node}' is {found}, expected {expected}")]
    AttributeType {
        /// Node name
        node: String,
        /// Attribute name
        attr: String,
        /// Requested kind
        expected: &'static str,
        /// Stored kind
        found: &'static str,
    },

    /// A literal tensor input is missing from a node
    #[error("Literal tensor '{tensor}' not found on node '{node}'")]
    TensorNotFound {
        /// Node name
        node: String,
        /// Edge name of the literal
        tensor: String,
    },

    /// Literal tensor has a different element type than required
    #[error("Invalid data type: expected {expected}, found {found}")]
    InvalidDataType {
        /// Requested element type
        expected: &'static str,
        /// Stored element type
        found: &'static str,
    },

    /// Invalid node configuration
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Graph violates a structural invariant (duplicate names or producers)
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// Folding or fusing produced incompatible shapes
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Internal consistency fault, usually caused by pass ordering
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// Graph validation failed
    #[error("Graph validation failed: {0}")]
    ValidationFailed(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, TransformError>;
