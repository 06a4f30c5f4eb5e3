//! Operator names and chain patterns used by the fusion rules
//!
//! Patterns are listed in data-flow order (producer first).

/// Convolution
pub const CONV: &str = "Conv";
/// Element-wise addition
pub const ADD: &str = "Add";
/// Element-wise multiplication
pub const MUL: &str = "Mul";
/// Batch normalization
pub const BATCH_NORM: &str = "BatchNormalization";
/// Dropout (identity at inference)
pub const DROPOUT: &str = "Dropout";
/// Reshape
pub const RESHAPE: &str = "Reshape";
/// Transpose
pub const TRANSPOSE: &str = "Transpose";

/// Conv followed by Add
pub const CONV_ADD: &[&str] = &[CONV, ADD];

/// BatchNormalization followed by Mul
pub const BN_MUL: &[&str] = &[BATCH_NORM, MUL];

/// BatchNormalization followed by Add
pub const BN_ADD: &[&str] = &[BATCH_NORM, ADD];

/// Depth-to-space idiom: Reshape → Transpose → Reshape
pub const PIXEL_SHUFFLE: &[&str] = &[RESHAPE, TRANSPOSE, RESHAPE];

/// Check whether the window's op types equal `pattern`
pub fn ops_match(window: &[&crate::graph::Node], pattern: &[&str]) -> bool {
    window.len() == pattern.len()
        && window
            .iter()
            .zip(pattern)
            .all(|(node, &op)| node.op_type == op)
}
