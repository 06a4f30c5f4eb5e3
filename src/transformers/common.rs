//! Common utilities for transformers
//!
//! Shared eligibility helpers used across multiple fusion rules. All of them
//! answer "no" instead of failing: a missing attribute or literal only means
//! the window is not eligible.

use ndarray::Array1;

use crate::graph::Node;
use crate::tensor::channel_vector;

/// Check `broadcast=1` and `axis=1` (per-channel broadcast)
pub fn is_channel_broadcast(node: &Node) -> bool {
    matches!(node.attr_int("broadcast"), Ok(1)) && matches!(node.attr_int("axis"), Ok(1))
}

/// Check that `consumer` reads `producer`'s first output as its data input
pub fn feeds_data_input(producer: &Node, consumer: &Node) -> bool {
    match (producer.outputs.first(), consumer.inputs.first()) {
        (Some(out), Some(input)) => out == input,
        _ => false,
    }
}

/// Output channel count of a Conv, from its literal weight `(C_out, ...)`
pub fn conv_out_channels(conv: &Node) -> Option<usize> {
    conv.literal_input(1)?.shape().first().copied()
}

/// Channel count of a BatchNormalization, from its literal scale
pub fn bn_channels(bn: &Node) -> Option<usize> {
    let scale = bn.literal_input(1)?;
    scale.as_f32().ok()?;
    Some(scale.len())
}

/// Literal input `index` viewed as a per-channel vector
pub fn channel_operand(node: &Node, index: usize, channels: usize) -> Option<Array1<f32>> {
    node.literal_input(index)
        .and_then(|t| channel_vector(t, channels))
}

/// Check that literal input `index` is a float vector of exactly `channels` values
pub fn has_channel_literal(node: &Node, index: usize, channels: usize) -> bool {
    node.literal_input(index)
        .and_then(|t| t.as_f32().ok())
        .map_or(false, |a| a.len() == channels)
}
