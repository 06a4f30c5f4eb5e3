//! Conv + Add fusion
//!
//! Folds a per-channel constant Add into the bias of the Conv that feeds it.
//!
//! Conv: y = W * x + b
//! Add:  z = y + c        (broadcast along axis 1)
//!
//! Fused: z = W * x + (b + c)
//!
//! A Conv without a bias gets a zero bias of shape `(C_out,)` first.

use ndarray::Array1;

use crate::error::{GraphResult, TransformError};
use crate::graph::{Graph, Node};
use crate::pattern::{ops_match, FusionRule, RewriteContext, CONV_ADD};
use crate::tensor::{channel_vector, Tensor};

use super::common::{channel_operand, conv_out_channels, feeds_data_input, is_channel_broadcast};

/// Conv → Add(broadcast=1, axis=1, literal addend)
pub const RULE: FusionRule = FusionRule::new("FuseConvAdd", 2, is_eligible).with_merge(merge);

/// Existing bias edge of a Conv, if any
fn bias_edge(conv: &Node) -> Option<&String> {
    conv.inputs.get(2).filter(|e| !e.is_empty())
}

fn is_eligible(_graph: &Graph, window: &[&Node]) -> bool {
    if !ops_match(window, CONV_ADD) {
        return false;
    }
    let (conv, add) = (window[0], window[1]);

    if !is_channel_broadcast(add) || !feeds_data_input(conv, add) {
        return false;
    }

    let Some(channels) = conv_out_channels(conv) else {
        return false;
    };
    if channel_operand(add, 1, channels).is_none() {
        return false;
    }

    match bias_edge(conv) {
        Some(edge) => conv
            .tensors
            .get(edge)
            .and_then(|t| channel_vector(t, channels))
            .map_or(false, |b| b.len() == channels),
        None => true,
    }
}

fn merge(ctx: &mut RewriteContext<'_>, window: Vec<Node>) -> GraphResult<Vec<Node>> {
    let mut nodes = window.into_iter();
    let (Some(mut conv), Some(add)) = (nodes.next(), nodes.next()) else {
        return Err(TransformError::Internal(
            "Conv+Add fusion needs a window of two nodes".to_string(),
        ));
    };

    let channels = conv_out_channels(&conv).ok_or_else(|| TransformError::TensorNotFound {
        node: conv.name.clone(),
        tensor: conv.inputs.get(1).cloned().unwrap_or_default(),
    })?;
    let addend = channel_operand(&add, 1, channels).ok_or_else(|| {
        TransformError::ShapeMismatch(format!(
            "{} addend does not broadcast over {} channels",
            add.name, channels
        ))
    })?;

    let (edge, bias) = match bias_edge(&conv).cloned() {
        Some(edge) => {
            let bias = conv
                .tensors
                .get(&edge)
                .and_then(|t| channel_vector(t, channels))
                .ok_or_else(|| TransformError::TensorNotFound {
                    node: conv.name.clone(),
                    tensor: edge.clone(),
                })?;
            (edge, bias)
        }
        None => {
            let edge = ctx.unique_edge_name(&format!("{}_bias", conv.name));
            conv.inputs.truncate(2);
            conv.inputs.push(edge.clone());
            (edge, Array1::zeros(channels))
        }
    };

    conv.tensors
        .insert(edge, Tensor::from((bias + &addend).into_dyn()));
    conv.outputs = add.outputs;
    Ok(vec![conv])
}
