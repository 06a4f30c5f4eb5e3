//! BatchNormalization + broadcast Mul/Add fusion
//!
//! BatchNormalization computes, per channel:
//!
//! BN: y = scale * (x - mean) / sqrt(var + eps) + B
//!
//! A following per-channel Mul by W or Add of c folds into the parameters:
//!
//! BN×Mul: scale' = scale * W, B' = B * W
//! BN+Add: B' = B + c
//!
//! BN inputs are `[X, scale, B, mean, var]`.

use ndarray::{Array1, ArrayD};

use crate::error::{GraphResult, TransformError};
use crate::graph::{Graph, Node};
use crate::pattern::{ops_match, FusionRule, RewriteContext, BN_ADD, BN_MUL};
use crate::tensor::Tensor;

use super::common::{bn_channels, channel_operand, feeds_data_input, has_channel_literal, is_channel_broadcast};

const SCALE: usize = 1;
const BIAS: usize = 2;

/// BatchNormalization → Mul(broadcast=1, axis=1, literal W)
pub const MUL_RULE: FusionRule = FusionRule::new("FuseBNMul", 2, is_mul_eligible).with_merge(merge_mul);

/// BatchNormalization → Add(broadcast=1, axis=1, two inputs, literal c)
pub const ADD_RULE: FusionRule = FusionRule::new("FuseBNAdd", 2, is_add_eligible).with_merge(merge_add);

/// Shared checks; returns the channel count
fn bn_broadcast_pair(window: &[&Node], pattern: &[&str]) -> Option<usize> {
    if !ops_match(window, pattern) {
        return None;
    }
    let (bn, op) = (window[0], window[1]);
    if !is_channel_broadcast(op) || !feeds_data_input(bn, op) {
        return None;
    }
    let channels = bn_channels(bn)?;
    has_channel_literal(bn, BIAS, channels).then_some(channels)
}

fn is_mul_eligible(_graph: &Graph, window: &[&Node]) -> bool {
    bn_broadcast_pair(window, BN_MUL)
        .map_or(false, |c| channel_operand(window[1], 1, c).is_some())
}

fn is_add_eligible(_graph: &Graph, window: &[&Node]) -> bool {
    window.len() == 2
        && window[1].inputs.len() == 2
        && bn_broadcast_pair(window, BN_ADD)
            .map_or(false, |c| channel_operand(window[1], 1, c).is_some())
}

/// Split a two-node window into (BatchNormalization, operand node, operand)
fn split_window(window: Vec<Node>) -> GraphResult<(Node, Node, Array1<f32>)> {
    let mut nodes = window.into_iter();
    let (Some(bn), Some(op)) = (nodes.next(), nodes.next()) else {
        return Err(TransformError::Internal(
            "BatchNormalization fusion needs a window of two nodes".to_string(),
        ));
    };
    let channels = bn.require_literal_input(SCALE)?.len();
    let operand = channel_operand(&op, 1, channels).ok_or_else(|| {
        TransformError::ShapeMismatch(format!(
            "{} operand does not broadcast over {} channels",
            op.name, channels
        ))
    })?;
    Ok((bn, op, operand))
}

/// Compute `f(param, operand)` element-wise over BN parameter `index`, keeping its shape
///
/// Reads only; scale and bias may name the same edge, so both are computed
/// from the original values before either is written back.
fn updated_param(
    bn: &Node,
    index: usize,
    operand: &Array1<f32>,
    f: impl Fn(f32, f32) -> f32,
) -> GraphResult<ArrayD<f32>> {
    let mut param = bn.require_literal_input(index)?.as_f32()?.clone();
    if param.len() != operand.len() {
        return Err(TransformError::ShapeMismatch(format!(
            "{} input[{}] has {} values, operand has {}",
            bn.name,
            index,
            param.len(),
            operand.len()
        )));
    }
    param
        .iter_mut()
        .zip(operand.iter())
        .for_each(|(p, &w)| *p = f(*p, w));
    Ok(param)
}

fn set_param(bn: &mut Node, index: usize, value: ArrayD<f32>) {
    let edge = bn.inputs[index].clone();
    bn.tensors.insert(edge, Tensor::from(value));
}

fn merge_mul(_ctx: &mut RewriteContext<'_>, window: Vec<Node>) -> GraphResult<Vec<Node>> {
    let (mut bn, mul, w) = split_window(window)?;
    let scale = updated_param(&bn, SCALE, &w, |s, w| s * w)?;
    let bias = updated_param(&bn, BIAS, &w, |b, w| b * w)?;
    set_param(&mut bn, SCALE, scale);
    set_param(&mut bn, BIAS, bias);
    bn.outputs = mul.outputs;
    Ok(vec![bn])
}

fn merge_add(_ctx: &mut RewriteContext<'_>, window: Vec<Node>) -> GraphResult<Vec<Node>> {
    let (mut bn, add, c) = split_window(window)?;
    let bias = updated_param(&bn, BIAS, &c, |b, c| b + c)?;
    set_param(&mut bn, BIAS, bias);
    bn.outputs = add.outputs;
    Ok(vec![bn])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{make_node, ValueInfo};
    use crate::tensor::vec_to_tensor_f32;
    use crate::transform::fuse_chains;

    fn bn() -> Node {
        make_node("BatchNormalization", &["X", "s", "b", "m", "v"], &["n"], "bn")
            .with_attr("epsilon", 1e-5f32)
            .with_tensor("s", vec_to_tensor_f32(&[1.0, 2.0]))
            .with_tensor("b", vec_to_tensor_f32(&[0.5, -0.5]))
            .with_tensor("m", vec_to_tensor_f32(&[0.0, 0.0]))
            .with_tensor("v", vec_to_tensor_f32(&[1.0, 1.0]))
    }

    fn broadcast(op: &str, inputs: &[&str], operand: &[f32]) -> Node {
        make_node(op, inputs, &["Y"], "op")
            .with_attr("broadcast", 1i64)
            .with_attr("axis", 1i64)
            .with_tensor("W", vec_to_tensor_f32(operand))
    }

    fn make_graph(op: Node) -> Graph {
        Graph::from_nodes(
            vec![bn(), op],
            vec![ValueInfo::new("X", &[1, 2, 4, 4])],
            vec![ValueInfo::new("Y", &[1, 2, 4, 4])],
        )
        .unwrap()
    }

    fn literal(graph: &Graph, edge: &str) -> Vec<f32> {
        graph.node_by_name("bn").unwrap().tensors[edge]
            .as_f32()
            .unwrap()
            .iter()
            .copied()
            .collect()
    }

    #[test]
    fn test_fuse_bn_mul() {
        let graph = make_graph(broadcast("Mul", &["n", "W"], &[3.0, 4.0]));
        let (graph, stats) = fuse_chains(graph, &MUL_RULE).unwrap();

        assert_eq!(stats.transforms_applied, 1);
        assert_eq!(graph.len(), 1);
        assert_eq!(literal(&graph, "s"), vec![3.0, 8.0]);
        assert_eq!(literal(&graph, "b"), vec![1.5, -2.0]);
        assert_eq!(literal(&graph, "m"), vec![0.0, 0.0]);
        assert_eq!(graph.node_by_name("bn").unwrap().outputs, vec!["Y"]);
    }

    #[test]
    fn test_fuse_bn_add() {
        let graph = make_graph(broadcast("Add", &["n", "W"], &[1.0, 1.0]));
        let (graph, _) = fuse_chains(graph, &ADD_RULE).unwrap();

        assert_eq!(graph.len(), 1);
        assert_eq!(literal(&graph, "s"), vec![1.0, 2.0]);
        assert_eq!(literal(&graph, "b"), vec![1.5, 0.5]);
    }

    #[test]
    fn test_bn_add_requires_two_inputs() {
        let graph = make_graph(broadcast("Add", &["n", "W", "Z"], &[1.0, 1.0]));
        let (graph, stats) = fuse_chains(graph, &ADD_RULE).unwrap();

        assert_eq!(stats.transforms_applied, 0);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_bn_mul_requires_literal() {
        let mul = make_node("Mul", &["n", "W"], &["Y"], "op")
            .with_attr("broadcast", 1i64)
            .with_attr("axis", 1i64);
        let (graph, _) = fuse_chains(make_graph(mul), &MUL_RULE).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_rules_do_not_cross() {
        let graph = make_graph(broadcast("Mul", &["n", "W"], &[3.0, 4.0]));
        let (graph, _) = fuse_chains(graph, &ADD_RULE).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_shared_scale_and_bias_literal() {
        let bn = make_node("BatchNormalization", &["X", "p", "p", "m", "v"], &["n"], "bn")
            .with_tensor("p", vec_to_tensor_f32(&[1.0, 2.0]))
            .with_tensor("m", vec_to_tensor_f32(&[0.0, 0.0]))
            .with_tensor("v", vec_to_tensor_f32(&[1.0, 1.0]));
        let graph = Graph::from_nodes(
            vec![bn, broadcast("Mul", &["n", "W"], &[3.0, 4.0])],
            vec![ValueInfo::new("X", &[1, 2, 4, 4])],
            vec![ValueInfo::new("Y", &[1, 2, 4, 4])],
        )
        .unwrap();

        let (graph, stats) = fuse_chains(graph, &MUL_RULE).unwrap();
        assert_eq!(stats.transforms_applied, 1);
        // Scaled once, not twice
        assert_eq!(literal(&graph, "p"), vec![3.0, 8.0]);
    }
}
