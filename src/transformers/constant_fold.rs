//! Constant Reshape Folding
//!
//! Evaluates Reshape nodes whose data input is a literal at compile time.
//! The reshaped value is handed to every consumer as a literal under the
//! Reshape's output edge name, and the Reshape node is removed.
//!
//! Both Reshape forms are recognized:
//! - opset < 5: target shape in the `shape` attribute, data literal is the
//!   only input
//! - opset >= 5: target shape as a second, int64 literal input

use crate::error::{GraphResult, TransformError};
use crate::graph::{Graph, Node};
use crate::pattern::ops::RESHAPE;
use crate::tensor::Tensor;
use crate::traits::Pass;
use crate::transform::PassStats;

/// Fold Reshape nodes applied to literal tensors
#[derive(Debug, Default, Clone, Copy)]
pub struct FoldConstantReshape;

impl FoldConstantReshape {
    /// Create the pass
    pub fn new() -> Self {
        Self
    }
}

impl Pass for FoldConstantReshape {
    fn name(&self) -> &'static str {
        "FoldConstantReshape"
    }

    fn run(&self, graph: Graph) -> GraphResult<(Graph, PassStats)> {
        fold_constant_reshapes(graph)
    }
}

/// Literal data and target shape of a foldable Reshape, if it is one
fn fold_candidate(node: &Node) -> GraphResult<Option<(&Tensor, Vec<i64>)>> {
    if node.op_type != RESHAPE {
        return Ok(None);
    }
    let Some(data) = node.literal_input(0) else {
        return Ok(None);
    };

    let extra_inputs = node.inputs.iter().skip(1).filter(|e| !e.is_empty()).count();
    match (node.tensors.len(), extra_inputs) {
        (1, 0) => Ok(Some((data, node.attr_ints("shape")?.to_vec()))),
        (2, 1) => match node.literal_input(1) {
            Some(Tensor::Int64(shape)) => Ok(Some((data, shape.iter().copied().collect()))),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Fold every constant Reshape in one sweep
///
/// A candidate must have no parent nodes; one that does means its literal
/// edge is also produced in-graph, which is reported as
/// [`TransformError::InvariantViolation`]. A candidate whose output is a
/// declared graph output is left in place.
pub fn fold_constant_reshapes(graph: Graph) -> GraphResult<(Graph, PassStats)> {
    let mut stats = PassStats::new();
    let mut removed = vec![false; graph.len()];
    let mut literals: Vec<Vec<(String, Tensor)>> = vec![Vec::new(); graph.len()];

    for id in graph.node_ids() {
        let node = graph.node(id);
        let Some((data, target)) = fold_candidate(node)? else {
            continue;
        };
        stats.patterns_matched += 1;

        if !graph.parents(id).is_empty() {
            return Err(TransformError::InvariantViolation(format!(
                "constant Reshape '{}' has {} parent node(s)",
                node.name,
                graph.parents(id).len()
            )));
        }
        let Some(output) = node.outputs.first() else {
            continue;
        };
        if graph.is_graph_output(output) {
            log::debug!("{}: output '{}' is a graph output, not folding", node.name, output);
            continue;
        }

        let folded = data.reshape(&target).map_err(|e| match e {
            TransformError::ShapeMismatch(msg) => {
                TransformError::ShapeMismatch(format!("{}: {}", node.name, msg))
            }
            other => other,
        })?;
        log::debug!(
            "folded {} {:?} -> {:?} into {} consumer(s)",
            node.name,
            data.shape(),
            folded.shape(),
            graph.children(id).len()
        );

        for child in graph.children(id) {
            literals[child.index()].push((output.clone(), folded.clone()));
        }
        removed[id.index()] = true;
        stats.record_removal(&node.name);
    }

    if stats.transforms_applied == 0 {
        return Ok((graph, stats));
    }

    let (nodes, inputs, outputs) = graph.into_parts();
    let nodes = nodes
        .into_iter()
        .zip(removed)
        .zip(literals)
        .filter_map(|((mut node, removed), literals)| {
            (!removed).then(|| {
                node.tensors.extend(literals);
                node
            })
        })
        .collect();

    let graph = Graph::from_nodes(nodes, inputs, outputs)?;
    Ok((graph, stats))
}
