//! Chain fusion driver
//!
//! Applies a [`FusionRule`] to every strictly linear window in a graph and
//! emits the rewritten graph.
//!
//! Overlapping windows are resolved greedily in graph order: once a node is
//! part of an accepted window, any later window containing it is skipped for
//! the rest of the pass. Chains that become fusible only after a rewrite are
//! picked up by the next pass (the pipeline repeats fusion until nothing
//! changes).

use crate::error::{GraphResult, TransformError};
use crate::graph::{Graph, Node};
use crate::pattern::{ChainMatcher, FusionRule, RewriteContext};
use crate::traits::Pass;

use super::core::PassStats;

/// Apply one fusion rule across the graph
///
/// For each node, in graph order, taken as the tail of a window:
/// match a linear window of `rule.window` nodes, skip it if it touches a node
/// already rewritten in this pass, check eligibility, then merge. Replacement
/// sequences are emitted at the position of the first window node; all other
/// nodes keep their relative order. Adjacency is rebuilt from scratch, which
/// re-links the head's parents and the tail's children to the replacement.
///
/// Returns the input graph untouched when nothing was rewritten.
pub fn fuse_chains(graph: Graph, rule: &FusionRule) -> GraphResult<(Graph, PassStats)> {
    let mut stats = PassStats::new();
    // node index → slot in `replacements`
    let mut claimed: Vec<Option<usize>> = vec![None; graph.len()];
    let mut replacements: Vec<Option<Vec<Node>>> = Vec::new();

    {
        let matcher = ChainMatcher::new(&graph);
        let mut ctx = RewriteContext::new(&graph);

        for tail in graph.node_ids() {
            let Some(window) = matcher.match_window(tail, rule.window) else {
                continue;
            };
            if window.ids().iter().any(|id| claimed[id.index()].is_some()) {
                log::trace!(
                    "{}: skipping [{}], overlaps an earlier rewrite",
                    rule.name,
                    window.names(&graph).join(", ")
                );
                continue;
            }

            let nodes = window.nodes(&graph);
            stats.patterns_matched += 1;
            if exposes_graph_output(&graph, &nodes) {
                log::debug!(
                    "{}: skipping [{}], an inner edge is a graph output",
                    rule.name,
                    window.names(&graph).join(", ")
                );
                continue;
            }
            if !(rule.is_eligible)(&graph, &nodes) {
                continue;
            }

            let owned: Vec<Node> = nodes.into_iter().cloned().collect();
            let merged = (rule.merge)(&mut ctx, owned)?;
            if merged.is_empty() {
                return Err(TransformError::InvariantViolation(format!(
                    "{} produced an empty replacement for [{}]",
                    rule.name,
                    window.names(&graph).join(", ")
                )));
            }

            log::debug!(
                "{}: [{}] -> [{}]",
                rule.name,
                window.names(&graph).join(", "),
                merged
                    .iter()
                    .map(|n| n.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            stats.record_rewrite(&graph.node(window.head()).name, window.len(), merged.len());

            let slot = replacements.len();
            for id in window.ids() {
                claimed[id.index()] = Some(slot);
            }
            replacements.push(Some(merged));
        }
    }

    if replacements.is_empty() {
        return Ok((graph, stats));
    }

    let (nodes, inputs, outputs) = graph.into_parts();
    let mut emitted = Vec::with_capacity(nodes.len() + stats.nodes_added);
    for (idx, node) in nodes.into_iter().enumerate() {
        match claimed[idx] {
            // First member emits the whole replacement, later members emit nothing
            Some(slot) => {
                if let Some(sequence) = replacements[slot].take() {
                    emitted.extend(sequence);
                }
            }
            None => emitted.push(node),
        }
    }

    let graph = Graph::from_nodes(emitted, inputs, outputs)?;
    Ok((graph, stats))
}

/// Check whether a node before the tail produces a declared graph output
///
/// Merges only guarantee the tail's outputs, so such a window cannot be
/// rewritten without losing or changing that output.
fn exposes_graph_output(graph: &Graph, window: &[&Node]) -> bool {
    let inner = window.len().saturating_sub(1);
    window[..inner]
        .iter()
        .flat_map(|node| node.outputs.iter())
        .any(|edge| graph.is_graph_output(edge))
}

/// Pass that drives a single [`FusionRule`]
#[derive(Debug, Clone, Copy)]
pub struct ChainFuser {
    rule: FusionRule,
}

impl ChainFuser {
    /// Create a pass for `rule`
    pub fn new(rule: FusionRule) -> Self {
        Self { rule }
    }

    /// The driven rule
    pub fn rule(&self) -> &FusionRule {
        &self.rule
    }
}

impl Pass for ChainFuser {
    fn name(&self) -> &'static str {
        self.rule.name
    }

    fn run(&self, graph: Graph) -> GraphResult<(Graph, PassStats)> {
        fuse_chains(graph, &self.rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{make_node, ValueInfo};
    use crate::pattern::default_merge;

    fn relu_pair(_: &Graph, window: &[&Node]) -> bool {
        window.iter().all(|n| n.op_type == "Relu")
    }

    const RELU_PAIR: FusionRule = FusionRule::new("ReluPair", 2, relu_pair);

    fn expand(ctx: &mut RewriteContext<'_>, window: Vec<Node>) -> GraphResult<Vec<Node>> {
        // first -> inserted Identity -> last
        let mut first = window[0].clone();
        let mut last = window[1].clone();
        let edge = ctx.unique_edge_name("mid");
        let name = ctx.unique_node_name("inserted");
        let middle = Node::new("Identity", &name, &[first.outputs[0].as_str()], &[&edge]);
        last.inputs = vec![edge];
        first.outputs.truncate(1);
        Ok(vec![first, middle, last])
    }

    fn make_chain(ops: &[&str]) -> Graph {
        let mut nodes = Vec::new();
        for (i, op) in ops.iter().enumerate() {
            let input = if i == 0 { "X".to_string() } else { format!("e{}", i - 1) };
            let output = if i + 1 == ops.len() { "Y".to_string() } else { format!("e{}", i) };
            nodes.push(make_node(op, &[&input], &[&output], &format!("n{}", i)));
        }
        Graph::from_nodes(
            nodes,
            vec![ValueInfo::new("X", &[1])],
            vec![ValueInfo::new("Y", &[1])],
        )
        .unwrap()
    }

    fn names(graph: &Graph) -> Vec<&str> {
        graph.nodes().iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_fuse_pair() {
        let graph = make_chain(&["Sigmoid", "Relu", "Relu", "Tanh"]);
        let (graph, stats) = fuse_chains(graph, &RELU_PAIR).unwrap();

        assert_eq!(stats.transforms_applied, 1);
        assert_eq!(names(&graph), vec!["n0", "n1", "n3"]);
        assert_eq!(graph.node_by_name("n1").unwrap().outputs, vec!["e2"]);
        assert_eq!(graph.node_by_name("n3").unwrap().inputs, vec!["e2"]);

        // Adjacency re-linked around the replacement
        let n1 = graph.id_of("n1").unwrap();
        let n3 = graph.id_of("n3").unwrap();
        assert_eq!(graph.children(n1), &[n3]);
        assert_eq!(graph.parents(n3), &[n1]);
    }

    #[test]
    fn test_no_match_returns_same_graph() {
        let graph = make_chain(&["Sigmoid", "Relu", "Tanh"]);
        let before = graph.nodes().to_vec();
        let (graph, stats) = fuse_chains(graph, &RELU_PAIR).unwrap();

        assert_eq!(stats.transforms_applied, 0);
        assert_eq!(graph.nodes(), before.as_slice());
    }

    #[test]
    fn test_overlap_is_greedy() {
        // n0-n1, n1-n2, n2-n3 all qualify; n0-n1 wins, n1-n2 is skipped,
        // n2-n3 is disjoint and fuses too
        let graph = make_chain(&["Relu", "Relu", "Relu", "Relu"]);
        let (graph, stats) = fuse_chains(graph, &RELU_PAIR).unwrap();

        assert_eq!(stats.transforms_applied, 2);
        assert_eq!(names(&graph), vec!["n0", "n2"]);
        assert_eq!(graph.node_by_name("n0").unwrap().outputs, vec!["e1"]);
        assert_eq!(graph.node_by_name("n2").unwrap().inputs, vec!["e1"]);
        assert_eq!(graph.node_by_name("n2").unwrap().outputs, vec!["Y"]);
    }

    #[test]
    fn test_node_count_changes_by_replacement_delta() {
        let rule = FusionRule::new("Expand", 2, relu_pair).with_merge(expand);
        let graph = make_chain(&["Sigmoid", "Relu", "Relu", "Tanh"]);
        let before = graph.len();

        let (graph, stats) = fuse_chains(graph, &rule).unwrap();

        assert_eq!(graph.len() as isize, before as isize + stats.node_delta());
        assert_eq!(graph.len(), before + 1);
        assert_eq!(names(&graph), vec!["n0", "n1", "inserted", "n2", "n3"]);
        assert!(graph.validate().is_valid);
    }

    #[test]
    fn test_inner_graph_output_blocks_rewrite() {
        let graph = Graph::from_nodes(
            vec![
                make_node("Relu", &["X"], &["a"], "n0"),
                make_node("Relu", &["a"], &["Y"], "n1"),
            ],
            vec![ValueInfo::new("X", &[1])],
            vec![ValueInfo::new("a", &[1]), ValueInfo::new("Y", &[1])],
        )
        .unwrap();

        let (graph, stats) = fuse_chains(graph, &RELU_PAIR).unwrap();
        assert_eq!(stats.transforms_applied, 0);
        assert_eq!(graph.len(), 2);
        assert!(graph.validate().is_valid);
    }

    #[test]
    fn test_extra_head_output_blocks_rewrite() {
        let graph = Graph::from_nodes(
            vec![
                make_node("Relu", &["X"], &["a", "side"], "n0"),
                make_node("Relu", &["a"], &["Y"], "n1"),
            ],
            vec![ValueInfo::new("X", &[1])],
            vec![ValueInfo::new("side", &[1]), ValueInfo::new("Y", &[1])],
        )
        .unwrap();

        let (graph, _) = fuse_chains(graph, &RELU_PAIR).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node_by_name("n0").unwrap().outputs, vec!["a", "side"]);
    }

    #[test]
    fn test_default_merge_rule_via_pass() {
        let pass = ChainFuser::new(RELU_PAIR.with_merge(default_merge));
        assert_eq!(pass.name(), "ReluPair");

        let (graph, _) = pass.run(make_chain(&["Relu", "Relu"])).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.nodes()[0].outputs, vec!["Y"]);
    }
}
