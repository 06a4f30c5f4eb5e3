//! Elimination rules
//!
//! Rules that remove nodes which are no-ops at inference time.

use crate::graph::{Graph, Node};
use crate::pattern::ops::DROPOUT;
use crate::pattern::FusionRule;

/// Remove Dropout nodes (inference mode)
///
/// Dropout is the identity during inference, whatever its `ratio`. The node
/// feeding it adopts its outputs, including an optional mask output, and the
/// Dropout is dropped.
pub const DROPOUT_RULE: FusionRule = FusionRule::new("EliminateDropout", 2, is_dropout);

fn is_dropout(_graph: &Graph, window: &[&Node]) -> bool {
    window.len() == 2 && window[1].op_type == DROPOUT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{make_node, ValueInfo};
    use crate::transform::fuse_chains;

    fn make_graph(dropout: Node) -> Graph {
        Graph::from_nodes(
            vec![
                make_node("Conv", &["X", "W"], &["c"], "conv"),
                dropout,
                make_node("Relu", &["d"], &["Y"], "relu"),
            ],
            vec![ValueInfo::new("X", &[1, 3, 8, 8])],
            vec![ValueInfo::new("Y", &[1, 3, 8, 8])],
        )
        .unwrap()
    }

    #[test]
    fn test_eliminate_dropout() {
        let dropout = make_node("Dropout", &["c"], &["d"], "drop");
        let (graph, stats) = fuse_chains(make_graph(dropout), &DROPOUT_RULE).unwrap();

        assert_eq!(stats.transforms_applied, 1);
        assert_eq!(graph.len(), 2);
        assert!(graph.node_by_name("drop").is_none());

        let conv = graph.id_of("conv").unwrap();
        let relu = graph.id_of("relu").unwrap();
        assert_eq!(graph.node(conv).outputs, vec!["d"]);
        assert_eq!(graph.children(conv), &[relu]);
    }

    #[test]
    fn test_attributes_ignored() {
        let dropout = make_node("Dropout", &["c"], &["d", "mask"], "drop")
            .with_attr("ratio", 0.9f32)
            .with_attr("is_test", 0i64);
        let (graph, _) = fuse_chains(make_graph(dropout), &DROPOUT_RULE).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node_by_name("conv").unwrap().outputs, vec!["d", "mask"]);
    }

    #[test]
    fn test_branching_parent_is_kept() {
        // conv feeds both the Dropout and another consumer: not a linear link
        let graph = Graph::from_nodes(
            vec![
                make_node("Conv", &["X", "W"], &["c"], "conv"),
                make_node("Dropout", &["c"], &["d"], "drop"),
                make_node("Relu", &["c"], &["r"], "relu"),
            ],
            vec![ValueInfo::new("X", &[1])],
            vec![ValueInfo::new("d", &[1]), ValueInfo::new("r", &[1])],
        )
        .unwrap();

        let (graph, stats) = fuse_chains(graph, &DROPOUT_RULE).unwrap();
        assert_eq!(stats.transforms_applied, 0);
        assert_eq!(graph.len(), 3);
    }
}
