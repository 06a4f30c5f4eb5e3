//! Graph map types and builders
//!
//! Defines the index-based lookup tables that back adjacency.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::error::{GraphResult, TransformError};

use super::node::{Node, ValueInfo};

/// Position of a node in its graph's node list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Index into the node list
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Set of neighbouring nodes; most nodes have 1-4
pub type NodeSet = SmallVec<[NodeId; 4]>;

/// Type alias for producer map: output_name → producing node
pub type ProducerMap = FxHashMap<String, NodeId>;

/// Type alias for consumer map: edge_name → consuming nodes (graph order)
pub type ConsumerMap = FxHashMap<String, NodeSet>;

/// Type alias for name map: node_name → node
pub type NameMap = FxHashMap<String, NodeId>;

/// Build producer map from nodes
///
/// Fails if two nodes declare the same output edge.
pub fn build_producer_map(nodes: &[Node]) -> GraphResult<ProducerMap> {
    let mut map = FxHashMap::default();

    for (idx, node) in nodes.iter().enumerate() {
        for output in node.outputs.iter().filter(|o| !o.is_empty()) {
            if let Some(prev) = map.insert(output.clone(), NodeId(idx)) {
                return Err(TransformError::InvalidGraph(format!(
                    "edge '{}' is produced by both '{}' and '{}'",
                    output, nodes[prev.0].name, node.name
                )));
            }
        }
    }

    Ok(map)
}

/// Build consumer map from nodes
pub fn build_consumer_map(nodes: &[Node]) -> ConsumerMap {
    let mut map: ConsumerMap = FxHashMap::default();

    for (idx, node) in nodes.iter().enumerate() {
        for input in node.inputs.iter().filter(|i| !i.is_empty()) {
            let consumers = map.entry(input.clone()).or_default();
            if !consumers.contains(&NodeId(idx)) {
                consumers.push(NodeId(idx));
            }
        }
    }

    map
}

/// Build node name map
///
/// Fails on duplicate node names.
pub fn build_name_map(nodes: &[Node]) -> GraphResult<NameMap> {
    let mut map = FxHashMap::default();

    for (idx, node) in nodes.iter().enumerate() {
        if map.insert(node.name.clone(), NodeId(idx)).is_some() {
            return Err(TransformError::InvalidGraph(format!(
                "duplicate node name '{}'",
                node.name
            )));
        }
    }

    Ok(map)
}

/// Build parent and child sets
///
/// `B` is a child of `A` iff some output of `A` is an input of `B`.
/// Parents are ordered by first use among the inputs, children by graph order.
pub fn build_adjacency(nodes: &[Node], producers: &ProducerMap) -> (Vec<NodeSet>, Vec<NodeSet>) {
    let mut parents = vec![NodeSet::new(); nodes.len()];
    let mut children = vec![NodeSet::new(); nodes.len()];

    for (idx, node) in nodes.iter().enumerate() {
        let child = NodeId(idx);
        for input in &node.inputs {
            let Some(&parent) = producers.get(input) else {
                continue;
            };
            if !parents[idx].contains(&parent) {
                parents[idx].push(parent);
            }
            if !children[parent.0].contains(&child) {
                children[parent.0].push(child);
            }
        }
    }

    (parents, children)
}

/// Collect every edge name the graph mentions
pub fn build_edge_names(nodes: &[Node], inputs: &[ValueInfo], outputs: &[ValueInfo]) -> FxHashSet<String> {
    let mut names = FxHashSet::default();

    for node in nodes {
        names.extend(node.inputs.iter().cloned());
        names.extend(node.outputs.iter().cloned());
        names.extend(node.tensors.keys().cloned());
    }
    names.extend(inputs.iter().map(|vi| vi.name.clone()));
    names.extend(outputs.iter().map(|vi| vi.name.clone()));
    names.remove("");

    names
}

/// Derive a name from `base` that `is_taken` rejects
///
/// Returns `base` itself when free, otherwise the first free `base_N`.
pub fn unique_name(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::make_node;

    fn make_test_nodes() -> Vec<Node> {
        vec![
            make_node("Conv", &["X", "W"], &["conv_out"], "conv_0"),
            make_node(
                "BatchNormalization",
                &["conv_out", "scale", "B", "mean", "var"],
                &["bn_out"],
                "bn_0",
            ),
            make_node("Relu", &["bn_out"], &["Y"], "relu_0"),
            make_node("Add", &["conv_out", "Y"], &["Z"], "add_0"),
        ]
    }

    #[test]
    fn test_build_producer_map() {
        let map = build_producer_map(&make_test_nodes()).unwrap();

        assert_eq!(map.get("conv_out"), Some(&NodeId(0)));
        assert_eq!(map.get("Y"), Some(&NodeId(2)));
        assert!(map.get("X").is_none()); // input, not produced by node
    }

    #[test]
    fn test_duplicate_producer_rejected() {
        let nodes = vec![
            make_node("Relu", &["X"], &["Y"], "a"),
            make_node("Relu", &["X"], &["Y"], "b"),
        ];
        assert!(matches!(
            build_producer_map(&nodes),
            Err(TransformError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let nodes = vec![
            make_node("Relu", &["X"], &["Y"], "a"),
            make_node("Relu", &["Y"], &["Z"], "a"),
        ];
        assert!(build_name_map(&nodes).is_err());
    }

    #[test]
    fn test_build_consumer_map() {
        let map = build_consumer_map(&make_test_nodes());

        assert_eq!(
            map.get("conv_out").map(|v| v.as_slice()),
            Some(&[NodeId(1), NodeId(3)][..])
        );
    }

    #[test]
    fn test_build_adjacency() {
        let nodes = make_test_nodes();
        let producers = build_producer_map(&nodes).unwrap();
        let (parents, children) = build_adjacency(&nodes, &producers);

        assert!(parents[0].is_empty());
        assert_eq!(children[0].as_slice(), &[NodeId(1), NodeId(3)]);
        assert_eq!(parents[3].as_slice(), &[NodeId(0), NodeId(2)]);
    }

    #[test]
    fn test_unique_name() {
        let taken = ["edge", "edge_1"];
        assert_eq!(unique_name("fresh", |n| taken.contains(&n)), "fresh");
        assert_eq!(unique_name("edge", |n| taken.contains(&n)), "edge_2");
    }
}
