//! Graph container
//!
//! `Graph` owns its nodes in order and keeps index-based adjacency derived
//! from edge names. Adjacency is only ever rebuilt from scratch by
//! [`Graph::from_nodes`]; passes take a graph by value and build a new one.

use rustc_hash::FxHashSet;

use crate::error::GraphResult;

use super::maps::{
    build_adjacency, build_consumer_map, build_edge_names, build_name_map, build_producer_map,
    ConsumerMap, NameMap, NodeSet, ProducerMap,
};
use super::node::{Node, ValueInfo};

/// Ordered node collection with declared external inputs and outputs
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) inputs: Vec<ValueInfo>,
    pub(crate) outputs: Vec<ValueInfo>,

    /// Maps output edge name → producer node
    pub(crate) producer_map: ProducerMap,
    /// Maps edge name → consumer nodes
    pub(crate) consumer_map: ConsumerMap,
    /// Maps node name → node
    pub(crate) name_map: NameMap,
    /// Parent sets, indexed by node
    pub(crate) parents: Vec<NodeSet>,
    /// Child sets, indexed by node
    pub(crate) children: Vec<NodeSet>,
    /// Every edge name in use
    pub(crate) edge_names: FxHashSet<String>,
}

impl Graph {
    /// Build a graph, deriving all adjacency from edge names
    ///
    /// Fails with [`TransformError::InvalidGraph`](crate::error::TransformError::InvalidGraph)
    /// on duplicate node names or an edge with two producers.
    pub fn from_nodes(
        nodes: Vec<Node>,
        inputs: Vec<ValueInfo>,
        outputs: Vec<ValueInfo>,
    ) -> GraphResult<Self> {
        let name_map = build_name_map(&nodes)?;
        let producer_map = build_producer_map(&nodes)?;
        let consumer_map = build_consumer_map(&nodes);
        let (parents, children) = build_adjacency(&nodes, &producer_map);
        let edge_names = build_edge_names(&nodes, &inputs, &outputs);

        Ok(Self {
            nodes,
            inputs,
            outputs,
            producer_map,
            consumer_map,
            name_map,
            parents,
            children,
            edge_names,
        })
    }

    /// Decompose into nodes, inputs and outputs
    pub fn into_parts(self) -> (Vec<Node>, Vec<ValueInfo>, Vec<ValueInfo>) {
        (self.nodes, self.inputs, self.outputs)
    }

    /// Collision-free edge name derived from `base`
    pub fn unique_edge_name(&self, base: &str) -> String {
        super::maps::unique_name(base, |n| self.edge_names.contains(n))
    }

    /// Collision-free node name derived from `base`
    pub fn unique_node_name(&self, base: &str) -> String {
        super::maps::unique_name(base, |n| self.name_map.contains_key(n))
    }

    /// Check if an edge name is in use anywhere in the graph
    pub fn has_edge(&self, name: &str) -> bool {
        self.edge_names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::graph::node::make_node;
    use crate::graph::NodeId;

    fn make_test_graph() -> Graph {
        Graph::from_nodes(
            vec![
                make_node("Conv", &["X", "W"], &["conv_out"], "conv_0"),
                make_node("Relu", &["conv_out"], &["Y"], "relu_0"),
            ],
            vec![ValueInfo::new("X", &[1, 3, 8, 8])],
            vec![ValueInfo::new("Y", &[1, 4, 8, 8])],
        )
        .unwrap()
    }

    #[test]
    fn test_graph_creation() {
        let graph = make_test_graph();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.children(NodeId(0)), &[NodeId(1)]);
        assert_eq!(graph.parents(NodeId(1)), &[NodeId(0)]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Graph::from_nodes(
            vec![
                make_node("Relu", &["X"], &["a"], "n"),
                make_node("Relu", &["a"], &["b"], "n"),
            ],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(TransformError::InvalidGraph(_))));
    }

    #[test]
    fn test_unique_edge_name() {
        let graph = make_test_graph();

        assert_eq!(graph.unique_edge_name("fresh"), "fresh");
        assert_eq!(graph.unique_edge_name("conv_out"), "conv_out_1");
        // Declared inputs count as edges
        assert_eq!(graph.unique_edge_name("X"), "X_1");
    }

    #[test]
    fn test_unique_node_name() {
        let graph = make_test_graph();
        assert_eq!(graph.unique_node_name("relu_0"), "relu_0_1");
        assert_eq!(graph.unique_node_name("relu_1"), "relu_1");
    }

    #[test]
    fn test_into_parts_round_trip() {
        let graph = make_test_graph();
        let (nodes, inputs, outputs) = graph.into_parts();
        let rebuilt = Graph::from_nodes(nodes, inputs, outputs).unwrap();
        assert_eq!(rebuilt.len(), 2);
    }
}
