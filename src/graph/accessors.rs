//! Graph accessors
//!
//! Read-only lookups over nodes, adjacency and declared values.

use super::context::Graph;
use super::maps::NodeId;
use super::node::{Node, ValueInfo};

impl Graph {
    // ========================================================================
    // Node accessors
    // ========================================================================

    /// Get a node by id
    ///
    /// Panics if `id` does not belong to this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a node by name
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.id_of(name).map(|id| self.node(id))
    }

    /// Get the id of a named node
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.name_map.get(name).copied()
    }

    /// Nodes in graph order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node ids in graph order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Graph traversal
    // ========================================================================

    /// Nodes producing this node's inputs
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.parents[id.0]
    }

    /// Nodes consuming this node's outputs
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id.0]
    }

    /// The single parent, if there is exactly one
    pub fn only_parent(&self, id: NodeId) -> Option<NodeId> {
        match self.parents(id) {
            [parent] => Some(*parent),
            _ => None,
        }
    }

    /// Producer of an edge
    pub fn producer_of(&self, edge: &str) -> Option<NodeId> {
        self.producer_map.get(edge).copied()
    }

    /// Consumers of an edge, in graph order
    pub fn consumers_of(&self, edge: &str) -> &[NodeId] {
        self.consumer_map
            .get(edge)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    // ========================================================================
    // Declared values
    // ========================================================================

    /// Declared graph inputs
    pub fn inputs(&self) -> &[ValueInfo] {
        &self.inputs
    }

    /// Declared graph outputs
    pub fn outputs(&self) -> &[ValueInfo] {
        &self.outputs
    }

    /// Check if an edge is a declared graph input
    pub fn is_graph_input(&self, edge: &str) -> bool {
        self.inputs.iter().any(|vi| vi.name == edge)
    }

    /// Check if an edge is a declared graph output
    pub fn is_graph_output(&self, edge: &str) -> bool {
        self.outputs.iter().any(|vi| vi.name == edge)
    }
}
