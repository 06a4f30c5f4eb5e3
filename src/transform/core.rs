//! Pass statistics
//!
//! Every pass reports what it did; the pipeline merges the reports and uses
//! them to detect a fixed point.

/// Statistics from a pass run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassStats {
    /// Number of candidate windows or nodes considered
    pub patterns_matched: usize,
    /// Number of rewrites applied
    pub transforms_applied: usize,
    /// Number of nodes removed from the graph
    pub nodes_removed: usize,
    /// Number of nodes added to the graph
    pub nodes_added: usize,
    /// Number of node outputs dropped
    pub outputs_dropped: usize,
    /// Number of edges renamed
    pub edges_renamed: usize,
    /// Names of transformed nodes
    pub transformed_nodes: Vec<String>,
}

impl PassStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rewrite that replaced `removed` nodes by `added` nodes
    pub fn record_rewrite(&mut self, node_name: &str, removed: usize, added: usize) {
        self.transforms_applied += 1;
        self.nodes_removed += removed;
        self.nodes_added += added;
        self.transformed_nodes.push(node_name.to_string());
    }

    /// Record a node removed outright
    pub fn record_removal(&mut self, node_name: &str) {
        self.transforms_applied += 1;
        self.nodes_removed += 1;
        self.transformed_nodes.push(node_name.to_string());
    }

    /// Whether the pass changed the graph
    pub fn changed(&self) -> bool {
        self.transforms_applied > 0 || self.outputs_dropped > 0 || self.edges_renamed > 0
    }

    /// Net change in node count
    pub fn node_delta(&self) -> isize {
        self.nodes_added as isize - self.nodes_removed as isize
    }

    /// Merge with another result
    pub fn merge(&mut self, other: PassStats) {
        self.patterns_matched += other.patterns_matched;
        self.transforms_applied += other.transforms_applied;
        self.nodes_removed += other.nodes_removed;
        self.nodes_added += other.nodes_added;
        self.outputs_dropped += other.outputs_dropped;
        self.edges_renamed += other.edges_renamed;
        self.transformed_nodes.extend(other.transformed_nodes);
    }
}
