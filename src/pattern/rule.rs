//! Fusion rule descriptors
//!
//! A rule is plain data: a window length, an eligibility predicate and a
//! merge function. Rules are registered in an ordered table and driven by
//! [`ChainFuser`](crate::transform::ChainFuser).

use rustc_hash::FxHashSet;

use crate::error::{GraphResult, TransformError};
use crate::graph::{unique_name, Graph, Node};

/// Decides whether a matched window may be rewritten
///
/// Must not fail: a missing attribute or literal means "not eligible".
pub type EligibilityFn = fn(&Graph, &[&Node]) -> bool;

/// Rewrites an eligible window into its replacement sequence
///
/// Receives owned copies of the window nodes. The first replacement node must
/// keep the head's boundary inputs and the last must produce the tail's
/// boundary outputs; edges inside the window are up to the merge.
pub type MergeFn = fn(&mut RewriteContext<'_>, Vec<Node>) -> GraphResult<Vec<Node>>;

/// Fusion rule: (window length, eligibility, merge)
#[derive(Debug, Clone, Copy)]
pub struct FusionRule {
    /// Rule name, used in logs and statistics
    pub name: &'static str,
    /// Number of nodes in a window
    pub window: usize,
    /// Eligibility predicate
    pub is_eligible: EligibilityFn,
    /// Merge function
    pub merge: MergeFn,
}

impl FusionRule {
    /// Rule using [`default_merge`]
    pub const fn new(name: &'static str, window: usize, is_eligible: EligibilityFn) -> Self {
        Self {
            name,
            window,
            is_eligible,
            merge: default_merge,
        }
    }

    /// Replace the merge function
    pub const fn with_merge(self, merge: MergeFn) -> Self {
        Self { merge, ..self }
    }
}

/// Collapse the window into its first node
///
/// The first node adopts the outputs of the last one; everything else in the
/// window is dropped.
pub fn default_merge(_ctx: &mut RewriteContext<'_>, window: Vec<Node>) -> GraphResult<Vec<Node>> {
    let mut nodes = window.into_iter();
    let mut first = nodes
        .next()
        .ok_or_else(|| TransformError::Internal("cannot merge an empty window".to_string()))?;
    if let Some(last) = nodes.last() {
        first.outputs = last.outputs;
    }
    Ok(vec![first])
}

/// Naming scope for merges within one pass
///
/// Hands out edge and node names that collide neither with the graph being
/// rewritten nor with names handed out earlier in the same pass.
pub struct RewriteContext<'g> {
    graph: &'g Graph,
    reserved_edges: FxHashSet<String>,
    reserved_nodes: FxHashSet<String>,
}

impl<'g> RewriteContext<'g> {
    /// Create a context for rewriting `graph`
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            reserved_edges: FxHashSet::default(),
            reserved_nodes: FxHashSet::default(),
        }
    }

    /// The graph snapshot being rewritten
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Reserve a collision-free edge name derived from `base`
    pub fn unique_edge_name(&mut self, base: &str) -> String {
        let name = unique_name(base, |n| {
            self.graph.has_edge(n) || self.reserved_edges.contains(n)
        });
        self.reserved_edges.insert(name.clone());
        name
    }

    /// Reserve a collision-free node name derived from `base`
    pub fn unique_node_name(&mut self, base: &str) -> String {
        let name = unique_name(base, |n| {
            self.graph.id_of(n).is_some() || self.reserved_nodes.contains(n)
        });
        self.reserved_nodes.insert(name.clone());
        name
    }
}
