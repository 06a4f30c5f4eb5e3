//! Windowed linear-chain matcher
//!
//! Finds strictly linear chains of a fixed length that end at a given node.
//! Matching walks upward (output → input) from the tail, the same direction
//! the fusion rules read their windows in reverse.

use smallvec::SmallVec;

use crate::graph::{Graph, Node, NodeId};

/// Candidate node chain, earliest node first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    ids: SmallVec<[NodeId; 4]>,
}

impl Window {
    /// Node ids in data-flow order
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// First (earliest) node
    pub fn head(&self) -> NodeId {
        self.ids[0]
    }

    /// Last node (the tail matching started from)
    pub fn tail(&self) -> NodeId {
        self.ids[self.ids.len() - 1]
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolve ids to nodes
    pub fn nodes<'g>(&self, graph: &'g Graph) -> Vec<&'g Node> {
        self.ids.iter().map(|&id| graph.node(id)).collect()
    }

    /// Node names, for logging
    pub fn names(&self, graph: &Graph) -> Vec<String> {
        self.ids.iter().map(|&id| graph.node(id).name.clone()).collect()
    }
}

/// Chain matcher over a graph snapshot
pub struct ChainMatcher<'a> {
    graph: &'a Graph,
}

impl<'a> ChainMatcher<'a> {
    /// Create a new matcher
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Match a window of `len` nodes ending at `tail`
    ///
    /// Walking up from `tail`, every link must be strictly linear: the lower
    /// node has exactly one parent and that parent has exactly one child.
    /// The head of the window may have any number of parents and the tail
    /// any number of children. Returns `None` if the chain branches or runs
    /// out before reaching `len` nodes.
    pub fn match_window(&self, tail: NodeId, len: usize) -> Option<Window> {
        if len == 0 {
            return None;
        }

        let mut ids: SmallVec<[NodeId; 4]> = SmallVec::with_capacity(len);
        let mut current = tail;

        for _ in 1..len {
            let parent = self.graph.only_parent(current)?;
            if self.graph.children(parent).len() != 1 {
                // Parent's value is consumed elsewhere
                return None;
            }
            ids.push(current);
            current = parent;
        }
        ids.push(current);
        ids.reverse();

        Some(Window { ids })
    }

    /// Find all windows of `len` nodes, one per tail, in graph order
    ///
    /// Windows may overlap; callers decide which ones to keep.
    pub fn find_all_windows(&self, len: usize) -> Vec<Window> {
        self.graph
            .node_ids()
            .filter_map(|tail| self.match_window(tail, len))
            .collect()
    }
}
