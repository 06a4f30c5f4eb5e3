//! Core traits for onnx-chain-opt
//!
//! Defines the interface every graph pass implements.

use crate::error::GraphResult;
use crate::graph::Graph;
use crate::transform::PassStats;

/// A graph-to-graph rewrite pass
///
/// Passes take the graph by value and hand back the rewritten graph, so a
/// pass never observes a half-rewritten graph and the caller cannot keep
/// using a stale one.
///
/// # Example
///
/// ```ignore
/// struct Noop;
///
/// impl Pass for Noop {
///     fn name(&self) -> &'static str {
///         "Noop"
///     }
///
///     fn run(&self, graph: Graph) -> GraphResult<(Graph, PassStats)> {
///         Ok((graph, PassStats::new()))
///     }
/// }
/// ```
pub trait Pass {
    /// Pass name, used in logs
    fn name(&self) -> &'static str;

    /// Run the pass
    ///
    /// # Arguments
    /// * `graph` - The graph to rewrite
    ///
    /// # Returns
    /// * The rewritten graph and what the pass did
    fn run(&self, graph: Graph) -> GraphResult<(Graph, PassStats)>;
}

/// Passes applied in sequence
pub struct PassChain {
    passes: Vec<Box<dyn Pass>>,
}

impl PassChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Add a pass to the chain
    #[allow(clippy::should_implement_trait)]
    pub fn add<P: Pass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Add an already boxed pass
    pub fn push(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Number of passes
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the chain has no passes
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Names of the passes, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }
}

impl Default for PassChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PassChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassChain")
            .field("passes", &self.names())
            .finish()
    }
}

impl Pass for PassChain {
    fn name(&self) -> &'static str {
        "PassChain"
    }

    fn run(&self, mut graph: Graph) -> GraphResult<(Graph, PassStats)> {
        let mut stats = PassStats::new();
        for pass in &self.passes {
            let (next, pass_stats) = pass.run(graph)?;
            if pass_stats.changed() {
                log::info!(
                    "{}: {} rewrites, {} nodes removed, {} added",
                    pass.name(),
                    pass_stats.transforms_applied,
                    pass_stats.nodes_removed,
                    pass_stats.nodes_added
                );
            }
            graph = next;
            stats.merge(pass_stats);
        }
        Ok((graph, stats))
    }
}
