//! # onnx-chain-opt
//!
//! Chain-fusion rewriter for ONNX-style model graphs.
//!
//! This crate simplifies a computation graph before it is exported to an
//! inference format limited to 4-D tensors, by collapsing short linear
//! operator chains into single equivalent operators.
//!
//! ## Features
//!
//! - **Chain Matching**: Find strictly linear windows of k nodes
//! - **Node Fusion**: Conv+Add, BatchNorm+Mul, BatchNorm+Add, Dropout removal
//! - **Rank Reduction**: Rewrite rank-6 pixel shuffle into rank-4 operators
//! - **Graph Cleanup**: Fold constant reshapes, drop unused outputs, rename edges
//!
//! ## Example
//!
//! ```ignore
//! use onnx_chain_opt::prelude::*;
//!
//! let graph = Graph::from_nodes(nodes, inputs, outputs)?;
//! let (optimized, stats) = OptimizationPipeline::default().run(graph)?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod error;
pub mod graph;
pub mod pattern;
pub mod tensor;
pub mod traits;
pub mod transform;
pub mod transformers;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use onnx_chain_opt::prelude::*`
pub mod prelude {
    pub use crate::error::{GraphResult, TransformError};
    pub use crate::graph::{make_node, AttrValue, Graph, Node, NodeId, ValueInfo};
    pub use crate::pattern::{ChainMatcher, FusionRule, RewriteContext, Window};
    pub use crate::tensor::Tensor;
    pub use crate::traits::{Pass, PassChain};
    pub use crate::transform::{fuse_chains, ChainFuser, PassStats};
    pub use crate::transformers::{OptimizationPipeline, PipelineConfig};
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{GraphResult, TransformError};
pub use traits::Pass;

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
