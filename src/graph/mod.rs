//! Graph model for chain rewriting
//!
//! This module provides the IR the passes operate on:
//!
//! - [`Graph`]: ordered node owner with index-based adjacency
//! - [`Node`]: operator instance with typed attributes and literal tensors
//! - [`AttrValue`]: tagged attribute value
//! - [`maps`]: lookup tables and their builders
//!
//! # Overview
//!
//! Nodes never reference each other directly. Parent and child sets are
//! `NodeId` lists resolved through a producer table, and they are rebuilt
//! whenever a pass produces a new graph.
//!
//! # Example
//!
//! ```ignore
//! use onnx_chain_opt::graph::{make_node, Graph, ValueInfo};
//!
//! let graph = Graph::from_nodes(
//!     vec![
//!         make_node("Conv", &["X", "W"], &["conv_out"], "conv_0"),
//!         make_node("Relu", &["conv_out"], &["Y"], "relu_0"),
//!     ],
//!     vec![ValueInfo::new("X", &[1, 3, 224, 224])],
//!     vec![ValueInfo::new("Y", &[1, 16, 222, 222])],
//! )?;
//!
//! let conv = graph.id_of("conv_0").unwrap();
//! for child in graph.children(conv) {
//!     println!("{}", graph.node(*child).name);
//! }
//! ```
//!
//! # Maps
//!
//! | Map | Description |
//! |-----|-------------|
//! | `producer_map` | output edge → producer node |
//! | `consumer_map` | edge → consumer nodes |
//! | `name_map` | node name → node |
//! | `parents` / `children` | per-node adjacency sets |

pub mod accessors;
pub mod attr;
pub mod context;
pub mod maps;
pub mod node;
pub mod validation;

// Re-export main types
pub use attr::{AttrValue, Attributes};
pub use context::Graph;
pub use maps::{unique_name, ConsumerMap, NameMap, NodeId, NodeSet, ProducerMap};
pub use node::{make_node, Node, ValueInfo};
pub use validation::{check_graph, ValidationResult};
