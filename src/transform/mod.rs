//! Graph transformation module
//!
//! This module provides the rewrite driver shared by every fusion rule:
//!
//! - [`fuse_chains`]: apply one [`FusionRule`](crate::pattern::FusionRule) across a graph
//! - [`ChainFuser`]: the same, packaged as a [`Pass`](crate::traits::Pass)
//! - [`PassStats`]: what a pass did
//!
//! # Overview
//!
//! A fusion pass consumes a graph and produces a new one:
//!
//! 1. Every node, in graph order, is tried as the tail of a linear window
//! 2. Eligible windows are merged into replacement sequences
//! 3. Replacements are spliced in at the window head and adjacency is rebuilt
//!
//! # Example
//!
//! ```ignore
//! use onnx_chain_opt::transform::fuse_chains;
//! use onnx_chain_opt::transformers::eliminate::DROPOUT_RULE;
//!
//! let (graph, stats) = fuse_chains(graph, &DROPOUT_RULE)?;
//! println!("{} dropouts removed", stats.transforms_applied);
//! ```

pub mod core;
pub mod fuse;

pub use self::core::PassStats;
pub use self::fuse::{fuse_chains, ChainFuser};
