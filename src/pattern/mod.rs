//! Chain pattern matching
//!
//! This module provides the matching half of the rewrite engine:
//!
//! 1. [`ChainMatcher`] finds strictly linear windows of a given length
//! 2. [`FusionRule`] describes what to do with a window
//! 3. [`ops`] names the op-type sequences the built-in rules look for
//!
//! # Example
//!
//! ```ignore
//! use onnx_chain_opt::pattern::{ChainMatcher, ops};
//!
//! let matcher = ChainMatcher::new(&graph);
//!
//! for window in matcher.find_all_windows(2) {
//!     let nodes = window.nodes(&graph);
//!     if ops::ops_match(&nodes, ops::CONV_ADD) {
//!         println!("Found fusible pair: {} -> {}", nodes[0].name, nodes[1].name);
//!     }
//! }
//! ```

pub mod matcher;
pub mod ops;
pub mod rule;

// Re-export main types
pub use matcher::{ChainMatcher, Window};
pub use ops::{ops_match, BN_ADD, BN_MUL, CONV_ADD, PIXEL_SHUFFLE};
pub use rule::{default_merge, EligibilityFn, FusionRule, MergeFn, RewriteContext};
