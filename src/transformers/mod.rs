//! Graph rewrite passes
//!
//! This module provides the concrete rewrites and the pipeline that runs them:
//!
//! - **Fusion**: collapse linear chains (Conv+Add, BatchNorm+Mul/Add, pixel shuffle)
//! - **Elimination**: drop inference no-ops (Dropout)
//! - **Folding**: evaluate Reshape of literal tensors
//! - **Cleanup**: drop unused outputs, rename edges
//!
//! # Overview
//!
//! Fusion rules are [`FusionRule`] descriptors driven by
//! [`ChainFuser`]; the other rewrites implement [`Pass`] directly.
//! Everything can be applied individually or through [`OptimizationPipeline`].
//!
//! # Example
//!
//! ```ignore
//! use onnx_chain_opt::transformers::{OptimizationPipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default().rename_output("prob_raw", "prob");
//! let (graph, stats) = OptimizationPipeline::new(config).run(graph)?;
//!
//! println!("{} rewrites, {} nodes removed", stats.transforms_applied, stats.nodes_removed);
//! ```

/// Cleanup passes
pub mod cleanup;
/// Shared eligibility helpers
pub mod common;
/// Constant Reshape folding
pub mod constant_fold;
/// Elimination rules
pub mod eliminate;
/// Fuse BatchNormalization + Mul/Add
pub mod fuse_bn;
/// Fuse Conv + Add
pub mod fuse_conv_add;
/// Pixel shuffle rewrite
pub mod fuse_pixel_shuffle;

pub use cleanup::{RemoveDanglingOutputs, RenameOutputs};
pub use constant_fold::{fold_constant_reshapes, FoldConstantReshape};
pub use eliminate::DROPOUT_RULE;
pub use fuse_bn::{ADD_RULE as BN_ADD_RULE, MUL_RULE as BN_MUL_RULE};
pub use fuse_conv_add::RULE as CONV_ADD_RULE;
pub use fuse_pixel_shuffle::RULE as PIXEL_SHUFFLE_RULE;

use indexmap::IndexMap;

use crate::error::GraphResult;
use crate::graph::{check_graph, Graph};
use crate::pattern::FusionRule;
use crate::traits::{Pass, PassChain};
use crate::transform::{ChainFuser, PassStats};

/// Built-in fusion rules, in the order the pipeline applies them
pub const FUSION_RULES: &[FusionRule] = &[
    DROPOUT_RULE,
    CONV_ADD_RULE,
    BN_MUL_RULE,
    BN_ADD_RULE,
    PIXEL_SHUFFLE_RULE,
];

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Fold Reshape of literal tensors
    pub fold_constant_reshape: bool,
    /// Remove Dropout nodes
    pub remove_dropout: bool,
    /// Fuse Conv + broadcast Add
    pub fuse_conv_add: bool,
    /// Fuse BatchNormalization + broadcast Mul
    pub fuse_bn_mul: bool,
    /// Fuse BatchNormalization + broadcast Add
    pub fuse_bn_add: bool,
    /// Rewrite rank-6 pixel shuffle chains
    pub fuse_pixel_shuffle: bool,
    /// Drop outputs nothing reads
    pub remove_dangling_outputs: bool,
    /// Output renames, applied last
    pub output_renames: IndexMap<String, String>,
    /// Maximum rounds of the fusion stage
    pub max_iterations: usize,
    /// Validate the graph before running
    pub validate_input: bool,
    /// Validate the graph after running
    pub validate_output: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fold_constant_reshape: true,
            remove_dropout: true,
            fuse_conv_add: true,
            fuse_bn_mul: true,
            fuse_bn_add: true,
            fuse_pixel_shuffle: true,
            remove_dangling_outputs: true,
            output_renames: IndexMap::new(),
            max_iterations: 3,
            validate_input: false,
            validate_output: false,
        }
    }
}

impl PipelineConfig {
    /// Enable only fusion and elimination rules
    pub fn fuse_only() -> Self {
        Self {
            fold_constant_reshape: false,
            remove_dangling_outputs: false,
            ..Self::default()
        }
    }

    /// Enable only folding and cleanup passes
    pub fn cleanup_only() -> Self {
        Self {
            remove_dropout: false,
            fuse_conv_add: false,
            fuse_bn_mul: false,
            fuse_bn_add: false,
            fuse_pixel_shuffle: false,
            max_iterations: 1,
            ..Self::default()
        }
    }

    /// Add an output rename
    pub fn rename_output(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.output_renames.insert(old.into(), new.into());
        self
    }

    /// Set the fusion round limit
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Validate before and/or after running
    pub fn with_validation(mut self, input: bool, output: bool) -> Self {
        self.validate_input = input;
        self.validate_output = output;
        self
    }

    /// Whether a built-in fusion rule is enabled
    pub fn rule_enabled(&self, rule: &FusionRule) -> bool {
        match rule.name {
            n if n == DROPOUT_RULE.name => self.remove_dropout,
            n if n == CONV_ADD_RULE.name => self.fuse_conv_add,
            n if n == BN_MUL_RULE.name => self.fuse_bn_mul,
            n if n == BN_ADD_RULE.name => self.fuse_bn_add,
            n if n == PIXEL_SHUFFLE_RULE.name => self.fuse_pixel_shuffle,
            _ => false,
        }
    }
}

/// Optimization pipeline
///
/// The default stages are:
/// 1. fusion: constant Reshape folding followed by the enabled
///    [`FUSION_RULES`], repeated until a round changes nothing or
///    `max_iterations` rounds have run
/// 2. cleanup: dangling-output removal, then output renaming
#[derive(Debug)]
pub struct OptimizationPipeline {
    config: PipelineConfig,
    custom: Option<PassChain>,
}

impl Default for OptimizationPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl OptimizationPipeline {
    /// Create a pipeline from a configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            custom: None,
        }
    }

    /// Run a caller-chosen pass list once, in order
    pub fn with_passes(passes: Vec<Box<dyn Pass>>) -> Self {
        let mut chain = PassChain::new();
        for pass in passes {
            chain.push(pass);
        }
        Self {
            config: PipelineConfig::default(),
            custom: Some(chain),
        }
    }

    /// Replace the configuration (validation flags apply to custom pass lists too)
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Passes of the repeated fusion stage
    pub fn fusion_stage(&self) -> PassChain {
        let mut chain = PassChain::new();
        if self.config.fold_constant_reshape {
            chain.push(Box::new(FoldConstantReshape));
        }
        for rule in FUSION_RULES.iter().filter(|r| self.config.rule_enabled(r)) {
            chain.push(Box::new(ChainFuser::new(*rule)));
        }
        chain
    }

    /// Passes of the final cleanup stage
    pub fn cleanup_stage(&self) -> PassChain {
        let mut chain = PassChain::new();
        if self.config.remove_dangling_outputs {
            chain.push(Box::new(RemoveDanglingOutputs));
        }
        if !self.config.output_renames.is_empty() {
            chain.push(Box::new(RenameOutputs::new(self.config.output_renames.clone())));
        }
        chain
    }

    /// Run the pipeline
    pub fn run(&self, graph: Graph) -> GraphResult<(Graph, PassStats)> {
        if self.config.validate_input {
            check_graph(&graph)?;
        }
        let nodes_before = graph.len();

        let (graph, stats) = match &self.custom {
            Some(chain) => chain.run(graph)?,
            None => self.run_stages(graph)?,
        };

        if self.config.validate_output {
            check_graph(&graph)?;
        }
        log::info!(
            "optimized graph: {} -> {} nodes, {} rewrites, {} outputs dropped, {} edges renamed",
            nodes_before,
            graph.len(),
            stats.transforms_applied,
            stats.outputs_dropped,
            stats.edges_renamed
        );
        Ok((graph, stats))
    }

    fn run_stages(&self, mut graph: Graph) -> GraphResult<(Graph, PassStats)> {
        let mut total = PassStats::new();

        let fusion = self.fusion_stage();
        if !fusion.is_empty() {
            for round in 1..=self.config.max_iterations {
                let (next, stats) = fusion.run(graph)?;
                graph = next;
                let changed = stats.changed();
                log::info!(
                    "fusion round {}: {} rewrites, {} nodes",
                    round,
                    stats.transforms_applied,
                    graph.len()
                );
                total.merge(stats);

                // Stop if no progress
                if !changed {
                    break;
                }
            }
        }

        let (graph, stats) = self.cleanup_stage().run(graph)?;
        total.merge(stats);
        Ok((graph, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{make_node, ValueInfo};
    use crate::tensor::{vec_to_tensor_f32, Tensor};
    use ndarray::{ArrayD, IxDyn};

    fn make_test_graph() -> Graph {
        Graph::from_nodes(
            vec![
                make_node("Conv", &["X", "W"], &["conv_out"], "conv_0")
                    .with_tensor("W", Tensor::Float(ArrayD::from_elem(IxDyn(&[2, 1, 1, 1]), 1.0))),
                make_node("Add", &["conv_out", "B"], &["add_out"], "add_0")
                    .with_attr("broadcast", 1i64)
                    .with_attr("axis", 1i64)
                    .with_tensor("B", vec_to_tensor_f32(&[1.0, 2.0])),
                make_node("Dropout", &["add_out"], &["drop_out", "mask"], "dropout_0"),
                make_node("Relu", &["drop_out"], &["Y"], "relu_0"),
            ],
            vec![ValueInfo::new("X", &[1, 1, 4, 4])],
            vec![ValueInfo::new("Y", &[1, 2, 4, 4])],
        )
        .unwrap()
    }

    #[test]
    fn test_optimization_pipeline() {
        let pipeline = OptimizationPipeline::new(PipelineConfig::default().with_validation(true, true));
        let (graph, stats) = pipeline.run(make_test_graph()).unwrap();

        // Dropout removed, Add folded into Conv bias, mask output dropped
        assert_eq!(graph.len(), 2);
        assert_eq!(stats.transforms_applied, 2);
        assert_eq!(stats.outputs_dropped, 1);

        let conv = graph.node_by_name("conv_0").unwrap();
        assert_eq!(conv.inputs.len(), 3);
        assert_eq!(conv.outputs, vec!["drop_out"]);
    }

    #[test]
    fn test_fuse_only_keeps_outputs() {
        let pipeline = OptimizationPipeline::new(PipelineConfig::fuse_only());
        let (graph, stats) = pipeline.run(make_test_graph()).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(stats.outputs_dropped, 0);
        assert_eq!(graph.node_by_name("conv_0").unwrap().outputs, vec!["drop_out", "mask"]);
    }

    #[test]
    fn test_cleanup_only() {
        let pipeline = OptimizationPipeline::new(PipelineConfig::cleanup_only().rename_output("Y", "prob"));
        let (graph, stats) = pipeline.run(make_test_graph()).unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(stats.transforms_applied, 0);
        assert_eq!(stats.edges_renamed, 1);
        assert_eq!(graph.outputs()[0].name, "prob");
    }

    #[test]
    fn test_stage_composition() {
        let pipeline = OptimizationPipeline::default();
        assert_eq!(
            pipeline.fusion_stage().names(),
            vec![
                "FoldConstantReshape",
                "EliminateDropout",
                "FuseConvAdd",
                "FuseBNMul",
                "FuseBNAdd",
                "FusePixelShuffle"
            ]
        );
        assert_eq!(pipeline.cleanup_stage().names(), vec!["RemoveDanglingOutputs"]);

        let mut config = PipelineConfig::default();
        config.fuse_bn_mul = false;
        let pipeline = OptimizationPipeline::new(config);
        assert!(!pipeline.fusion_stage().names().contains(&"FuseBNMul"));
    }

    #[test]
    fn test_custom_passes_run_once() {
        let pipeline = OptimizationPipeline::with_passes(vec![
            Box::new(ChainFuser::new(DROPOUT_RULE)),
            Box::new(RemoveDanglingOutputs),
        ]);
        let (graph, stats) = pipeline.run(make_test_graph()).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(stats.transforms_applied, 1);
        assert_eq!(graph.node_by_name("add_0").unwrap().outputs, vec!["drop_out"]);
    }

    #[test]
    fn test_input_validation_rejects_broken_graph() {
        let graph = Graph::from_nodes(
            vec![make_node("Relu", &["missing"], &["Y"], "relu")],
            vec![],
            vec![ValueInfo::new("Y", &[1])],
        )
        .unwrap();

        let pipeline = OptimizationPipeline::new(PipelineConfig::default().with_validation(true, false));
        assert!(pipeline.run(graph).is_err());
    }
}
