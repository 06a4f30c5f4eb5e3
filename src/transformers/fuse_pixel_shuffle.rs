//! Pixel shuffle rewrite
//!
//! PyTorch exports `pixel_shuffle` (depth-to-space) as three operators:
//!
//! - Reshape `[1, C, s, s, H, W]`
//! - Transpose `[0, 1, 4, 2, 5, 3]`
//! - Reshape `[1, C, H*s, W*s]`
//!
//! 4-D limited targets cannot hold the rank-6 intermediate, so the chain is
//! rewritten into an equivalent sequence that never exceeds rank 4:
//!
//! - Reshape `[C, s*s, H, W]`
//! - Transpose `[0, 2, 1, 3]`
//! - Reshape `[C*H, s, s, W]`
//! - Transpose `[0, 1, 3, 2]`
//! - Reshape `[1, C, H*s, W*s]`

use crate::error::{GraphResult, TransformError};
use crate::graph::{Graph, Node};
use crate::pattern::ops::{RESHAPE, TRANSPOSE};
use crate::pattern::{ops_match, FusionRule, RewriteContext, PIXEL_SHUFFLE};

use super::common::feeds_data_input;

/// Rank-6 Reshape → Transpose → Reshape depth-to-space chain
pub const RULE: FusionRule = FusionRule::new("FusePixelShuffle", 3, is_eligible).with_merge(merge);

const SHUFFLE_PERM: [i64; 6] = [0, 1, 4, 2, 5, 3];

/// Base name for the inserted Reshape node and its output edge
pub const RESHAPE_BASE: &str = "pixel_shuffle_reshape";
/// Base name for the inserted Transpose node and its output edge
pub const TRANSPOSE_BASE: &str = "pixel_shuffle_transpose";

/// Parsed `[1, C, s, s, H, W]` geometry
///
/// The products the rewrite emits are computed once, and a shape whose
/// products overflow `i64` does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Geometry {
    channels: i64,
    scale: i64,
    height: i64,
    width: i64,
    /// `s * s`
    area: i64,
    /// `C * H`
    rows: i64,
    out_height: i64,
    out_width: i64,
}

impl Geometry {
    fn from_first_reshape(node: &Node) -> Option<Self> {
        match *node.attr_ints("shape").ok()? {
            [1, channels, scale, s2, height, width]
                if scale == s2 && [channels, scale, height, width].iter().all(|&d| d > 0) =>
            {
                Some(Self {
                    channels,
                    scale,
                    height,
                    width,
                    area: scale.checked_mul(scale)?,
                    rows: channels.checked_mul(height)?,
                    out_height: height.checked_mul(scale)?,
                    out_width: width.checked_mul(scale)?,
                })
            }
            _ => None,
        }
    }

    fn output_shape(&self) -> [i64; 4] {
        [1, self.channels, self.out_height, self.out_width]
    }
}

fn is_eligible(_graph: &Graph, window: &[&Node]) -> bool {
    if !ops_match(window, PIXEL_SHUFFLE) {
        return false;
    }
    let (reshape_1, transpose, reshape_2) = (window[0], window[1], window[2]);
    if !feeds_data_input(reshape_1, transpose) || !feeds_data_input(transpose, reshape_2) {
        return false;
    }

    let Some(geometry) = Geometry::from_first_reshape(reshape_1) else {
        return false;
    };
    if transpose.attr_ints("perm").ok() != Some(&SHUFFLE_PERM[..]) {
        return false;
    }
    reshape_2.attr_ints("shape").ok() == Some(&geometry.output_shape()[..])
}

fn merge(ctx: &mut RewriteContext<'_>, window: Vec<Node>) -> GraphResult<Vec<Node>> {
    let mut nodes = window.into_iter();
    let (Some(mut reshape_1), Some(mut transpose_1), Some(mut final_reshape)) =
        (nodes.next(), nodes.next(), nodes.next())
    else {
        return Err(TransformError::Internal(
            "pixel shuffle rewrite needs a window of three nodes".to_string(),
        ));
    };

    let Geometry {
        channels,
        scale,
        height,
        width,
        area,
        rows,
        ..
    } = Geometry::from_first_reshape(&reshape_1).ok_or_else(|| {
        TransformError::InvalidNode(format!(
            "{} is not a [1, C, s, s, H, W] reshape",
            reshape_1.name
        ))
    })?;

    reshape_1.set_attr("shape", vec![channels, area, height, width]);
    transpose_1.set_attr("perm", vec![0i64, 2, 1, 3]);

    // transpose_1 keeps its output edge; two fresh edges carry the new nodes
    let transposed = transpose_1.outputs.first().cloned().ok_or_else(|| {
        TransformError::InvalidNode(format!("{} has no outputs", transpose_1.name))
    })?;
    transpose_1.outputs.truncate(1);

    let reshape_out = ctx.unique_edge_name(RESHAPE_BASE);
    let reshape_2 = Node::new(
        RESHAPE,
        &ctx.unique_node_name(RESHAPE_BASE),
        &[transposed.as_str()],
        &[reshape_out.as_str()],
    )
    .with_attr("shape", vec![rows, scale, scale, width]);

    let transpose_out = ctx.unique_edge_name(TRANSPOSE_BASE);
    let transpose_2 = Node::new(
        TRANSPOSE,
        &ctx.unique_node_name(TRANSPOSE_BASE),
        &[reshape_out.as_str()],
        &[transpose_out.as_str()],
    )
    .with_attr("perm", vec![0i64, 1, 3, 2]);

    match final_reshape.inputs.first_mut() {
        Some(input) => *input = transpose_out,
        None => {
            return Err(TransformError::InvalidNode(format!(
                "{} has no data input",
                final_reshape.name
            )))
        }
    }

    Ok(vec![reshape_1, transpose_1, reshape_2, transpose_2, final_reshape])
}
