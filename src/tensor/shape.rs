//! Shape utilities for literal tensors
//!
//! Functions for working with tensor shapes and reshape targets.

use crate::error::{GraphResult, TransformError};

/// Calculate total number of elements from shape
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Resolve a Reshape target against the source shape
///
/// Follows ONNX Reshape semantics: `0` copies the source dimension at the same
/// index and a single `-1` is inferred from the remaining element count. The
/// resolved shape must hold exactly as many elements as the source.
pub fn resolve_reshape(source: &[usize], target: &[i64]) -> GraphResult<Vec<usize>> {
    let total = numel(source);
    let mut resolved = Vec::with_capacity(target.len());
    let mut inferred: Option<usize> = None;

    for (i, &dim) in target.iter().enumerate() {
        match dim {
            -1 => {
                if inferred.is_some() {
                    return Err(TransformError::ShapeMismatch(format!(
                        "reshape target {:?} has more than one -1",
                        target
                    )));
                }
                inferred = Some(i);
                resolved.push(1);
            }
            0 => {
                let copied = source.get(i).copied().ok_or_else(|| {
                    TransformError::ShapeMismatch(format!(
                        "reshape target {:?} copies dimension {} of rank-{} source",
                        target,
                        i,
                        source.len()
                    ))
                })?;
                resolved.push(copied);
            }
            d if d > 0 => resolved.push(d as usize),
            d => {
                return Err(TransformError::ShapeMismatch(format!(
                    "invalid dimension {} in reshape target {:?}",
                    d, target
                )));
            }
        }
    }

    let known = numel(&resolved);
    if let Some(idx) = inferred {
        if known == 0 || total % known != 0 {
            return Err(TransformError::ShapeMismatch(format!(
                "cannot reshape {} elements {:?} into {:?}",
                total, source, target
            )));
        }
        resolved[idx] = total / known;
    } else if known != total {
        return Err(TransformError::ShapeMismatch(format!(
            "cannot reshape {} elements {:?} into {:?}",
            total, source, target
        )));
    }

    Ok(resolved)
}
