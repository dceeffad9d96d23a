//! Similarity scoring for embedding vectors

use crate::error::{MatchError, Result};
use crate::vector::Vector;

/// Compute the inner product of two vectors.
///
/// With unit-normalized inputs the inner product equals cosine similarity,
/// in the range [-1, 1].
pub fn inner_product(v1: &Vector, v2: &Vector) -> Result<f32> {
    if !v1.has_same_dimension(v2) {
        return Err(MatchError::DimensionMismatch {
            expected: v1.dimension(),
            actual: v2.dimension(),
        });
    }

    Ok(v1
        .as_slice()
        .iter()
        .zip(v2.as_slice().iter())
        .map(|(a, b)| a * b)
        .sum())
}
