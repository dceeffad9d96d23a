//! Embedding vector type and operations

use crate::error::{MatchError, Result};
use serde::{Deserialize, Serialize};

/// A vector in n-dimensional space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Create a new vector from a Vec<f32>
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimension of the vector
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Check if this vector has the same dimension as another
    pub fn has_same_dimension(&self, other: &Vector) -> bool {
        self.dimension() == other.dimension()
    }

    /// Compute the L2 norm (magnitude) of the vector
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize the vector to unit length
    pub fn normalize(&mut self) -> Result<()> {
        let norm = self.norm();
        if norm == 0.0 {
            return Err(MatchError::InvalidVector {
                reason: "Cannot normalize zero vector".to_string(),
            });
        }
        for x in &mut self.data {
            *x /= norm;
        }
        Ok(())
    }

    /// Create a normalized copy of the vector
    pub fn normalized(&self) -> Result<Vector> {
        let mut v = self.clone();
        v.normalize()?;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector_creation() {
        let v = Vector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.dimension(), 3);
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_vector_norm() {
        let v = Vector::new(vec![3.0, 4.0]);
        assert_relative_eq!(v.norm(), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_vector_normalize() {
        let mut v = Vector::new(vec![3.0, 4.0]);
        v.normalize().unwrap();
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.as_slice()[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(v.as_slice()[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_fails() {
        let mut v = Vector::new(vec![0.0, 0.0, 0.0]);
        assert!(matches!(
            v.normalize(),
            Err(MatchError::InvalidVector { .. })
        ));
    }

    #[test]
    fn test_normalized_leaves_original_untouched() {
        let v = Vector::new(vec![2.0, 0.0]);
        let unit = v.normalized().unwrap();
        assert_relative_eq!(unit.norm(), 1.0, epsilon = 1e-6);
        assert_eq!(v.as_slice(), &[2.0, 0.0]);
    }
}
