//! Flat inner-product index with brute-force top-k search

use crate::error::Result;
use crate::similarity::inner_product;
use crate::vector::Vector;

/// An append-only flat index scored by inner product.
///
/// Entries are identified by insertion position: position i here
/// corresponds to entry i of whatever parallel structure the caller
/// maintains. There is no arbitrary removal: callers that need deletion
/// rebuild the index from the surviving entries (see
/// `EmbeddingStore::delete_exact`).
#[derive(Debug, Default)]
pub struct FlatIpIndex {
    vectors: Vec<Vector>,
}

impl FlatIpIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            vectors: Vec::new(),
        }
    }

    /// Append a vector, returning its position.
    pub fn add(&mut self, vector: Vector) -> usize {
        self.vectors.push(vector);
        self.vectors.len() - 1
    }

    /// Top-k entries by inner product, highest score first.
    ///
    /// Equal scores keep insertion order (lowest position wins); the sort
    /// is stable.
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<(usize, f32)>> {
        let mut results: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, vec)| Ok((pos, inner_product(query, vec)?)))
            .collect::<Result<Vec<_>>>()?;

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.vectors.clear();
    }

    /// Iterate over stored vectors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Vector> {
        self.vectors.iter()
    }

    /// The number of vectors in this index.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
