//! Text-to-vector embedding providers.
//!
//! The service talks to embedders through the [`Embedder`] trait. Two
//! implementations are provided: [`MiniLmEmbedder`] runs local
//! all-MiniLM-L6-v2 inference via fastembed, and [`HashingEmbedder`] is a
//! deterministic feature-hashing fallback that needs no model files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::error::{MatchError, Result};
use crate::vector::Vector;

/// Embedding dimension of all-MiniLM-L6-v2.
pub const MINILM_DIMENSION: usize = 384;

/// Default bucket count for the hashing embedder.
pub const HASHING_DIMENSION: usize = 256;

/// Maps text to a fixed-length vector.
///
/// Implementations are synchronous; the HTTP layer holds the store lock
/// for the duration of the call anyway.
pub trait Embedder: Send + Sync {
    /// Embed a single text into a vector of `dimension()` length.
    fn embed(&self, text: &str) -> Result<Vector>;

    /// Number of dimensions this embedder produces.
    fn dimension(&self) -> usize;

    /// Human-readable model name.
    fn model_name(&self) -> &str;
}

/// Local all-MiniLM-L6-v2 inference (384 dimensions).
///
/// Model files are downloaded to the fastembed cache directory on first
/// use. The session is not shareable across threads without exclusive
/// access, so it sits behind a mutex.
pub struct MiniLmEmbedder {
    model: Mutex<TextEmbedding>,
}

impl MiniLmEmbedder {
    /// Initialize the model, downloading it if not cached yet.
    pub fn new() -> Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| MatchError::Embedding(e.to_string()))?;

        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for MiniLmEmbedder {
    fn embed(&self, text: &str) -> Result<Vector> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| MatchError::Embedding("embedding model lock poisoned".to_string()))?;

        let mut batch = model
            .embed(vec![text], None)
            .map_err(|e| MatchError::Embedding(e.to_string()))?;

        let data = batch
            .pop()
            .ok_or_else(|| MatchError::Embedding("model returned no embedding".to_string()))?;

        Ok(Vector::new(data))
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }
}

/// Deterministic feature-hashing embedder.
///
/// Lowercases the input, then hashes each whitespace token and each
/// character trigram within it into a fixed number of buckets. Stable
/// across runs and machines, no model download. Scores reflect surface
/// overlap rather than semantics, which is enough for offline operation
/// and for deterministic tests.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create a hashing embedder with the given bucket count.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bump<T: Hash>(&self, buckets: &mut [f32], feature: T) {
        // DefaultHasher::new() uses fixed keys, so bucket assignment is
        // stable across processes.
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        buckets[(hasher.finish() as usize) % self.dimension] += 1.0;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(HASHING_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vector> {
        let mut buckets = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();

        for token in lowered.split_whitespace() {
            self.bump(&mut buckets, token);

            let chars: Vec<char> = token.chars().collect();
            for trigram in chars.windows(3) {
                self.bump(&mut buckets, trigram);
            }
        }

        Ok(Vector::new(buckets))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "feature-hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_is_deterministic() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("the cat sat on the mat").unwrap();
        let b = embedder.embed("the cat sat on the mat").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hashing_dimension() {
        let embedder = HashingEmbedder::new(64);
        let v = embedder.embed("hello world").unwrap();
        assert_eq!(v.dimension(), 64);
        assert_eq!(embedder.dimension(), 64);
    }

    #[test]
    fn test_hashing_distinguishes_texts() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("first text").unwrap();
        let b = embedder.embed("completely different").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hashing_is_case_insensitive() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("Hello World").unwrap();
        let b = embedder.embed("hello world").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_token_still_embeds() {
        let embedder = HashingEmbedder::default();
        let v = embedder.embed("hi").unwrap();
        assert!(v.norm() > 0.0);
    }
}
