//! Embedding store service: the orchestration layer over embedder, index,
//! and snapshots.

use std::path::Path;

use tracing::{debug, info};

use crate::embedding::Embedder;
use crate::error::{MatchError, Result};
use crate::flat_index::FlatIpIndex;
use crate::persistence::serialization::{StoreSnapshot, SNAPSHOT_VERSION};
use crate::persistence::snapshot::SnapshotManager;

/// Default similarity threshold for [`EmbeddingStore::check`].
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.55;

/// A nearest-neighbor match.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub text: String,
    pub score: f32,
}

/// Outcome of thresholding the nearest neighbor into a yes/no decision.
#[derive(Debug, Clone)]
pub struct MatchDecision {
    pub matched: bool,
    pub matched_text: Option<String>,
    pub similarity_score: Option<f32>,
}

/// Stores text snippets alongside their embeddings and answers
/// nearest-neighbor queries by cosine similarity.
///
/// Invariants: the index and the text list stay positionally aligned
/// (`index.len() == texts.len()` after any completed operation), and every
/// stored vector is unit-normalized so inner-product search yields cosine
/// similarity.
pub struct EmbeddingStore {
    embedder: Box<dyn Embedder>,
    index: FlatIpIndex,
    texts: Vec<String>,
    snapshots: Option<SnapshotManager>,
    threshold: f32,
}

impl EmbeddingStore {
    /// Create a store with no on-disk persistence.
    pub fn in_memory(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            index: FlatIpIndex::new(),
            texts: Vec::new(),
            snapshots: None,
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    /// Open a persistent store, restoring any snapshot found in `data_dir`.
    ///
    /// Fails if the snapshot's vector and text counts disagree, or if its
    /// dimension does not match the embedder's.
    pub fn open(embedder: Box<dyn Embedder>, data_dir: impl AsRef<Path>) -> Result<Self> {
        let snapshots = SnapshotManager::new(data_dir)?;
        let mut index = FlatIpIndex::new();
        let mut texts = Vec::new();

        if let Some(snapshot) = snapshots.load()? {
            if snapshot.vectors.len() != snapshot.texts.len() {
                return Err(MatchError::SnapshotInconsistent {
                    vectors: snapshot.vectors.len(),
                    texts: snapshot.texts.len(),
                });
            }
            if let Some(dimension) = snapshot.dimension {
                if dimension != embedder.dimension() {
                    return Err(MatchError::DimensionMismatch {
                        expected: embedder.dimension(),
                        actual: dimension,
                    });
                }
            }

            for vector in snapshot.vectors {
                index.add(vector);
            }
            texts = snapshot.texts;
            info!(count = texts.len(), "restored snapshot");
        }

        Ok(Self {
            embedder,
            index,
            texts,
            snapshots: Some(snapshots),
            threshold: DEFAULT_MATCH_THRESHOLD,
        })
    }

    /// Set the similarity threshold used by [`check`](Self::check).
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Embed `text` and append it to the index and the text list.
    pub fn add(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(MatchError::EmptyText);
        }

        let vector = self.embedder.embed(text)?.normalized()?;
        self.index.add(vector);
        self.texts.push(text.to_string());
        self.persist()?;

        debug!(stored = self.texts.len(), "added embedding");
        Ok(())
    }

    /// The nearest stored text to `text`, or None when nothing is stored.
    pub fn query(&self, text: &str) -> Result<Option<Match>> {
        Ok(self.query_k(text, 1)?.into_iter().next())
    }

    /// Top-k nearest stored texts, highest similarity first.
    ///
    /// Equal scores come back in insertion order.
    pub fn query_k(&self, text: &str, k: usize) -> Result<Vec<Match>> {
        if text.is_empty() {
            return Err(MatchError::EmptyText);
        }
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text)?.normalized()?;
        let hits = self.index.search(&query, k)?;

        Ok(hits
            .into_iter()
            .map(|(pos, score)| Match {
                text: self.texts[pos].clone(),
                score,
            })
            .collect())
    }

    /// Threshold the nearest neighbor into a yes/no match decision.
    ///
    /// The score is reported even when it falls below the threshold; the
    /// matched text is only reported on a positive decision.
    pub fn check(&self, text: &str) -> Result<MatchDecision> {
        Ok(match self.query(text)? {
            Some(hit) if hit.score >= self.threshold => MatchDecision {
                matched: true,
                matched_text: Some(hit.text),
                similarity_score: Some(hit.score),
            },
            Some(hit) => MatchDecision {
                matched: false,
                matched_text: None,
                similarity_score: Some(hit.score),
            },
            None => MatchDecision {
                matched: false,
                matched_text: None,
                similarity_score: None,
            },
        })
    }

    /// Remove every entry whose text is exactly equal to `text`, returning
    /// how many were removed. Matching is case- and whitespace-sensitive.
    ///
    /// The flat index has no arbitrary removal, so any removal rebuilds
    /// the whole index by re-embedding each surviving text, at O(n)
    /// embedding cost.
    pub fn delete_exact(&mut self, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Err(MatchError::EmptyText);
        }

        let before = self.texts.len();
        self.texts.retain(|stored| stored != text);
        let removed = before - self.texts.len();
        if removed == 0 {
            return Ok(0);
        }

        self.rebuild_index()?;
        self.persist()?;

        info!(removed, remaining = self.texts.len(), "deleted matching texts");
        Ok(removed)
    }

    /// Drop every stored entry and remove snapshot files from disk.
    /// Idempotent.
    pub fn delete_all(&mut self) -> Result<()> {
        self.index.clear();
        self.texts.clear();
        if let Some(snapshots) = &self.snapshots {
            snapshots.delete()?;
        }

        info!("deleted all embeddings");
        Ok(())
    }

    /// Stored texts, verbatim, in insertion order.
    pub fn list(&self) -> &[String] {
        &self.texts
    }

    /// The number of stored texts.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Model name of the configured embedder.
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// The similarity threshold used by [`check`](Self::check).
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn rebuild_index(&mut self) -> Result<()> {
        self.index.clear();
        for stored in &self.texts {
            let vector = self.embedder.embed(stored)?.normalized()?;
            self.index.add(vector);
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let Some(snapshots) = &self.snapshots else {
            return Ok(());
        };

        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            texts: self.texts.clone(),
            vectors: self.index.iter().cloned().collect(),
            dimension: Some(self.embedder.dimension()),
        };
        snapshots.save(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use approx::assert_relative_eq;

    fn store() -> EmbeddingStore {
        EmbeddingStore::in_memory(Box::new(HashingEmbedder::default()))
    }

    #[test]
    fn test_add_and_self_query() {
        let mut store = store();
        store.add("hello world").unwrap();
        assert_eq!(store.len(), 1);

        let hit = store.query("hello world").unwrap().unwrap();
        assert_eq!(hit.text, "hello world");
        assert_relative_eq!(hit.score, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut store = store();
        assert!(matches!(store.add(""), Err(MatchError::EmptyText)));
        assert!(matches!(store.query(""), Err(MatchError::EmptyText)));
        assert!(matches!(store.delete_exact(""), Err(MatchError::EmptyText)));
    }

    #[test]
    fn test_query_empty_store() {
        let store = store();
        assert!(store.query("anything").unwrap().is_none());
    }

    #[test]
    fn test_duplicates_each_get_an_entry() {
        let mut store = store();
        store.add("twice").unwrap();
        store.add("twice").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_exact_rebuilds() {
        let mut store = store();
        store.add("drop me").unwrap();
        store.add("keep me").unwrap();
        store.add("drop me").unwrap();

        assert_eq!(store.delete_exact("drop me").unwrap(), 2);
        assert_eq!(store.list(), ["keep me"]);

        let hit = store.query("keep me").unwrap().unwrap();
        assert_eq!(hit.text, "keep me");
    }

    #[test]
    fn test_delete_exact_no_match() {
        let mut store = store();
        store.add("present").unwrap();
        assert_eq!(store.delete_exact("absent").unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_check_thresholds() {
        let mut store = store().with_threshold(0.99);
        store.add("guardrail phrase").unwrap();

        let hit = store.check("guardrail phrase").unwrap();
        assert!(hit.matched);
        assert_eq!(hit.matched_text.as_deref(), Some("guardrail phrase"));

        let miss = store.check("something else entirely").unwrap();
        assert!(!miss.matched);
        assert!(miss.matched_text.is_none());
        assert!(miss.similarity_score.is_some());
    }

    #[test]
    fn test_check_empty_store() {
        let store = store();
        let decision = store.check("anything").unwrap();
        assert!(!decision.matched);
        assert!(decision.matched_text.is_none());
        assert!(decision.similarity_score.is_none());
    }
}
