//! # textmatch
//!
//! A minimal semantic text-matching service.
//!
//! Text snippets are embedded into unit-normalized vectors, stored in a
//! flat inner-product index alongside the source texts, and queried by
//! cosine similarity. State is snapshotted to disk after every mutation
//! and restored once at startup.
//!
//! ## Example
//!
//! ```rust
//! use textmatch::embedding::HashingEmbedder;
//! use textmatch::store::EmbeddingStore;
//!
//! let mut store = EmbeddingStore::in_memory(Box::new(HashingEmbedder::default()));
//! store.add("forbidden phrase").unwrap();
//!
//! let hit = store.query("forbidden phrase").unwrap().unwrap();
//! assert_eq!(hit.text, "forbidden phrase");
//! ```

pub mod embedding;
pub mod error;
pub mod flat_index;
pub mod metrics;
pub mod persistence;
pub mod server;
pub mod similarity;
pub mod store;
pub mod vector;

pub use embedding::{Embedder, HashingEmbedder, MiniLmEmbedder};
pub use error::{MatchError, Result};
pub use flat_index::FlatIpIndex;
pub use store::{EmbeddingStore, Match, MatchDecision, DEFAULT_MATCH_THRESHOLD};
pub use vector::Vector;
