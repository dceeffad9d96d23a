//! Serialization: bincode for the snapshot record, JSON for the manifest.

use crate::error::{MatchError, Result};
use crate::vector::Vector;
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The full persisted state: stored texts and their vectors, positionally
/// aligned (vectors[i] embeds texts[i]).
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub texts: Vec<String>,
    pub vectors: Vec<Vector>,
    pub dimension: Option<usize>,
}

/// Encode data to bincode bytes.
pub fn to_bincode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| MatchError::Serialization(e.to_string()))
}

/// Decode data from bincode bytes.
pub fn from_bincode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| MatchError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            texts: vec!["first".to_string(), "second".to_string()],
            vectors: vec![
                Vector::new(vec![1.0, 0.0]),
                Vector::new(vec![0.0, 1.0]),
            ],
            dimension: Some(2),
        };

        let bytes = to_bincode(&snapshot).unwrap();
        let decoded: StoreSnapshot = from_bincode(&bytes).unwrap();

        assert_eq!(decoded.version, SNAPSHOT_VERSION);
        assert_eq!(decoded.texts, vec!["first", "second"]);
        assert_eq!(decoded.vectors[1].as_slice(), &[0.0, 1.0]);
        assert_eq!(decoded.dimension, Some(2));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let result: Result<StoreSnapshot> = from_bincode(&[0xff, 0x01, 0x02]);
        assert!(matches!(result, Err(MatchError::Serialization(_))));
    }
}
