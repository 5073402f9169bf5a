//! # kestrel-store
//!
//! The in-process key-value state view used by the Kestrel modules.
//!
//! Every block executes against a single [`StateStore`]; atomicity across a
//! block is the host chain's responsibility, so the store itself is a plain
//! ordered map interface with deterministic prefix iteration. Records are
//! encoded as JSON, which keeps stored bytes self-describing and lets schema
//! migrations recover fields from raw legacy data.
//!
//! ## Modules
//!
//! - [`memory`] — `BTreeMap`-backed [`StateStore`] for tests and embedding

pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error types for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A stored record could not be encoded or decoded.
    #[error("codec error for key {key}: {reason}")]
    Codec {
        /// Hex-free, human-readable rendering of the key.
        key: String,
        /// The underlying serde_json failure.
        reason: String,
    },
}

/// Convenience result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Ordered key-value view of module state.
///
/// Iteration order over a prefix is ascending by key bytes, which makes
/// every fold over stored records deterministic.
pub trait StateStore {
    /// Raw bytes stored under `key`, if any.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Store raw bytes under `key`, replacing any prior value.
    fn set(&mut self, key: &[u8], value: Vec<u8>);

    /// Delete the value under `key`. Deleting an absent key is a no-op.
    fn delete(&mut self, key: &[u8]);

    /// All `(key, value)` pairs whose key starts with `prefix`, in ascending
    /// key order.
    fn iter_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;
}

/// Decode the typed record stored under `key`, if present.
///
/// # Errors
///
/// - [`StoreError::Codec`] if stored bytes exist but do not decode as `T`
pub fn get_typed<S: StateStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &[u8],
) -> Result<Option<T>> {
    match store.get(key) {
        None => Ok(None),
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Codec {
                key: String::from_utf8_lossy(key).into_owned(),
                reason: e.to_string(),
            }),
    }
}

/// Encode `value` and store it under `key`.
///
/// # Errors
///
/// - [`StoreError::Codec`] if the value cannot be encoded
pub fn set_typed<S: StateStore + ?Sized, T: Serialize>(
    store: &mut S,
    key: &[u8],
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Codec {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: e.to_string(),
    })?;
    store.set(key, bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::memory::MemStore;
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Record {
        name: String,
        amount: u64,
    }

    #[test]
    fn test_typed_roundtrip() {
        let mut store = MemStore::new();
        let record = Record {
            name: "pool".to_string(),
            amount: 42,
        };
        set_typed(&mut store, b"record/1", &record).expect("set");
        let loaded: Option<Record> = get_typed(&store, b"record/1").expect("get");
        assert_eq!(loaded, Some(record));
    }

    #[test]
    fn test_typed_absent_is_none() {
        let store = MemStore::new();
        let loaded: Option<Record> = get_typed(&store, b"record/missing").expect("get");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_typed_corrupt_bytes_error() {
        let mut store = MemStore::new();
        store.set(b"record/1", b"not json".to_vec());
        let loaded: Result<Option<Record>> = get_typed(&store, b"record/1");
        assert!(loaded.is_err());
    }
}
