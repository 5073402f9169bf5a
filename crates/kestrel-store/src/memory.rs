//! In-memory state store.

use std::collections::BTreeMap;

use crate::StateStore;

/// `BTreeMap`-backed [`StateStore`].
///
/// Used directly in tests and as the backing view when the module is
/// embedded in a host that snapshots state per block.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.entries.insert(key.to_vec(), value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let mut store = MemStore::new();
        store.set(b"a", vec![1]);
        assert_eq!(store.get(b"a"), Some(vec![1]));
        store.delete(b"a");
        assert_eq!(store.get(b"a"), None);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut store = MemStore::new();
        store.delete(b"missing");
        assert!(store.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let mut store = MemStore::new();
        store.set(b"a", vec![1]);
        store.set(b"a", vec![2]);
        assert_eq!(store.get(b"a"), Some(vec![2]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iter_prefix_ordered() {
        let mut store = MemStore::new();
        store.set(b"w/bbb", vec![2]);
        store.set(b"w/aaa", vec![1]);
        store.set(b"x/ccc", vec![3]);
        let entries = store.iter_prefix(b"w/");
        assert_eq!(
            entries,
            vec![
                (b"w/aaa".to_vec(), vec![1]),
                (b"w/bbb".to_vec(), vec![2]),
            ]
        );
    }

    #[test]
    fn test_iter_prefix_empty() {
        let store = MemStore::new();
        assert!(store.iter_prefix(b"w/").is_empty());
    }
}
