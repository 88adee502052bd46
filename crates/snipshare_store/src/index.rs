//! Secondary indexes.

use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A key that can be indexed.
pub trait IndexKey: Clone + Eq + Hash + Ord + Send + Sync + 'static {}

impl IndexKey for String {}
impl IndexKey for RecordId {}
impl IndexKey for i64 {}

/// Two-field composite key, ordered lexicographically by (first, second).
///
/// Used for indexes that key on a pair of fields, such as the unique
/// (user, snippet) star membership index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey<A: IndexKey, B: IndexKey> {
    /// First key component.
    pub first: A,
    /// Second key component.
    pub second: B,
}

impl<A: IndexKey, B: IndexKey> PairKey<A, B> {
    /// Creates a new composite key.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: IndexKey, B: IndexKey> IndexKey for PairKey<A, B> {}

/// Specification for an index on a collection.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    /// Name of the collection this index belongs to.
    pub collection: &'static str,
    /// Name of the index.
    pub name: &'static str,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexSpec {
    /// Creates a new index specification.
    pub fn new(collection: &'static str, name: &'static str) -> Self {
        Self {
            collection,
            name,
            unique: false,
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Hash-based index for equality lookups.
///
/// Stores a mapping from key to a set of record IDs. When built with a
/// unique [`IndexSpec`], inserting a second record under an occupied key
/// fails with [`StoreError::UniqueViolation`].
pub struct HashIndex<K: IndexKey> {
    spec: IndexSpec,
    entries: HashMap<K, HashSet<RecordId>>,
    count: usize,
}

impl<K: IndexKey> HashIndex<K> {
    /// Creates a new hash index.
    pub fn new(spec: IndexSpec) -> Self {
        Self {
            spec,
            entries: HashMap::new(),
            count: 0,
        }
    }

    /// Returns the index specification.
    pub fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    /// Inserts a key-record mapping.
    ///
    /// For unique indexes, fails if the key is already mapped to a
    /// different record.
    pub fn insert(&mut self, key: K, record_id: RecordId) -> StoreResult<()> {
        if self.spec.unique {
            if let Some(existing) = self.entries.get(&key) {
                if !existing.is_empty() && !existing.contains(&record_id) {
                    return Err(StoreError::UniqueViolation {
                        collection: self.spec.collection,
                        index: self.spec.name,
                    });
                }
            }
        }

        let set = self.entries.entry(key).or_default();
        if set.insert(record_id) {
            self.count += 1;
        }
        Ok(())
    }

    /// Removes a key-record mapping. Returns whether it was present.
    pub fn remove(&mut self, key: &K, record_id: RecordId) -> bool {
        if let Some(set) = self.entries.get_mut(key) {
            if set.remove(&record_id) {
                self.count -= 1;
                if set.is_empty() {
                    self.entries.remove(key);
                }
                return true;
            }
        }
        false
    }

    /// Looks up record IDs by exact key.
    pub fn lookup(&self, key: &K) -> Vec<RecordId> {
        match self.entries.get(key) {
            Some(set) => set.iter().copied().collect(),
            None => Vec::new(),
        }
    }

    /// For unique indexes: the single record mapped to the key, if any.
    pub fn lookup_unique(&self, key: &K) -> Option<RecordId> {
        self.entries
            .get(key)
            .and_then(|set| set.iter().next().copied())
    }

    /// Checks whether any record is mapped to the key.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of records mapped to the key.
    pub fn count_for(&self, key: &K) -> usize {
        self.entries.get(key).map_or(0, HashSet::len)
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spec() -> IndexSpec {
        IndexSpec::new("records", "test_idx")
    }

    fn unique_spec() -> IndexSpec {
        IndexSpec::new("records", "unique_idx").unique()
    }

    #[test]
    fn insert_and_lookup() {
        let mut index = HashIndex::new(test_spec());
        let record_id = RecordId::new();

        index.insert("key1".to_string(), record_id).unwrap();

        let found = index.lookup(&"key1".to_string());
        assert_eq!(found, vec![record_id]);
    }

    #[test]
    fn lookup_missing_is_empty() {
        let index: HashIndex<String> = HashIndex::new(test_spec());
        assert!(index.lookup(&"missing".to_string()).is_empty());
    }

    #[test]
    fn multiple_records_same_key() {
        let mut index = HashIndex::new(test_spec());
        let id1 = RecordId::new();
        let id2 = RecordId::new();

        index.insert("key".to_string(), id1).unwrap();
        index.insert("key".to_string(), id2).unwrap();

        assert_eq!(index.count_for(&"key".to_string()), 2);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn unique_index_rejects_second_record() {
        let mut index = HashIndex::new(unique_spec());
        let id1 = RecordId::new();
        let id2 = RecordId::new();

        index.insert("key".to_string(), id1).unwrap();
        let err = index.insert("key".to_string(), id2).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));

        // The original mapping is untouched.
        assert_eq!(index.lookup_unique(&"key".to_string()), Some(id1));
    }

    #[test]
    fn unique_index_reinsert_same_record_is_noop() {
        let mut index = HashIndex::new(unique_spec());
        let id = RecordId::new();

        index.insert("key".to_string(), id).unwrap();
        index.insert("key".to_string(), id).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remove_clears_empty_keys() {
        let mut index = HashIndex::new(test_spec());
        let id = RecordId::new();

        index.insert("key".to_string(), id).unwrap();
        assert!(index.remove(&"key".to_string(), id));
        assert!(!index.contains(&"key".to_string()));
        assert!(index.is_empty());
    }

    #[test]
    fn remove_absent_returns_false() {
        let mut index: HashIndex<String> = HashIndex::new(test_spec());
        assert!(!index.remove(&"key".to_string(), RecordId::new()));
    }

    #[test]
    fn pair_key_ordering() {
        let a = PairKey::new("alice".to_string(), 1i64);
        let b = PairKey::new("alice".to_string(), 2i64);
        let c = PairKey::new("bob".to_string(), 0i64);
        assert!(a < b);
        assert!(b < c);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8),
            Remove(u8),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..8).prop_map(Op::Insert),
                (0u8..8).prop_map(Op::Remove),
            ]
        }

        proptest! {
            // A unique index never maps a key to more than one record,
            // whatever sequence of inserts and removes it sees.
            #[test]
            fn unique_index_holds_at_most_one(ops in prop::collection::vec(op_strategy(), 0..64)) {
                let mut index = HashIndex::new(unique_spec());
                let mut held: std::collections::HashMap<u8, RecordId> = std::collections::HashMap::new();

                for op in ops {
                    match op {
                        Op::Insert(k) => {
                            let id = RecordId::new();
                            let result = index.insert(k.to_string(), id);
                            if held.contains_key(&k) {
                                prop_assert!(result.is_err());
                            } else {
                                prop_assert!(result.is_ok());
                                held.insert(k, id);
                            }
                        }
                        Op::Remove(k) => {
                            if let Some(id) = held.remove(&k) {
                                prop_assert!(index.remove(&k.to_string(), id));
                            }
                        }
                    }
                    for key in held.keys() {
                        prop_assert!(index.count_for(&key.to_string()) <= 1);
                    }
                }
            }
        }
    }
}
