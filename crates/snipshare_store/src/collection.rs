//! Typed record collection.

use crate::codec::{from_cbor, to_cbor, EntityCodec};
use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use std::collections::{BTreeMap, HashMap};

/// Monotonically increasing insertion sequence within a collection.
///
/// Sequences order records by creation time without relying on wall
/// clocks; listings in "newest first" order are descending sequence scans.
pub type SequenceNumber = u64;

struct StoredRecord {
    seq: SequenceNumber,
    bytes: Vec<u8>,
}

/// A typed collection of records.
///
/// `Collection<T>` stores CBOR-encoded records of type `T` keyed by
/// [`RecordId`], and tracks insertion order. It carries no interior lock:
/// the owner is expected to guard the collection (together with any
/// indexes over it) behind a single lock so composed operations stay
/// atomic. See the crate-level docs.
pub struct Collection<T: EntityCodec> {
    name: &'static str,
    next_seq: SequenceNumber,
    records: HashMap<RecordId, StoredRecord>,
    order: BTreeMap<SequenceNumber, RecordId>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: EntityCodec> Collection<T> {
    /// Creates a new empty collection.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_seq: 1,
            records: HashMap::new(),
            order: BTreeMap::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the collection name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Inserts or replaces a record.
    ///
    /// A replace keeps the record's original sequence number, so updating
    /// a record in place does not move it in insertion order.
    pub fn put(&mut self, entity: &T) -> StoreResult<SequenceNumber> {
        let bytes = to_cbor(entity).map_err(|m| StoreError::encode(self.name, m))?;
        let id = entity.record_id();

        let seq = match self.records.get(&id) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.order.insert(seq, id);
                seq
            }
        };

        self.records.insert(id, StoredRecord { seq, bytes });
        Ok(seq)
    }

    /// Gets a record by ID. Returns `None` if absent.
    pub fn get(&self, id: RecordId) -> StoreResult<Option<T>> {
        match self.records.get(&id) {
            Some(stored) => {
                let entity =
                    from_cbor(&stored.bytes).map_err(|m| StoreError::decode(self.name, id, m))?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Removes a record by ID. Returns whether it was present.
    pub fn remove(&mut self, id: RecordId) -> bool {
        match self.records.remove(&id) {
            Some(stored) => {
                self.order.remove(&stored.seq);
                true
            }
            None => false,
        }
    }

    /// Checks whether a record exists.
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Returns the insertion sequence of a record, if present.
    pub fn seq_of(&self, id: RecordId) -> Option<SequenceNumber> {
        self.records.get(&id).map(|r| r.seq)
    }

    /// Decodes all records, newest first.
    pub fn scan_newest_first(&self) -> StoreResult<Vec<T>> {
        let mut out = Vec::with_capacity(self.records.len());
        for id in self.order.values().rev() {
            if let Some(entity) = self.get(*id)? {
                out.push(entity);
            }
        }
        Ok(out)
    }

    /// Decodes the given records, newest first. Absent IDs are skipped.
    pub fn fetch_newest_first(&self, ids: &[RecordId]) -> StoreResult<Vec<T>> {
        let mut with_seq: Vec<(SequenceNumber, RecordId)> = ids
            .iter()
            .filter_map(|id| self.seq_of(*id).map(|seq| (seq, *id)))
            .collect();
        with_seq.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        let mut out = Vec::with_capacity(with_seq.len());
        for (_, id) in with_seq {
            if let Some(entity) = self.get(id)? {
                out.push(entity);
            }
        }
        Ok(out)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
