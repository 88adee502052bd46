//! # SnipShare Store
//!
//! Embedded in-memory document store for SnipShare.
//!
//! This crate provides:
//! - `RecordId`: 16-byte record identifiers
//! - CBOR entity encoding via the `EntityCodec` trait
//! - `Collection<T>`: insertion-ordered typed record storage
//! - `HashIndex<K>`: secondary indexes with optional uniqueness
//!
//! # Concurrency
//!
//! Collections and indexes carry no interior locking. A domain directory
//! owns a collection together with its index set behind one
//! `parking_lot::RwLock`, so a composed operation (check-then-insert,
//! multi-record removal) runs atomically with respect to other callers.
//! Each lock acquisition corresponds to one atomic store operation; there
//! are no cross-lock transactions.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod collection;
mod error;
mod id;
mod index;

pub use codec::EntityCodec;
pub use collection::{Collection, SequenceNumber};
pub use error::{StoreError, StoreResult};
pub use id::RecordId;
pub use index::{HashIndex, IndexKey, IndexSpec, PairKey};
