//! CBOR entity encoding.
//!
//! Stored records are serde-serialized to CBOR. Encoding is driven by the
//! entity's `Serialize` implementation; there is no schema registry: a
//! collection's element type is fixed at the type level.

use crate::id::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for types stored in a [`Collection`](crate::Collection).
///
/// An entity carries its own record ID and is encoded to CBOR bytes for
/// storage.
pub trait EntityCodec: Serialize + DeserializeOwned + Clone {
    /// Returns the record ID of this entity.
    fn record_id(&self) -> RecordId;
}

/// Encodes a value to CBOR bytes.
pub(crate) fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes).map_err(|e| e.to_string())?;
    Ok(bytes)
}

/// Decodes a value from CBOR bytes.
pub(crate) fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    ciborium::from_reader(bytes).map_err(|e| e.to_string())
}
