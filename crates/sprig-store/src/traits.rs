use sprig_types::{is_hex, ObjectId, HEX_LEN, MIN_PREFIX_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same (kind, payload) always
///   produces the same ID, so a second write is a no-op.
/// - Only payload bytes are kept; the kind is supplied again by the reader
///   and checked by re-hashing in [`ObjectStore::read_object`].
/// - Concurrent reads are always safe (objects are immutable).
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read the raw payload stored under `id`.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Vec<u8>>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// All stored IDs starting with `prefix` (already validated, lowercase).
    fn ids_with_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>>;

    /// Read an object and verify it re-hashes to `id` under `kind`.
    ///
    /// Missing objects are [`StoreError::NotFound`]; a digest mismatch is
    /// [`StoreError::CorruptObject`].
    fn read_object(&self, id: &ObjectId, kind: ObjectKind) -> StoreResult<StoredObject> {
        let data = self.read(id)?.ok_or(StoreError::NotFound(*id))?;
        let object = StoredObject::new(kind, data);
        let actual = object.compute_id();
        if actual != *id {
            return Err(StoreError::CorruptObject {
                id: *id,
                reason: format!("payload hashes to {} as {kind}", actual.short_hex()),
            });
        }
        Ok(object)
    }

    /// Resolve a full or abbreviated hex id to the unique matching object.
    fn resolve_prefix(&self, prefix: &str) -> StoreResult<ObjectId> {
        let prefix = validate_prefix(prefix)?;
        let mut matches = self.ids_with_prefix(&prefix)?;
        match matches.len() {
            0 => Err(StoreError::PrefixNotFound(prefix)),
            1 => Ok(matches.remove(0)),
            candidates => Err(StoreError::AmbiguousPrefix { prefix, candidates }),
        }
    }
}

/// Check length and alphabet of a lookup prefix, returning it lowercased.
pub(crate) fn validate_prefix(prefix: &str) -> StoreResult<String> {
    if !is_hex(prefix) || prefix.len() > HEX_LEN {
        return Err(StoreError::InvalidId(prefix.to_string()));
    }
    if prefix.len() < MIN_PREFIX_LEN {
        return Err(StoreError::PrefixTooShort {
            prefix: prefix.to_string(),
            min: MIN_PREFIX_LEN,
        });
    }
    Ok(prefix.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_validation() {
        assert_eq!(validate_prefix("ABCDEF").unwrap(), "abcdef");
        assert!(matches!(
            validate_prefix("abcd"),
            Err(StoreError::PrefixTooShort { min: 5, .. })
        ));
        assert!(matches!(
            validate_prefix("abcdz"),
            Err(StoreError::InvalidId(_))
        ));
        assert!(matches!(
            validate_prefix(&"a".repeat(65)),
            Err(StoreError::InvalidId(_))
        ));
    }
}
