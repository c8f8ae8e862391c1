use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

use sprig_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Object store held entirely in memory, for tests and embedding.
///
/// Like the loose store it keeps bare payloads keyed by digest, so readers
/// still name the kind they expect when verifying.
#[derive(Default)]
pub struct InMemoryObjectStore {
    payloads: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn payloads(&self) -> RwLockReadGuard<'_, HashMap<ObjectId, Vec<u8>>> {
        self.payloads.read().expect("lock poisoned")
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.payloads().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads().is_empty()
    }

    /// Every stored id, sorted.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.payloads().keys().copied().collect();
        ids.sort();
        ids
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.payloads().get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        self.payloads
            .write()
            .expect("lock poisoned")
            .entry(id)
            .or_insert_with(|| object.data.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.payloads().contains_key(id))
    }

    fn ids_with_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        let mut ids: Vec<ObjectId> = self
            .payloads()
            .keys()
            .filter(|id| id.matches_prefix(prefix))
            .copied()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects", &self.len())
            .finish()
    }
}
