//! In-memory reference store for testing and ephemeral use.

use std::sync::RwLock;

use sprig_types::ObjectId;

use crate::error::{RefError, Result};
use crate::traits::RefStore;

/// An in-memory implementation of [`RefStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    head: RwLock<Option<ObjectId>>,
    orig_head: RwLock<Option<ObjectId>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn read(slot: &RwLock<Option<ObjectId>>) -> Result<Option<ObjectId>> {
    let value = slot
        .read()
        .map_err(|e| RefError::Poisoned(e.to_string()))?;
    Ok(*value)
}

fn write(slot: &RwLock<Option<ObjectId>>, id: &ObjectId) -> Result<()> {
    let mut value = slot
        .write()
        .map_err(|e| RefError::Poisoned(e.to_string()))?;
    *value = Some(*id);
    Ok(())
}

impl RefStore for InMemoryRefStore {
    fn head(&self) -> Result<Option<ObjectId>> {
        read(&self.head)
    }

    fn set_head(&self, id: &ObjectId) -> Result<()> {
        write(&self.head, id)
    }

    fn orig_head(&self) -> Result<Option<ObjectId>> {
        read(&self.orig_head)
    }

    fn set_orig_head(&self, id: &ObjectId) -> Result<()> {
        write(&self.orig_head, id)
    }
}
