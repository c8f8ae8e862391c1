use std::collections::BTreeMap;

use sprig_refs::RefStore;
use sprig_store::{Commit, EntryMode, ObjectKind, ObjectStore, Tree};
use sprig_types::ObjectId;
use tracing::debug;

use crate::error::HistoryResult;
use crate::walk::HistoryWalk;

/// A file as recorded in a committed tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatEntry {
    pub object_id: ObjectId,
    pub mode: EntryMode,
}

/// Flattened tree: full `/`-separated path to file entry.
pub type Snapshot = BTreeMap<String, FlatEntry>;

/// Read-only view over commits and trees in an object store.
#[derive(Clone, Copy)]
pub struct HistoryReader<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> HistoryReader<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// The current head commit, or `None` before the first commit.
    pub fn resolve_head(&self, refs: &dyn RefStore) -> HistoryResult<Option<ObjectId>> {
        Ok(refs.head()?)
    }

    /// Read and decode a commit, verifying its digest.
    pub fn read_commit(&self, id: &ObjectId) -> HistoryResult<Commit> {
        let object = self.store.read_object(id, ObjectKind::Commit)?;
        Ok(Commit::from_stored_object(&object)?)
    }

    /// Read and decode a tree, verifying its digest.
    pub fn read_tree(&self, id: &ObjectId) -> HistoryResult<Tree> {
        let object = self.store.read_object(id, ObjectKind::Tree)?;
        Ok(Tree::from_stored_object(&object)?)
    }

    /// Recursively flatten a tree into a path map.
    ///
    /// Blob entries map `prefix + name`; tree entries recurse with
    /// `prefix + name + "/"`.
    pub fn flatten(&self, tree_id: &ObjectId) -> HistoryResult<Snapshot> {
        let mut out = Snapshot::new();
        self.flatten_into(tree_id, "", &mut out)?;
        debug!(tree = %tree_id.short_hex(), files = out.len(), "tree flattened");
        Ok(out)
    }

    fn flatten_into(&self, tree_id: &ObjectId, prefix: &str, out: &mut Snapshot) -> HistoryResult<()> {
        let tree = self.read_tree(tree_id)?;
        for entry in &tree.entries {
            let path = format!("{prefix}{}", entry.name);
            if entry.mode == EntryMode::Directory {
                self.flatten_into(&entry.object_id, &format!("{path}/"), out)?;
            } else {
                out.insert(
                    path,
                    FlatEntry {
                        object_id: entry.object_id,
                        mode: entry.mode,
                    },
                );
            }
        }
        Ok(())
    }

    /// Flatten the tree of the given commit.
    pub fn snapshot(&self, commit_id: &ObjectId) -> HistoryResult<Snapshot> {
        let commit = self.read_commit(commit_id)?;
        self.flatten(&commit.tree)
    }

    /// Flatten the head commit's tree; empty before the first commit.
    pub fn head_snapshot(&self, refs: &dyn RefStore) -> HistoryResult<Snapshot> {
        match self.resolve_head(refs)? {
            Some(head) => self.snapshot(&head),
            None => Ok(Snapshot::new()),
        }
    }

    /// Iterate commits from `start` back through their parents.
    pub fn walk(&self, start: Option<ObjectId>) -> HistoryWalk<'a> {
        HistoryWalk::new(*self, start)
    }
}

impl std::fmt::Debug for HistoryReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryReader").finish_non_exhaustive()
    }
}
