//! Working directory status.
//!
//! Combines a read-only scan of the working tree against the index with a
//! diff of the index against the head commit's snapshot.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sprig_history::Snapshot;
use sprig_index::Index;
use tracing::debug;

use crate::error::DiffResult;
use crate::tree_diff::{diff_snapshots, index_snapshot, TreeChange};

/// Complete status of the working directory.
///
/// A path appears in no bucket when it is clean everywhere. Every bucket is
/// sorted by path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdirStatus {
    /// Differences between the index and the head commit.
    pub staged: Vec<StatusEntry>,
    /// Indexed files whose working copy differs from the index.
    pub modified: Vec<String>,
    /// Files present in the working directory but not tracked.
    pub untracked: Vec<String>,
    /// Indexed files missing from the working directory.
    pub deleted: Vec<String>,
}

impl WorkdirStatus {
    /// Create an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes of any kind.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.untracked.is_empty()
            && self.deleted.is_empty()
    }

    /// Returns `true` if there are any staged changes.
    pub fn has_staged_changes(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Total number of entries across all categories.
    pub fn total_entries(&self) -> usize {
        self.staged.len() + self.modified.len() + self.untracked.len() + self.deleted.len()
    }
}

/// A single status entry representing a staged change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The file path relative to the workdir root.
    pub path: String,
    /// The kind of change.
    pub status: FileStatus,
}

impl StatusEntry {
    /// Create a new status entry.
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// The kind of file change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// A path not present in the head commit.
    New,
    /// A path whose content or mode differs from the head commit.
    Modified,
    /// A head path no longer in the index.
    Deleted,
}

impl From<&TreeChange> for StatusEntry {
    fn from(change: &TreeChange) -> Self {
        let status = match change {
            TreeChange::Added { .. } => FileStatus::New,
            TreeChange::Deleted { .. } => FileStatus::Deleted,
            TreeChange::Modified { .. } | TreeChange::ModeChanged { .. } => FileStatus::Modified,
        };
        Self::new(change.path(), status)
    }
}

/// Compute the status of the working tree at `root`.
///
/// Nothing is written: the index is scanned, not reconciled.
pub fn compute_status(index: &Index, root: &Path, head: &Snapshot) -> DiffResult<WorkdirStatus> {
    let scan = index.scan(root)?;
    let staged = diff_snapshots(head, &index_snapshot(index))
        .changes
        .iter()
        .map(StatusEntry::from)
        .collect();

    let status = WorkdirStatus {
        staged,
        modified: scan.modified,
        untracked: scan.untracked,
        deleted: scan.deleted,
    };
    debug!(
        staged = status.staged.len(),
        modified = status.modified.len(),
        untracked = status.untracked.len(),
        deleted = status.deleted.len(),
        "status computed"
    );
    Ok(status)
}

/// Returns `true` if committing the index would record any change relative
/// to the head snapshot.
pub fn has_changes_to_commit(index: &Index, head: &Snapshot) -> bool {
    !diff_snapshots(head, &index_snapshot(index)).is_empty()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use super::*;
    use sprig_history::FlatEntry;
    use sprig_index::StageScope;
    use sprig_store::{Blob, EntryMode, InMemoryObjectStore};
    use sprig_types::ObjectId;

    fn staged_index(root: &Path) -> Index {
        let mut idx = Index::new(Arc::new(InMemoryObjectStore::new()));
        idx.reconcile(root, &StageScope::All).unwrap();
        idx
    }

    #[test]
    fn empty_status_is_clean() {
        let status = WorkdirStatus::new();
        assert!(status.is_clean());
        assert!(!status.has_staged_changes());
        assert_eq!(status.total_entries(), 0);
    }

    #[test]
    fn fresh_files_are_staged_new() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let idx = staged_index(dir.path());

        let status = compute_status(&idx, dir.path(), &Snapshot::new()).unwrap();
        assert_eq!(status.staged, vec![StatusEntry::new("a.txt", FileStatus::New)]);
        assert!(status.modified.is_empty());
        assert!(status.untracked.is_empty());
        assert!(has_changes_to_commit(&idx, &Snapshot::new()));
    }

    #[test]
    fn reconcile_stages_edit_and_new_file_before_first_commit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        let mut idx = staged_index(dir.path());
        let original = idx.get("a.txt").unwrap().object_id;

        fs::write(dir.path().join("a.txt"), "second version").unwrap();
        fs::write(dir.path().join("b.txt"), "bee").unwrap();
        idx.reconcile(dir.path(), &StageScope::All).unwrap();

        assert_eq!(idx.len(), 2);
        assert_ne!(idx.get("a.txt").unwrap().object_id, original);
        assert_eq!(
            idx.get("b.txt").unwrap().object_id,
            Blob::new(b"bee".to_vec()).into_stored_object().compute_id()
        );

        let status = compute_status(&idx, dir.path(), &Snapshot::new()).unwrap();
        assert_eq!(
            status.staged,
            vec![
                StatusEntry::new("a.txt", FileStatus::New),
                StatusEntry::new("b.txt", FileStatus::New),
            ]
        );
        assert!(status.modified.is_empty());
        assert!(status.untracked.is_empty());
    }

    #[test]
    fn clean_after_commit_snapshot_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let idx = staged_index(dir.path());
        let head = index_snapshot(&idx);

        let status = compute_status(&idx, dir.path(), &head).unwrap();
        assert!(status.is_clean());
        assert!(!has_changes_to_commit(&idx, &head));
    }

    #[test]
    fn all_four_buckets() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("edited.txt"), "v1").unwrap();
        fs::write(dir.path().join("removed.txt"), "r").unwrap();
        let idx = staged_index(dir.path());

        let mut head = index_snapshot(&idx);
        head.insert(
            "dropped.txt".into(),
            FlatEntry {
                object_id: ObjectId::from_hash([4; 32]),
                mode: EntryMode::Regular,
            },
        );

        fs::write(dir.path().join("edited.txt"), "version 2").unwrap();
        fs::remove_file(dir.path().join("removed.txt")).unwrap();
        fs::write(dir.path().join("new.txt"), "n").unwrap();

        let status = compute_status(&idx, dir.path(), &head).unwrap();
        assert_eq!(
            status.staged,
            vec![StatusEntry::new("dropped.txt", FileStatus::Deleted)]
        );
        assert_eq!(status.modified, vec!["edited.txt"]);
        assert_eq!(status.deleted, vec!["removed.txt"]);
        assert_eq!(status.untracked, vec!["new.txt"]);
    }

    #[test]
    fn staged_modification_against_head() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "new content").unwrap();
        let idx = staged_index(dir.path());
        let mut head = index_snapshot(&idx);
        head.get_mut("f.txt").unwrap().object_id = ObjectId::from_hash([1; 32]);

        let status = compute_status(&idx, dir.path(), &head).unwrap();
        assert_eq!(
            status.staged,
            vec![StatusEntry::new("f.txt", FileStatus::Modified)]
        );
    }

    #[test]
    fn status_json_shape() {
        let mut status = WorkdirStatus::new();
        status.staged.push(StatusEntry::new("x", FileStatus::New));
        status.untracked.push("y".into());
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["staged"][0]["status"], "new");
        assert_eq!(json["untracked"][0], "y");
    }
}
