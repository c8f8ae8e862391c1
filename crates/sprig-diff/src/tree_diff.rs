//! Snapshot-level diff: compare two flattened path maps.
//!
//! Compares entries by full path, detecting additions, deletions,
//! content modifications and mode changes.

use serde::Serialize;
use sprig_history::{FlatEntry, Snapshot};
use sprig_index::Index;
use sprig_store::EntryMode;
use sprig_types::ObjectId;

/// The result of comparing two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeDiff {
    /// Changes in path order.
    pub changes: Vec<TreeChange>,
}

impl TreeDiff {
    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// A single change between two snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum TreeChange {
    /// A new entry was added.
    Added {
        path: String,
        new_id: ObjectId,
        mode: EntryMode,
    },
    /// An existing entry was deleted.
    Deleted {
        path: String,
        old_id: ObjectId,
        mode: EntryMode,
    },
    /// An entry's content changed (same path, different object ID).
    Modified {
        path: String,
        old_id: ObjectId,
        new_id: ObjectId,
        mode: EntryMode,
    },
    /// An entry's mode changed but content is the same.
    ModeChanged {
        path: String,
        id: ObjectId,
        old_mode: EntryMode,
        new_mode: EntryMode,
    },
}

impl TreeChange {
    /// The path this change applies to.
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. }
            | Self::Deleted { path, .. }
            | Self::Modified { path, .. }
            | Self::ModeChanged { path, .. } => path,
        }
    }
}

/// Flatten the index into the same shape as a committed snapshot.
pub fn index_snapshot(index: &Index) -> Snapshot {
    index
        .iter()
        .map(|e| {
            (
                e.path.clone(),
                FlatEntry {
                    object_id: e.object_id,
                    mode: e.mode,
                },
            )
        })
        .collect()
}

/// Compare `old` to `new`, producing changes sorted by path.
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot) -> TreeDiff {
    let mut changes = Vec::new();

    for (path, old_entry) in old {
        match new.get(path) {
            Some(new_entry) if old_entry.object_id != new_entry.object_id => {
                changes.push(TreeChange::Modified {
                    path: path.clone(),
                    old_id: old_entry.object_id,
                    new_id: new_entry.object_id,
                    mode: new_entry.mode,
                });
            }
            Some(new_entry) if old_entry.mode != new_entry.mode => {
                changes.push(TreeChange::ModeChanged {
                    path: path.clone(),
                    id: old_entry.object_id,
                    old_mode: old_entry.mode,
                    new_mode: new_entry.mode,
                });
            }
            Some(_) => {}
            None => changes.push(TreeChange::Deleted {
                path: path.clone(),
                old_id: old_entry.object_id,
                mode: old_entry.mode,
            }),
        }
    }

    for (path, new_entry) in new {
        if !old.contains_key(path) {
            changes.push(TreeChange::Added {
                path: path.clone(),
                new_id: new_entry.object_id,
                mode: new_entry.mode,
            });
        }
    }

    changes.sort_by(|a, b| a.path().cmp(b.path()));
    TreeDiff { changes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_hash([b; 32])
    }

    fn snap(entries: &[(&str, u8, EntryMode)]) -> Snapshot {
        entries
            .iter()
            .map(|(p, b, m)| {
                (
                    p.to_string(),
                    FlatEntry {
                        object_id: oid(*b),
                        mode: *m,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn empty_to_populated_all_additions() {
        let new = snap(&[("a.txt", 1, EntryMode::Regular), ("b/c.txt", 2, EntryMode::Regular)]);
        let diff = diff_snapshots(&Snapshot::new(), &new);
        assert_eq!(diff.len(), 2);
        assert!(diff.changes.iter().all(|c| matches!(c, TreeChange::Added { .. })));
    }

    #[test]
    fn populated_to_empty_all_deletions() {
        let old = snap(&[("a.txt", 1, EntryMode::Regular), ("b.txt", 2, EntryMode::Regular)]);
        let diff = diff_snapshots(&old, &Snapshot::new());
        assert_eq!(diff.len(), 2);
        assert!(diff.changes.iter().all(|c| matches!(c, TreeChange::Deleted { .. })));
    }

    #[test]
    fn identical_snapshots_no_changes() {
        let s = snap(&[("file.txt", 1, EntryMode::Regular)]);
        assert!(diff_snapshots(&s, &s).is_empty());
    }

    #[test]
    fn single_file_modification() {
        let old = snap(&[("file.txt", 1, EntryMode::Regular)]);
        let new = snap(&[("file.txt", 2, EntryMode::Regular)]);
        let diff = diff_snapshots(&old, &new);
        assert_eq!(diff.len(), 1);
        match &diff.changes[0] {
            TreeChange::Modified { path, old_id, new_id, .. } => {
                assert_eq!(path, "file.txt");
                assert_eq!(*old_id, oid(1));
                assert_eq!(*new_id, oid(2));
            }
            other => panic!("expected Modified, got {:?}", other),
        }
    }

    #[test]
    fn mode_change_detection() {
        let old = snap(&[("script.sh", 1, EntryMode::Regular)]);
        let new = snap(&[("script.sh", 1, EntryMode::Executable)]);
        let diff = diff_snapshots(&old, &new);
        assert!(matches!(
            &diff.changes[..],
            [TreeChange::ModeChanged {
                old_mode: EntryMode::Regular,
                new_mode: EntryMode::Executable,
                ..
            }]
        ));
    }

    #[test]
    fn rename_is_delete_plus_add() {
        let old = snap(&[("old.txt", 1, EntryMode::Regular)]);
        let new = snap(&[("new.txt", 1, EntryMode::Regular)]);
        let diff = diff_snapshots(&old, &new);
        let paths: Vec<&str> = diff.changes.iter().map(TreeChange::path).collect();
        assert_eq!(paths, vec!["new.txt", "old.txt"]);
        assert!(matches!(diff.changes[0], TreeChange::Added { .. }));
        assert!(matches!(diff.changes[1], TreeChange::Deleted { .. }));
    }

    #[test]
    fn mixed_changes_sorted_by_path() {
        let old = snap(&[
            ("keep.txt", 1, EntryMode::Regular),
            ("modify.txt", 2, EntryMode::Regular),
            ("delete.txt", 3, EntryMode::Regular),
        ]);
        let new = snap(&[
            ("keep.txt", 1, EntryMode::Regular),
            ("modify.txt", 4, EntryMode::Regular),
            ("added.txt", 5, EntryMode::Regular),
        ]);
        let diff = diff_snapshots(&old, &new);
        let paths: Vec<&str> = diff.changes.iter().map(TreeChange::path).collect();
        assert_eq!(paths, vec!["added.txt", "delete.txt", "modify.txt"]);
    }

    #[test]
    fn serializes_with_change_tag() {
        let diff = diff_snapshots(&Snapshot::new(), &snap(&[("a", 1, EntryMode::Regular)]));
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["changes"][0]["change"], "added");
        assert_eq!(json["changes"][0]["path"], "a");
    }
}
