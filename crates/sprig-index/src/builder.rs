//! Tree building: flat index entries to a hierarchy of tree objects.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use sprig_store::{EntryMode, ObjectStore, Tree, TreeEntry};
use sprig_types::ObjectId;
use tracing::debug;

use crate::entry::IndexEntry;
use crate::error::IndexResult;

/// Split `a/b/c` into (`a/b`, `c`); top-level names have parent `""`.
fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

fn depth(dir: &str) -> usize {
    if dir.is_empty() {
        0
    } else {
        dir.matches('/').count() + 1
    }
}

/// Write one tree object per directory and return the root tree's id.
///
/// Directories are processed deepest first so each child digest is known
/// before its parent is assembled. Every ancestor of every entry gets a
/// tree, and an empty input yields the empty tree. The result depends only
/// on the (path, digest, mode) triples, never on input order.
pub fn build_tree<'a>(
    store: &dyn ObjectStore,
    entries: impl IntoIterator<Item = &'a IndexEntry>,
) -> IndexResult<ObjectId> {
    let mut dirs: BTreeMap<String, Vec<TreeEntry>> = BTreeMap::new();
    for entry in entries {
        let (dir, name) = split_parent(&entry.path);
        dirs.entry(dir.to_string())
            .or_default()
            .push(TreeEntry::new(entry.mode, name, entry.object_id));

        let mut ancestor = dir;
        while !ancestor.is_empty() {
            ancestor = split_parent(ancestor).0;
            dirs.entry(ancestor.to_string()).or_default();
        }
    }

    let mut order: Vec<String> = dirs.keys().filter(|d| !d.is_empty()).cloned().collect();
    order.sort_by_key(|d| Reverse(depth(d)));

    for dir in order {
        let children = dirs.remove(&dir).unwrap_or_default();
        let id = store.write(&Tree::new(children).to_stored_object())?;
        let (parent, name) = split_parent(&dir);
        dirs.entry(parent.to_string())
            .or_default()
            .push(TreeEntry::new(EntryMode::Directory, name, id));
    }

    let root = Tree::new(dirs.remove("").unwrap_or_default());
    let root_id = store.write(&root.to_stored_object())?;
    debug!(root = %root_id.short_hex(), entries = root.len(), "tree built");
    Ok(root_id)
}
