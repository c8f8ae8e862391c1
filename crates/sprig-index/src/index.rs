//! The core Index structure managing staged entries.
//!
//! The [`Index`] keeps a `BTreeMap<String, IndexEntry>` as the staging area
//! and persists it as one tab-separated line per entry, sorted by path.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sprig_store::{Blob, ObjectStore};
use sprig_types::ObjectId;
use tracing::debug;

use crate::builder::build_tree;
use crate::entry::IndexEntry;
use crate::error::{IndexError, IndexResult};
use crate::workdir::{
    self, is_control_path, normalize_lexically, to_index_path, FileMeta, WorkdirFile, WorkdirScan,
};

/// Which part of the working tree a reconcile pass covers.
///
/// Entries outside the scope are never dropped, even when their files are
/// missing from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageScope {
    /// The whole working tree.
    All,
    /// One directory, given relative to the root with `/` separators.
    Subtree(String),
}

impl StageScope {
    fn dir(&self) -> &str {
        match self {
            Self::All => "",
            Self::Subtree(prefix) => prefix,
        }
    }

    /// Returns `true` if `path` falls within this scope.
    pub fn contains(&self, path: &str) -> bool {
        let dir = self.dir();
        dir.is_empty()
            || path == dir
            || path
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Paths touched by a reconcile or stage operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// New entries.
    pub added: Vec<String>,
    /// Entries whose digest or mode changed.
    pub updated: Vec<String>,
    /// Entries whose metadata drifted with identical content.
    pub refreshed: Vec<String>,
    /// Entries dropped because their files are gone.
    pub removed: Vec<String>,
}

impl ReconcileReport {
    /// Returns `true` if the index was mutated.
    pub fn is_changed(&self) -> bool {
        !(self.added.is_empty()
            && self.updated.is_empty()
            && self.refreshed.is_empty()
            && self.removed.is_empty())
    }

    /// Append another report's paths to this one.
    pub fn absorb(&mut self, other: ReconcileReport) {
        self.added.extend(other.added);
        self.updated.extend(other.updated);
        self.refreshed.extend(other.refreshed);
        self.removed.extend(other.removed);
    }
}

/// The staging index: tracks which files are staged for the next commit.
///
/// The `store` receives a blob for every file that is staged.
pub struct Index {
    entries: BTreeMap<String, IndexEntry>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Index {
    /// Create a new empty index backed by the given store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            entries: BTreeMap::new(),
            store,
        }
    }

    /// Load the index file at `path`. A missing file is an empty index.
    pub fn load(path: &Path, store: Arc<dyn ObjectStore>) -> IndexResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no index file, starting empty");
                return Ok(Self::new(store));
            }
            Err(e) => return Err(e.into()),
        };
        let index = Self::parse(&text, store)?;
        debug!(path = %path.display(), entries = index.len(), "index loaded");
        Ok(index)
    }

    /// Parse the persisted text form. Any malformed line fails the whole parse.
    pub fn parse(text: &str, store: Arc<dyn ObjectStore>) -> IndexResult<Self> {
        let mut entries = BTreeMap::new();
        for (i, line) in text.lines().enumerate() {
            let entry = IndexEntry::parse_line(i + 1, line)?;
            if entries.contains_key(&entry.path) {
                return Err(IndexError::corrupt(
                    i + 1,
                    format!("duplicate path {:?}", entry.path),
                ));
            }
            entries.insert(entry.path.clone(), entry);
        }
        Ok(Self { entries, store })
    }

    /// Serialize all entries, sorted by path, one line each.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in self.entries.values() {
            out.push_str(&entry.to_line());
            out.push('\n');
        }
        out
    }

    /// Write the index to `path` through a sibling lock file.
    ///
    /// The lock file is created exclusively, synced, then renamed over
    /// `path`. If the lock already exists, fails with [`IndexError::Locked`].
    pub fn persist(&self, path: &Path) -> IndexResult<()> {
        let lock_path = lock_path_for(path);
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(IndexError::Locked(lock_path));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write_and_swap(file, self.to_text().as_bytes(), &lock_path, path) {
            let _ = fs::remove_file(&lock_path);
            return Err(e.into());
        }
        debug!(path = %path.display(), entries = self.len(), "index persisted");
        Ok(())
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by path.
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Remove an entry from the index entirely.
    pub fn remove(&mut self, path: &str) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    /// The object store blobs are written to.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Build the tree hierarchy for the current entries and return the root
    /// tree's id.
    pub fn write_tree(&self) -> IndexResult<ObjectId> {
        build_tree(self.store.as_ref(), self.entries.values())
    }

    // ---------------------------------------------------------------
    // Staging
    // ---------------------------------------------------------------

    /// Bring every entry within `scope` in line with the working tree.
    ///
    /// Unchanged metadata skips hashing. Changed metadata re-hashes and
    /// stores the file; the entry is replaced when the digest or mode
    /// differs, and only its metadata refreshed otherwise. Entries in scope
    /// whose files were not seen are dropped.
    pub fn reconcile(&mut self, root: &Path, scope: &StageScope) -> IndexResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut seen = HashSet::new();

        for file in workdir::walk(root, scope.dir())? {
            seen.insert(file.rel.clone());
            self.stage_file(&file, &mut report)?;
        }

        let gone: Vec<String> = self
            .entries
            .keys()
            .filter(|path| scope.contains(path) && !seen.contains(*path))
            .cloned()
            .collect();
        for path in gone {
            self.entries.remove(&path);
            report.removed.push(path);
        }

        debug!(
            scope = scope.dir(),
            added = report.added.len(),
            updated = report.updated.len(),
            refreshed = report.refreshed.len(),
            removed = report.removed.len(),
            "index reconciled"
        );
        Ok(report)
    }

    /// Stage one user-supplied path.
    ///
    /// Relative paths are resolved against `cwd`. A directory is reconciled
    /// as a subtree; a file or symlink is staged on its own; a path gone from
    /// disk is dropped from the index.
    pub fn stage_path(
        &mut self,
        root: &Path,
        cwd: &Path,
        path: &Path,
    ) -> IndexResult<ReconcileReport> {
        let abs = normalize_lexically(&cwd.join(path));
        let root = normalize_lexically(root);
        let rel = abs
            .strip_prefix(&root)
            .map_err(|_| IndexError::OutsideRepository(abs.clone()))?;
        let rel = to_index_path(rel)?;

        if is_control_path(&rel) {
            debug!(path = %rel, "ignoring control directory path");
            return Ok(ReconcileReport::default());
        }

        match fs::symlink_metadata(&abs) {
            Ok(meta) if meta.is_dir() => {
                let scope = if rel.is_empty() {
                    StageScope::All
                } else {
                    StageScope::Subtree(rel)
                };
                self.reconcile(&root, &scope)
            }
            Ok(meta) => {
                let mut report = ReconcileReport::default();
                let Some(meta) = FileMeta::from_metadata(&meta) else {
                    return Err(IndexError::InvalidPath(rel));
                };
                self.stage_file(&WorkdirFile { rel, abs, meta }, &mut report)?;
                Ok(report)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let scope = StageScope::Subtree(rel.clone());
                let gone: Vec<String> = self
                    .entries
                    .keys()
                    .filter(|p| scope.contains(p))
                    .cloned()
                    .collect();
                if gone.is_empty() {
                    return Err(IndexError::PathNotFound(rel));
                }
                let mut report = ReconcileReport::default();
                for p in gone {
                    self.entries.remove(&p);
                    report.removed.push(p);
                }
                Ok(report)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn stage_file(&mut self, file: &WorkdirFile, report: &mut ReconcileReport) -> IndexResult<()> {
        let FileMeta { mode, size, mtime } = file.meta;
        let previous = self.entries.get(&file.rel);
        if previous.is_some_and(|e| e.matches_metadata(mode, size, mtime)) {
            return Ok(());
        }

        let content = workdir::read_content(&file.abs, mode)?;
        let object_id = self
            .store
            .write(&Blob::new(content).into_stored_object())?;

        match previous {
            None => {
                report.added.push(file.rel.clone());
                self.evict_conflicts(&file.rel, report);
            }
            Some(e) if e.object_id != object_id || e.mode != mode => {
                report.updated.push(file.rel.clone())
            }
            Some(_) => report.refreshed.push(file.rel.clone()),
        }
        self.insert(IndexEntry::new(file.rel.clone(), object_id, mode, size, mtime));
        Ok(())
    }

    /// Drop entries that cannot coexist with a file at `path`: anything
    /// tracked beneath it, and any ancestor tracked as a file.
    fn evict_conflicts(&mut self, path: &str, report: &mut ReconcileReport) {
        let below = format!("{path}/");
        let mut conflicts: Vec<String> = self
            .entries
            .range::<str, _>((Bound::Included(below.as_str()), Bound::Unbounded))
            .map(|(p, _)| p)
            .take_while(|p| p.starts_with(&below))
            .cloned()
            .collect();

        let mut dir = path;
        while let Some((parent, _)) = dir.rsplit_once('/') {
            if self.entries.contains_key(parent) {
                conflicts.push(parent.to_string());
            }
            dir = parent;
        }

        for p in conflicts {
            debug!(path = %p, replaced_by = path, "dropping conflicting entry");
            self.entries.remove(&p);
            report.removed.push(p);
        }
    }

    // ---------------------------------------------------------------
    // Read-only comparison
    // ---------------------------------------------------------------

    /// Compare the working tree with the index without writing anything.
    ///
    /// Files whose metadata drifted are hashed from disk and reported as
    /// modified only if the digest (or mode) actually differs.
    pub fn scan(&self, root: &Path) -> IndexResult<WorkdirScan> {
        let mut scan = WorkdirScan::default();
        let mut seen = HashSet::new();

        for file in workdir::walk(root, "")? {
            let FileMeta { mode, size, mtime } = file.meta;
            match self.entries.get(&file.rel) {
                None => scan.untracked.push(file.rel.clone()),
                Some(e) if e.matches_metadata(mode, size, mtime) => {}
                Some(e) => {
                    let id = workdir::hash_file(&file.abs, mode)?;
                    if id != e.object_id || mode != e.mode {
                        scan.modified.push(file.rel.clone());
                    }
                }
            }
            seen.insert(file.rel);
        }

        scan.deleted = self
            .entries
            .keys()
            .filter(|p| !seen.contains(*p))
            .cloned()
            .collect();
        Ok(scan)
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn write_and_swap(file: File, data: &[u8], lock_path: &Path, dest: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    writer.write_all(data)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);
    fs::rename(lock_path, dest)
}
