use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sprig_config::{ConfigFile, CoreSettings};
use sprig_diff::{compute_status, diff_snapshots, index_snapshot, WorkdirStatus};
use sprig_history::{HistoryReader, HistoryResult};
use sprig_index::{Index, ReconcileReport, CONTROL_DIR};
use sprig_refs::{FileRefStore, RefStore};
use sprig_store::{Commit, LooseObjectStore, ObjectKind, ObjectStore, Signature, StoreError};
use tracing::{debug, info};

use crate::commit::{CatObject, CommitOutcome, LogEntry};
use crate::error::{SdkError, SdkResult};
use crate::layout::{self, CONFIG_FILE, INDEX_FILE, OBJECTS_DIR};

/// Kinds tried, in order, when recovering an object's kind from its digest.
const KINDS: [ObjectKind; 3] = [ObjectKind::Commit, ObjectKind::Tree, ObjectKind::Blob];

/// A repository on disk: a working tree with a `.sprig` control directory.
pub struct Repository {
    root: PathBuf,
    control_dir: PathBuf,
    store: Arc<LooseObjectStore>,
    refs: FileRefStore,
}

impl Repository {
    /// Create a repository at `path`, creating the directory if needed.
    ///
    /// Fails with [`SdkError::AlreadyInitialized`] if a control directory
    /// already exists there.
    pub fn init(path: &Path) -> SdkResult<Self> {
        fs::create_dir_all(path)?;
        let root = fs::canonicalize(path)?;
        let control_dir = root.join(CONTROL_DIR);
        if control_dir.exists() {
            return Err(SdkError::AlreadyInitialized(control_dir));
        }

        layout::create_skeleton(&control_dir)?;
        let mut config = ConfigFile::new();
        CoreSettings::default().write_to(&mut config);
        config.save(&control_dir.join(CONFIG_FILE))?;

        info!(root = %root.display(), "initialized empty repository");
        Ok(Self::at(root))
    }

    /// Open the repository whose working tree root is `root`.
    pub fn open(root: &Path) -> SdkResult<Self> {
        let root = fs::canonicalize(root)?;
        if !root.join(CONTROL_DIR).is_dir() {
            return Err(SdkError::NotARepository(root));
        }
        Ok(Self::at(root))
    }

    /// Open the nearest repository at or above `start`.
    pub fn discover(start: &Path) -> SdkResult<Self> {
        let start = fs::canonicalize(start)?;
        match start.ancestors().find(|dir| dir.join(CONTROL_DIR).is_dir()) {
            Some(root) => {
                debug!(root = %root.display(), "repository found");
                Ok(Self::at(root.to_path_buf()))
            }
            None => Err(SdkError::NotARepository(start)),
        }
    }

    fn at(root: PathBuf) -> Self {
        let control_dir = root.join(CONTROL_DIR);
        Self {
            store: Arc::new(LooseObjectStore::new(control_dir.join(OBJECTS_DIR))),
            refs: FileRefStore::new(&control_dir),
            root,
            control_dir,
        }
    }

    // ---- Accessors ----

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn control_dir(&self) -> &Path {
        &self.control_dir
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn refs(&self) -> &dyn RefStore {
        &self.refs
    }

    fn index_path(&self) -> PathBuf {
        self.control_dir.join(INDEX_FILE)
    }

    fn config_path(&self) -> PathBuf {
        self.control_dir.join(CONFIG_FILE)
    }

    fn history(&self) -> HistoryReader<'_> {
        HistoryReader::new(self.store.as_ref())
    }

    /// Load the staging index.
    pub fn load_index(&self) -> SdkResult<Index> {
        let store: Arc<dyn ObjectStore> = self.store.clone();
        Ok(Index::load(&self.index_path(), store)?)
    }

    // ---- Configuration ----

    pub fn config(&self) -> SdkResult<ConfigFile> {
        Ok(ConfigFile::load(&self.config_path())?)
    }

    pub fn save_config(&self, config: &ConfigFile) -> SdkResult<()> {
        Ok(config.save(&self.config_path())?)
    }

    pub fn core_settings(&self) -> SdkResult<CoreSettings> {
        Ok(CoreSettings::from_config(&self.config()?)?)
    }

    fn worktree_settings(&self) -> SdkResult<CoreSettings> {
        let settings = self.core_settings()?;
        if settings.bare {
            return Err(SdkError::BareRepository);
        }
        Ok(settings)
    }

    // ---- Working tree operations ----

    /// Stage `paths`, each resolved against `cwd`.
    ///
    /// The index is rewritten only when something changed.
    pub fn add(&self, paths: &[PathBuf], cwd: &Path) -> SdkResult<ReconcileReport> {
        self.worktree_settings()?;
        let mut index = self.load_index()?;
        let mut report = ReconcileReport::default();
        for path in paths {
            report.absorb(index.stage_path(&self.root, cwd, path)?);
        }
        if report.is_changed() {
            index.persist(&self.index_path())?;
        }
        info!(
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            "paths staged"
        );
        Ok(report)
    }

    /// Record the staged tree as a new commit on top of the current head.
    pub fn commit(&self, message: &str, author: Signature) -> SdkResult<CommitOutcome> {
        let settings = self.worktree_settings()?;
        let message = message.trim();
        if message.is_empty() {
            return Err(SdkError::EmptyMessage);
        }
        author.validate()?;

        let index = self.load_index()?;
        let history = self.history();
        let parent = history.resolve_head(&self.refs)?;
        let head = match &parent {
            Some(id) => history.snapshot(id)?,
            None => Default::default(),
        };
        let diff = diff_snapshots(&head, &index_snapshot(&index));
        if diff.is_empty() {
            return Err(SdkError::NothingToCommit);
        }

        let tree = index.write_tree()?;
        let commit = Commit {
            tree,
            parent,
            committer: Some(author.clone()),
            author,
            message: format!("{message}\n"),
        };
        let id = self.store.write(&commit.to_stored_object())?;
        if settings.local_ref_updates {
            self.refs.advance_head(&id)?;
        } else {
            self.refs.set_head(&id)?;
        }

        info!(commit = %id.short_hex(), changes = diff.changes.len(), "commit created");
        Ok(CommitOutcome {
            id,
            tree,
            parent,
            summary: commit.summary().to_string(),
            changes: diff.changes.len(),
        })
    }

    /// Classify every path across the working tree, index and head commit.
    pub fn status(&self) -> SdkResult<WorkdirStatus> {
        self.worktree_settings()?;
        let index = self.load_index()?;
        let head = self.history().head_snapshot(&self.refs)?;
        Ok(compute_status(&index, &self.root, &head)?)
    }

    /// Commits reachable from the head, newest first, at most `limit`.
    pub fn log(&self, limit: Option<usize>) -> SdkResult<Vec<LogEntry>> {
        let history = self.history();
        let head = history.resolve_head(&self.refs)?;
        let entries = history
            .walk(head)
            .take(limit.unwrap_or(usize::MAX))
            .map(|step| step.map(|(id, commit)| LogEntry { id, commit }))
            .collect::<HistoryResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Look up an object by (abbreviated) digest.
    ///
    /// The kind is the one whose framed hash reproduces the digest.
    pub fn cat_object(&self, prefix: &str) -> SdkResult<CatObject> {
        let id = self.store.resolve_prefix(prefix)?;
        let data = self.store.read(&id)?.ok_or(StoreError::NotFound(id))?;
        let kind = KINDS
            .into_iter()
            .find(|kind| kind.hasher().verify(&data, &id))
            .ok_or_else(|| StoreError::CorruptObject {
                id,
                reason: "payload matches no object kind".into(),
            })?;
        Ok(CatObject { id, kind, data })
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
