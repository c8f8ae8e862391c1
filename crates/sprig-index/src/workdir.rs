//! Working tree access: walking, file metadata, content reads.

use std::fs::{self, File, Metadata};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sprig_crypto::ContentHasher;
use sprig_store::EntryMode;
use sprig_types::ObjectId;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{IndexError, IndexResult};

/// Name of the repository control directory at the working tree root.
pub const CONTROL_DIR: &str = ".sprig";

/// Result of comparing the working tree with the index, without staging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkdirScan {
    /// Indexed files whose content differs from the staged blob.
    pub modified: Vec<String>,
    /// Files on disk with no index entry.
    pub untracked: Vec<String>,
    /// Indexed files missing from disk.
    pub deleted: Vec<String>,
}

impl WorkdirScan {
    /// Returns `true` if the working tree matches the index.
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.untracked.is_empty() && self.deleted.is_empty()
    }
}

/// On-disk metadata relevant to change detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FileMeta {
    pub mode: EntryMode,
    pub size: u64,
    pub mtime: i64,
}

impl FileMeta {
    /// Build from `symlink_metadata`. Returns `None` for directories and
    /// special files.
    pub fn from_metadata(meta: &Metadata) -> Option<Self> {
        let file_type = meta.file_type();
        let mode = if file_type.is_symlink() {
            EntryMode::Symlink
        } else if file_type.is_file() {
            file_mode(meta)
        } else {
            return None;
        };
        Some(Self {
            mode,
            size: meta.len(),
            mtime: meta.modified().map(mtime_nanos).unwrap_or(0),
        })
    }
}

/// A file found by [`walk`].
#[derive(Clone, Debug)]
pub(crate) struct WorkdirFile {
    /// Path relative to the root, `/`-separated.
    pub rel: String,
    pub abs: PathBuf,
    pub meta: FileMeta,
}

#[cfg(unix)]
fn file_mode(meta: &Metadata) -> EntryMode {
    use std::os::unix::fs::PermissionsExt;
    if meta.permissions().mode() & 0o111 != 0 {
        EntryMode::Executable
    } else {
        EntryMode::Regular
    }
}

#[cfg(not(unix))]
fn file_mode(_meta: &Metadata) -> EntryMode {
    EntryMode::Regular
}

/// Nanoseconds since the Unix epoch; negative before it.
pub(crate) fn mtime_nanos(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => i64::try_from(e.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}

/// Bytes that make up the blob for a file: the link target for symlinks,
/// the file contents otherwise.
pub(crate) fn read_content(path: &Path, mode: EntryMode) -> IndexResult<Vec<u8>> {
    if mode == EntryMode::Symlink {
        let target = fs::read_link(path)?;
        return Ok(path_bytes(&target));
    }
    Ok(fs::read(path)?)
}

/// Blob digest of a file, streamed from disk without storing anything.
pub(crate) fn hash_file(path: &Path, mode: EntryMode) -> IndexResult<ObjectId> {
    if mode == EntryMode::Symlink {
        return Ok(ContentHasher::BLOB.hash(&read_content(path, mode)?));
    }
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    Ok(ContentHasher::BLOB.hash_reader(len, BufReader::new(file))?)
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().replace('\\', "/").into_bytes()
}

/// Convert a root-relative path into the index's `/`-separated form.
pub(crate) fn to_index_path(rel: &Path) -> IndexResult<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| IndexError::InvalidPath(rel.display().to_string()))?;
                if name.contains(['\t', '\n']) {
                    return Err(IndexError::InvalidPath(rel.display().to_string()));
                }
                parts.push(name);
            }
            Component::CurDir => {}
            _ => return Err(IndexError::InvalidPath(rel.display().to_string())),
        }
    }
    Ok(parts.join("/"))
}

/// Returns `true` if `path` names the control directory or something inside it.
pub(crate) fn is_control_path(path: &str) -> bool {
    path == CONTROL_DIR
        || path
            .strip_prefix(CONTROL_DIR)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let (named, rooted) = match out.components().next_back() {
                    Some(Component::Normal(_)) => (true, false),
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => (false, true),
                    _ => (false, false),
                };
                if named {
                    out.pop();
                } else if !rooted {
                    out.push("..");
                }
                // `..` at the root stays at the root.
            }
            other => out.push(other),
        }
    }
    out
}

/// Walk `root/subdir` (or the whole tree when `subdir` is empty), returning
/// every regular file and symlink outside the control directory.
///
/// Results are sorted by index path.
pub(crate) fn walk(root: &Path, subdir: &str) -> IndexResult<Vec<WorkdirFile>> {
    let start = if subdir.is_empty() {
        root.to_path_buf()
    } else {
        root.join(subdir)
    };

    let control = root.join(CONTROL_DIR);
    let mut files = Vec::new();
    let walker = WalkDir::new(&start)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.path() != control);

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Some(meta) = FileMeta::from_metadata(&entry.metadata()?) else {
            continue;
        };
        let rel_path = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| IndexError::InvalidPath(entry.path().display().to_string()))?;
        let rel = match to_index_path(rel_path) {
            Ok(rel) => rel,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping unindexable path");
                continue;
            }
        };
        files.push(WorkdirFile {
            rel,
            abs: entry.path().to_path_buf(),
            meta,
        });
    }

    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(files)
}
