//! Filesystem reference store.
//!
//! [`FileRefStore`] keeps `HEAD` and `ORIG_HEAD` as one-line files in the
//! repository control directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sprig_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::RefStore;

/// File name of the head reference.
pub const HEAD: &str = "HEAD";
/// File name of the previous-head reference.
pub const ORIG_HEAD: &str = "ORIG_HEAD";

/// A [`RefStore`] over the files of a control directory.
#[derive(Clone, Debug)]
pub struct FileRefStore {
    control_dir: PathBuf,
}

impl FileRefStore {
    /// Create a store for the given control directory (e.g. `.sprig/`).
    pub fn new(control_dir: impl Into<PathBuf>) -> Self {
        Self {
            control_dir: control_dir.into(),
        }
    }

    /// The control directory this store reads from.
    pub fn control_dir(&self) -> &Path {
        &self.control_dir
    }

    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        let content = match fs::read_to_string(self.control_dir.join(name)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let line = content.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line.lines().count() != 1 {
            return Err(RefError::Malformed {
                name: name.to_string(),
                content: line.to_string(),
            });
        }
        ObjectId::from_hex(line)
            .map(Some)
            .map_err(|_| RefError::Malformed {
                name: name.to_string(),
                content: line.to_string(),
            })
    }

    fn write_ref(&self, name: &str, id: &ObjectId) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.control_dir)?;
        writeln!(tmp, "{id}")?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.control_dir.join(name))
            .map_err(|e| e.error)?;
        debug!(reference = name, id = %id.short_hex(), "ref updated");
        Ok(())
    }
}

impl RefStore for FileRefStore {
    fn head(&self) -> Result<Option<ObjectId>> {
        self.read_ref(HEAD)
    }

    fn set_head(&self, id: &ObjectId) -> Result<()> {
        self.write_ref(HEAD, id)
    }

    fn orig_head(&self) -> Result<Option<ObjectId>> {
        self.read_ref(ORIG_HEAD)
    }

    fn set_orig_head(&self, id: &ObjectId) -> Result<()> {
        self.write_ref(ORIG_HEAD, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_hash([b; 32])
    }

    fn store_with_empty_head() -> (tempfile::TempDir, FileRefStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HEAD), "").unwrap();
        fs::write(dir.path().join(ORIG_HEAD), "").unwrap();
        let store = FileRefStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn empty_head_is_none() {
        let (_dir, store) = store_with_empty_head();
        assert!(store.head().unwrap().is_none());
        assert!(store.orig_head().unwrap().is_none());
    }

    #[test]
    fn missing_head_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRefStore::new(dir.path());
        assert!(store.head().unwrap().is_none());
    }

    #[test]
    fn set_and_read_head() {
        let (dir, store) = store_with_empty_head();
        store.set_head(&oid(7)).unwrap();
        assert_eq!(store.head().unwrap(), Some(oid(7)));

        let raw = fs::read_to_string(dir.path().join(HEAD)).unwrap();
        assert_eq!(raw, format!("{}\n", oid(7)));
    }

    #[test]
    fn malformed_head_rejected() {
        let (dir, store) = store_with_empty_head();
        fs::write(dir.path().join(HEAD), "ref: refs/heads/main\n").unwrap();
        let err = store.head().unwrap_err();
        assert!(matches!(err, RefError::Malformed { .. }));
    }

    #[test]
    fn multi_line_head_rejected() {
        let (dir, store) = store_with_empty_head();
        fs::write(dir.path().join(HEAD), format!("{}\n{}\n", oid(1), oid(2))).unwrap();
        assert!(matches!(store.head(), Err(RefError::Malformed { .. })));
    }

    #[test]
    fn advance_records_previous_head() {
        let (_dir, store) = store_with_empty_head();
        assert_eq!(store.advance_head(&oid(1)).unwrap(), None);
        assert!(store.orig_head().unwrap().is_none());

        assert_eq!(store.advance_head(&oid(2)).unwrap(), Some(oid(1)));
        assert_eq!(store.head().unwrap(), Some(oid(2)));
        assert_eq!(store.orig_head().unwrap(), Some(oid(1)));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (dir, store) = store_with_empty_head();
        store.set_head(&oid(3)).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {names:?}");
    }
}
