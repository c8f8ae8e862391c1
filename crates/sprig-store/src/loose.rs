use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sprig_types::{is_hex, ObjectId, HEX_LEN};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreResult;
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Filesystem store keeping one file per object.
///
/// Layout: `<root>/<first 2 hex>/<remaining 62 hex>`, where `root` is the
/// repository's `objects/` directory. Files hold the bare payload.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    root: PathBuf,
}

impl LooseObjectStore {
    /// Open a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `objects/` directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path at which the object with `id` lives (whether or not it exists).
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.shard();
        self.root.join(dir).join(file)
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.object_path(id)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        let path = self.object_path(&id);
        if path.try_exists()? {
            debug!(id = %id.short_hex(), "object already stored");
            return Ok(id);
        }

        let shard = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "object path has no parent"))?;
        fs::create_dir_all(shard)?;

        let mut tmp = NamedTempFile::new_in(shard)?;
        tmp.write_all(&object.data)?;
        tmp.as_file().sync_all()?;
        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "object written");
            }
            // Another writer won the race with identical content.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(id = %id.short_hex(), "object appeared concurrently");
            }
            Err(e) => return Err(e.error.into()),
        }
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).try_exists()?)
    }

    fn ids_with_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        let (dir, rest) = prefix.split_at(2usize.min(prefix.len()));
        let shard = self.root.join(dir);
        let entries = match fs::read_dir(&shard) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            // Skips in-flight temp files and anything else foreign.
            if name.len() != HEX_LEN - 2 || !is_hex(name) || !name.starts_with(rest) {
                continue;
            }
            if let Ok(id) = ObjectId::from_hex(&format!("{dir}{name}")) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::object::{Blob, ObjectKind};

    fn blob(data: &[u8]) -> StoredObject {
        Blob::new(data.to_vec()).into_stored_object()
    }

    fn files_under(dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for shard in fs::read_dir(dir).unwrap() {
            let shard = shard.unwrap().path();
            for file in fs::read_dir(&shard).unwrap() {
                out.push(file.unwrap().path());
            }
        }
        out
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path().join("objects"));
        let id = store.write(&blob(b"hello")).unwrap();

        assert_eq!(store.read(&id).unwrap().unwrap(), b"hello");
        let obj = store.read_object(&id, ObjectKind::Blob).unwrap();
        assert_eq!(obj.data, b"hello");
    }

    #[test]
    fn object_lands_in_shard_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id = store.write(&blob(b"sharded")).unwrap();
        let hex = id.to_hex();
        let expected = dir.path().join(&hex[..2]).join(&hex[2..]);
        assert!(expected.is_file());
        assert_eq!(store.object_path(&id), expected);
    }

    #[test]
    fn idempotent_write_leaves_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id1 = store.write(&blob(b"same")).unwrap();
        let id2 = store.write(&blob(b"same")).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(files_under(dir.path()).len(), 1);
    }

    #[test]
    fn existing_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let obj = blob(b"original");
        let id = obj.compute_id();
        let path = store.object_path(&id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"tampered").unwrap();

        store.write(&obj).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"tampered");
    }

    #[test]
    fn read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id = blob(b"absent").compute_id();
        assert!(store.read(&id).unwrap().is_none());
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn corrupt_file_detected_on_typed_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id = store.write(&blob(b"good")).unwrap();
        fs::write(store.object_path(&id), b"bad").unwrap();

        let err = store.read_object(&id, ObjectKind::Blob).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    // -----------------------------------------------------------------------
    // Prefix resolution
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id = store.write(&blob(b"prefix me")).unwrap();
        let hex = id.to_hex();

        assert_eq!(store.resolve_prefix(&hex[..5]).unwrap(), id);
        assert_eq!(store.resolve_prefix(&hex).unwrap(), id);
    }

    #[test]
    fn prefix_too_short() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id = store.write(&blob(b"x")).unwrap();
        let err = store.resolve_prefix(&id.to_hex()[..4]).unwrap_err();
        assert!(matches!(err, StoreError::PrefixTooShort { .. }));
    }

    #[test]
    fn prefix_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let err = store.resolve_prefix("abcdef").unwrap_err();
        assert!(matches!(err, StoreError::PrefixNotFound(_)));
    }

    #[test]
    fn prefix_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id = store.write(&blob(b"real")).unwrap();
        let hex = id.to_hex();

        // Plant a second name sharing the first 6 characters.
        let mut other = hex[2..6].to_string();
        other.push_str(&"0".repeat(HEX_LEN - 6));
        if other == hex[2..] {
            other.replace_range(other.len() - 1.., "1");
        }
        fs::write(dir.path().join(&hex[..2]).join(other), b"").unwrap();

        let err = store.resolve_prefix(&hex[..6]).unwrap_err();
        assert!(matches!(err, StoreError::AmbiguousPrefix { candidates: 2, .. }));
    }

    #[test]
    fn temp_files_ignored_by_prefix_scan() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path());
        let id = store.write(&blob(b"scan")).unwrap();
        let hex = id.to_hex();
        fs::write(dir.path().join(&hex[..2]).join(".tmpXYZ"), b"").unwrap();

        assert_eq!(store.resolve_prefix(&hex[..5]).unwrap(), id);
    }
}
