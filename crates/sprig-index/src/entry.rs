//! Index entry type and its persisted line form.

use sprig_store::EntryMode;
use sprig_types::ObjectId;

use crate::error::{IndexError, IndexResult};

/// An entry in the staging index, representing a tracked file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Relative path from the workdir root, `/`-separated.
    pub path: String,
    /// Content-addressed ID of the file's blob in the object store.
    pub object_id: ObjectId,
    /// File mode (regular, executable, symlink).
    pub mode: EntryMode,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time in nanoseconds since the Unix epoch.
    pub mtime: i64,
}

impl IndexEntry {
    /// Create a new index entry.
    pub fn new(
        path: impl Into<String>,
        object_id: ObjectId,
        mode: EntryMode,
        size: u64,
        mtime: i64,
    ) -> Self {
        Self {
            path: path.into(),
            object_id,
            mode,
            size,
            mtime,
        }
    }

    /// `path\tdigest\tmode\tsize\tmtime`, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.path, self.object_id, self.mode, self.size, self.mtime
        )
    }

    /// Parse one persisted line. `line_no` is 1-based, for error reporting.
    pub fn parse_line(line_no: usize, line: &str) -> IndexResult<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 5 {
            return Err(IndexError::corrupt(
                line_no,
                format!("expected 5 fields, found {}", fields.len()),
            ));
        }
        if fields[0].is_empty() {
            return Err(IndexError::corrupt(line_no, "empty path"));
        }
        let object_id = ObjectId::from_hex(fields[1])
            .map_err(|e| IndexError::corrupt(line_no, format!("bad digest: {e}")))?;
        let mode = EntryMode::from_octal_str(fields[2])
            .filter(|m| *m != EntryMode::Directory)
            .ok_or_else(|| IndexError::corrupt(line_no, format!("bad mode {:?}", fields[2])))?;
        let size = fields[3]
            .parse::<u64>()
            .map_err(|e| IndexError::corrupt(line_no, format!("bad size {:?}: {e}", fields[3])))?;
        let mtime = fields[4]
            .parse::<i64>()
            .map_err(|e| IndexError::corrupt(line_no, format!("bad mtime {:?}: {e}", fields[4])))?;
        Ok(Self {
            path: fields[0].to_string(),
            object_id,
            mode,
            size,
            mtime,
        })
    }

    /// Returns `true` if size, mtime and mode all match the on-disk values.
    pub fn matches_metadata(&self, mode: EntryMode, size: u64, mtime: i64) -> bool {
        self.size == size && self.mtime == mtime && self.mode == mode
    }
}
