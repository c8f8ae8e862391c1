use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone};
use serde::{Deserialize, Serialize};
use sprig_crypto::ContentHasher;
use sprig_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw file contents.
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Root tree plus lineage and author metadata.
    Commit,
}

impl ObjectKind {
    /// The hasher whose frame header carries this kind's tag.
    pub fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Tree => &ContentHasher::TREE,
            Self::Commit => &ContentHasher::COMMIT,
        }
    }

    /// The tag used in frame headers and tree lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(format!("unknown object kind {other:?}")),
        }
    }
}

/// A stored object: kind tag + raw payload + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// payload; only the kind participates in hashing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The raw payload bytes, exactly as written to disk.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind != kind {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {kind}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (analogous to git blob).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn into_stored_object(self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data)
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree or index entry.
///
/// Only the coarse classification is tracked, never full permission bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    /// Octal mode value (for display/serialization).
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o040000 => Some(Self::Directory),
            _ => None,
        }
    }

    /// Parse from the octal text form (`"100644"`, `"40000"`, ...).
    pub fn from_octal_str(s: &str) -> Option<Self> {
        u32::from_str_radix(s, 8).ok().and_then(Self::from_mode_bits)
    }

    /// The kind of object an entry with this mode points at.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            _ => ObjectKind::Blob,
        }
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode (regular, executable, symlink, directory).
    pub mode: EntryMode,
    /// Entry name (filename or directory name, never a path).
    pub name: String,
    /// Content-addressed ID of the referenced object.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// Kind of the referenced object, derived from the mode.
    pub fn kind(&self) -> ObjectKind {
        self.mode.object_kind()
    }

    fn parse_line(line: &str) -> StoreResult<Self> {
        let parts: Vec<&str> = line.splitn(4, '\t').collect();
        if parts.len() != 4 {
            return Err(StoreError::malformed_tree(format!(
                "expected 4 tab-separated fields, got {}: {line:?}",
                parts.len()
            )));
        }
        let mode = EntryMode::from_octal_str(parts[0])
            .ok_or_else(|| StoreError::malformed_tree(format!("invalid mode {:?}", parts[0])))?;
        let kind: ObjectKind = parts[1].parse().map_err(StoreError::malformed_tree)?;
        if kind != mode.object_kind() {
            return Err(StoreError::malformed_tree(format!(
                "mode {mode} does not match kind {kind}"
            )));
        }
        let object_id = ObjectId::from_hex(parts[2])
            .map_err(|e| StoreError::malformed_tree(format!("bad digest {:?}: {e}", parts[2])))?;
        let name = parts[3];
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::malformed_tree(format!("invalid entry name {name:?}")));
        }
        Ok(Self::new(mode, name, object_id))
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Directory listing object (analogous to git tree).
///
/// Serialized as one `mode\tkind\tdigest\tname\n` line per entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    /// Sorted entries in this directory.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    ///
    /// Entries are sorted by name for deterministic hashing.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Serialize to the line-oriented payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = String::new();
        for e in &self.entries {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                e.mode,
                e.kind(),
                e.object_id,
                e.name
            ));
        }
        out.into_bytes()
    }

    /// Parse a line-oriented payload.
    ///
    /// Any structurally invalid line fails the whole parse.
    pub fn decode(data: &[u8]) -> StoreResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| StoreError::malformed_tree(format!("not valid UTF-8: {e}")))?;
        let mut entries = Vec::new();
        for line in text.split_terminator('\n') {
            entries.push(TreeEntry::parse_line(line)?);
        }
        let tree = Self::new(entries);
        if let Some(pair) = tree.entries.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(StoreError::malformed_tree(format!(
                "duplicate entry name {:?}",
                pair[0].name
            )));
        }
        Ok(tree)
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Tree, self.encode())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        Self::decode(&obj.data)
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Author or committer identity with a timestamp.
///
/// Rendered as `<name> <<email>> <epoch-seconds> <±HHMM>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// UTC offset as `+HHMM` / `-HHMM`.
    pub timezone: String,
}

impl Signature {
    /// Signature stamped with the current local time.
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::at(name, email, Local::now().fixed_offset())
    }

    /// Signature stamped with the given time.
    pub fn at<Tz: TimeZone>(
        name: impl Into<String>,
        email: impl Into<String>,
        when: DateTime<Tz>,
    ) -> Self {
        let offset = when.offset().fix().local_minus_utc();
        Self {
            name: name.into(),
            email: email.into(),
            timestamp: when.timestamp(),
            timezone: format_offset(offset),
        }
    }

    /// Check that the identity survives the `name <email>` header format.
    ///
    /// The name must be non-blank. Neither part may contain `<`, `>` or a
    /// line break.
    pub fn validate(&self) -> StoreResult<()> {
        let reject = |reason: &str| {
            Err(StoreError::InvalidIdentity {
                identity: format!("{} <{}>", self.name, self.email),
                reason: reason.to_string(),
            })
        };
        if self.name.trim().is_empty() {
            return reject("name is empty");
        }
        if self.name.contains(IDENTITY_DELIMITERS) {
            return reject("name contains `<`, `>` or a line break");
        }
        if self.email.contains(IDENTITY_DELIMITERS) {
            return reject("email contains `<`, `>` or a line break");
        }
        Ok(())
    }

    /// The timestamp in the recorded timezone, if both are representable.
    pub fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(parse_offset(&self.timezone)?)?;
        offset.timestamp_opt(self.timestamp, 0).single()
    }

    fn parse(line: &str) -> StoreResult<Self> {
        let lt = line.find('<');
        let gt = line.find('>');
        let (lt, gt) = match (lt, gt) {
            (Some(lt), Some(gt)) if lt < gt => (lt, gt),
            _ => {
                return Err(StoreError::malformed_commit(format!(
                    "identity has no <email>: {line:?}"
                )))
            }
        };
        let name = line[..lt].trim();
        let email = &line[lt + 1..gt];
        let rest: Vec<&str> = line[gt + 1..].split_whitespace().collect();
        if name.is_empty() || rest.len() != 2 {
            return Err(StoreError::malformed_commit(format!(
                "identity must be `name <email> epoch tz`: {line:?}"
            )));
        }
        let timestamp = rest[0]
            .parse::<i64>()
            .map_err(|e| StoreError::malformed_commit(format!("bad timestamp {:?}: {e}", rest[0])))?;
        if parse_offset(rest[1]).is_none() {
            return Err(StoreError::malformed_commit(format!(
                "bad timezone {:?}",
                rest[1]
            )));
        }
        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            timestamp,
            timezone: rest[1].to_string(),
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {} {}",
            self.name, self.email, self.timestamp, self.timezone
        )
    }
}

const IDENTITY_DELIMITERS: &[char] = &['<', '>', '\n', '\r'];

fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)
}

/// `"+0530"` -> 19800 seconds.
fn parse_offset(tz: &str) -> Option<i32> {
    let bytes = tz.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = tz[1..3].parse().ok()?;
    let minutes: i32 = tz[3..5].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

/// A commit record: root tree, optional parent, identities and message.
///
/// History is strictly linear, so there is at most one parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub committer: Option<Signature>,
    pub message: String,
}

impl Commit {
    /// Serialize to the header + blank line + message payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = format!("tree {}\n", self.tree);
        if let Some(parent) = &self.parent {
            out.push_str(&format!("parent {parent}\n"));
        }
        out.push_str(&format!("author {}\n", self.author));
        if let Some(committer) = &self.committer {
            out.push_str(&format!("committer {committer}\n"));
        }
        out.push('\n');
        out.push_str(&self.message);
        out.into_bytes()
    }

    /// Parse a commit payload.
    pub fn decode(data: &[u8]) -> StoreResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| StoreError::malformed_commit(format!("not valid UTF-8: {e}")))?;
        let (header, message) = text
            .split_once("\n\n")
            .ok_or_else(|| StoreError::malformed_commit("missing blank line before message"))?;
        let mut lines = header.lines().peekable();

        let tree = match lines.next().and_then(|l| l.strip_prefix("tree ")) {
            Some(hex) => parse_header_id("tree", hex)?,
            None => return Err(StoreError::malformed_commit("first line must be `tree <digest>`")),
        };

        let parent = match lines.peek().copied().and_then(|l| l.strip_prefix("parent ")) {
            Some(hex) => {
                let id = parse_header_id("parent", hex)?;
                lines.next();
                Some(id)
            }
            None => None,
        };

        let author = match lines.next().and_then(|l| l.strip_prefix("author ")) {
            Some(rest) => Signature::parse(rest)?,
            None => return Err(StoreError::malformed_commit("missing author line")),
        };

        let committer = match lines.next() {
            Some(line) => match line.strip_prefix("committer ") {
                Some(rest) => Some(Signature::parse(rest)?),
                None => {
                    return Err(StoreError::malformed_commit(format!(
                        "unexpected header line {line:?}"
                    )))
                }
            },
            None => None,
        };

        if let Some(line) = lines.next() {
            return Err(StoreError::malformed_commit(format!(
                "unexpected header line {line:?}"
            )));
        }

        Ok(Self {
            tree,
            parent,
            author,
            committer,
            message: message.to_string(),
        })
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Commit, self.encode())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        Self::decode(&obj.data)
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

fn parse_header_id(field: &str, hex: &str) -> StoreResult<ObjectId> {
    ObjectId::from_hex(hex.trim())
        .map_err(|e| StoreError::malformed_commit(format!("bad {field} digest {hex:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_hash([b; 32])
    }

    fn sig() -> Signature {
        Signature {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            timestamp: 1_700_000_000,
            timezone: "+0530".into(),
        }
    }

    #[test]
    fn blob_roundtrip() {
        let blob = Blob::new(b"hello world".to_vec());
        let stored = blob.clone().into_stored_object();
        let decoded = Blob::from_stored_object(&stored).unwrap();
        assert_eq!(blob, decoded);
    }

    #[test]
    fn blob_kind_mismatch() {
        let stored = StoredObject::new(ObjectKind::Tree, b"not a blob".to_vec());
        let err = Blob::from_stored_object(&stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn tree_entries_sorted() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "zebra.txt", oid(1)),
            TreeEntry::new(EntryMode::Regular, "alpha.txt", oid(2)),
            TreeEntry::new(EntryMode::Directory, "middle", oid(3)),
        ]);
        assert_eq!(tree.entries[0].name, "alpha.txt");
        assert_eq!(tree.entries[1].name, "middle");
        assert_eq!(tree.entries[2].name, "zebra.txt");
    }

    #[test]
    fn tree_line_format() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Directory, "sub", oid(2)),
            TreeEntry::new(EntryMode::Executable, "run.sh", oid(1)),
        ]);
        let text = String::from_utf8(tree.encode()).unwrap();
        let expected = format!(
            "100755\tblob\t{}\trun.sh\n40000\ttree\t{}\tsub\n",
            oid(1),
            oid(2)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn tree_decode_reads_encoded_form() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "file.txt", oid(1)),
            TreeEntry::new(EntryMode::Symlink, "link", oid(2)),
            TreeEntry::new(EntryMode::Directory, "subdir", oid(3)),
        ]);
        let decoded = Tree::from_stored_object(&tree.to_stored_object()).unwrap();
        assert_eq!(tree, decoded);
    }

    #[test]
    fn tree_decode_rejects_wrong_field_count() {
        let err = Tree::decode(b"100644\tblob\tabc\n").unwrap_err();
        assert!(matches!(err, StoreError::MalformedTree { .. }));
    }

    #[test]
    fn tree_decode_rejects_kind_mode_mismatch() {
        let line = format!("100644\ttree\t{}\tx\n", oid(1));
        let err = Tree::decode(line.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::MalformedTree { .. }));
    }

    #[test]
    fn tree_decode_rejects_unknown_mode() {
        let line = format!("777\tblob\t{}\tx\n", oid(1));
        assert!(matches!(
            Tree::decode(line.as_bytes()),
            Err(StoreError::MalformedTree { .. })
        ));
    }

    #[test]
    fn tree_decode_rejects_duplicate_names() {
        let text = format!("100644\tblob\t{}\ta\n40000\ttree\t{}\ta\n", oid(1), oid(2));
        let err = Tree::decode(text.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::MalformedTree { reason } if reason.contains("duplicate")));
    }

    #[test]
    fn tree_decode_rejects_bad_digest() {
        assert!(matches!(
            Tree::decode(b"100644\tblob\tnothex\tx\n"),
            Err(StoreError::MalformedTree { .. })
        ));
    }

    #[test]
    fn empty_tree_encodes_to_nothing() {
        let tree = Tree::empty();
        assert!(tree.is_empty());
        assert!(tree.encode().is_empty());
        assert_eq!(Tree::decode(b"").unwrap(), tree);
    }

    #[test]
    fn tree_get_entry() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "a.txt", oid(1)),
            TreeEntry::new(EntryMode::Regular, "b.txt", oid(2)),
        ]);
        assert!(tree.get("a.txt").is_some());
        assert!(tree.get("missing").is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn entry_mode_octal_text() {
        assert_eq!(EntryMode::Regular.to_string(), "100644");
        assert_eq!(EntryMode::Directory.to_string(), "40000");
        assert_eq!(EntryMode::from_octal_str("120000"), Some(EntryMode::Symlink));
        assert_eq!(EntryMode::from_octal_str("040000"), Some(EntryMode::Directory));
        assert_eq!(EntryMode::from_octal_str("9"), None);
    }

    #[test]
    fn entry_mode_unknown_bits() {
        assert!(EntryMode::from_mode_bits(0o777).is_none());
    }

    #[test]
    fn commit_layout_with_parent() {
        let commit = Commit {
            tree: oid(1),
            parent: Some(oid(2)),
            author: sig(),
            committer: Some(sig()),
            message: "initial import\n".into(),
        };
        let text = String::from_utf8(commit.encode()).unwrap();
        let expected = format!(
            "tree {}\nparent {}\nauthor Ada Lovelace <ada@example.com> 1700000000 +0530\n\
             committer Ada Lovelace <ada@example.com> 1700000000 +0530\n\ninitial import\n",
            oid(1),
            oid(2)
        );
        assert_eq!(text, expected);
        assert_eq!(Commit::decode(text.as_bytes()).unwrap(), commit);
    }

    #[test]
    fn commit_without_parent_or_committer() {
        let commit = Commit {
            tree: oid(9),
            parent: None,
            author: sig(),
            committer: None,
            message: "root".into(),
        };
        let decoded = Commit::from_stored_object(&commit.to_stored_object()).unwrap();
        assert_eq!(decoded, commit);
        assert_eq!(decoded.summary(), "root");
    }

    #[test]
    fn commit_must_start_with_tree() {
        let text = format!("parent {}\nauthor a <b> 1 +0000\n\nmsg", oid(1));
        let err = Commit::decode(text.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::MalformedCommit { .. }));
    }

    #[test]
    fn commit_rejects_unsplittable_author() {
        for author in ["nobody", "a <b>", "a <b> 12", "a <b> x +0000", "a <b> 1 0000"] {
            let text = format!("tree {}\nauthor {author}\n\nmsg", oid(1));
            let err = Commit::decode(text.as_bytes()).unwrap_err();
            assert!(
                matches!(err, StoreError::MalformedCommit { .. }),
                "author {author:?} should be rejected"
            );
        }
    }

    #[test]
    fn commit_requires_blank_line() {
        let text = format!("tree {}\nauthor a <b> 1 +0000\n", oid(1));
        assert!(matches!(
            Commit::decode(text.as_bytes()),
            Err(StoreError::MalformedCommit { .. })
        ));
    }

    #[test]
    fn signature_offsets() {
        assert_eq!(format_offset(19_800), "+0530");
        assert_eq!(format_offset(-3_600), "-0100");
        assert_eq!(format_offset(0), "+0000");
        assert_eq!(parse_offset("-0100"), Some(-3_600));
        assert_eq!(parse_offset("+0575"), None);
    }

    #[test]
    fn signature_at_fixed_time() {
        let tz = FixedOffset::east_opt(-5 * 3600).unwrap();
        let when = tz.timestamp_opt(1_000, 0).unwrap();
        let s = Signature::at("n", "e@x", when);
        assert_eq!(s.timestamp, 1_000);
        assert_eq!(s.timezone, "-0500");
        assert_eq!(s.datetime(), Some(when));
    }

    #[test]
    fn identity_validation() {
        assert!(sig().validate().is_ok());
        let bad = [
            ("", "e@x"),
            ("  ", "e@x"),
            ("A <b> C", "e@x"),
            ("Ada", "a>b@x"),
            ("Ada\nX", "e@x"),
        ];
        for (name, email) in bad {
            let s = Signature {
                name: name.into(),
                email: email.into(),
                ..sig()
            };
            assert!(
                matches!(s.validate(), Err(StoreError::InvalidIdentity { .. })),
                "{name:?} <{email:?}> accepted"
            );
        }
    }

    #[test]
    fn valid_identity_survives_commit_roundtrip() {
        let author = Signature {
            name: "Grace B. Hopper".into(),
            email: "".into(),
            ..sig()
        };
        author.validate().unwrap();
        let commit = Commit {
            tree: oid(1),
            parent: None,
            author: author.clone(),
            committer: None,
            message: "m\n".into(),
        };
        assert_eq!(Commit::decode(&commit.encode()).unwrap().author, author);
    }

    #[test]
    fn stored_object_id_deterministic() {
        let obj = StoredObject::new(ObjectKind::Blob, b"deterministic".to_vec());
        assert_eq!(obj.compute_id(), obj.compute_id());
    }

    #[test]
    fn different_kinds_produce_different_ids() {
        let data = b"same data".to_vec();
        let blob = StoredObject::new(ObjectKind::Blob, data.clone());
        let tree = StoredObject::new(ObjectKind::Tree, data);
        assert_ne!(blob.compute_id(), tree.compute_id());
    }

    #[test]
    fn object_kind_display_and_parse() {
        for kind in [ObjectKind::Blob, ObjectKind::Tree, ObjectKind::Commit] {
            assert_eq!(kind.to_string().parse::<ObjectKind>().unwrap(), kind);
        }
        assert!("snapshot".parse::<ObjectKind>().is_err());
    }
}
