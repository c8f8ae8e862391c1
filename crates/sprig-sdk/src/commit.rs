use std::borrow::Cow;

use serde::Serialize;
use sprig_store::{Commit, ObjectKind};
use sprig_types::ObjectId;

/// Result of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub id: ObjectId,
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    /// First line of the message.
    pub summary: String,
    /// Number of paths that differ from the parent.
    pub changes: usize,
}

/// One commit as listed by `log`, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: ObjectId,
    #[serde(flatten)]
    pub commit: Commit,
}

/// A stored object with its kind recovered from the digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

impl CatObject {
    /// Payload as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_store::Signature;

    #[test]
    fn log_entry_flattens_commit_fields() {
        let entry = LogEntry {
            id: ObjectId::from_hash([1; 32]),
            commit: Commit {
                tree: ObjectId::from_hash([2; 32]),
                parent: None,
                author: Signature {
                    name: "Ada".into(),
                    email: "ada@example.com".into(),
                    timestamp: 0,
                    timezone: "+0000".into(),
                },
                committer: None,
                message: "first\n".into(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "01".repeat(32));
        assert_eq!(json["tree"], "02".repeat(32));
        assert_eq!(json["author"]["name"], "Ada");
        assert_eq!(json["message"], "first\n");
    }

    #[test]
    fn lossy_text() {
        let obj = CatObject {
            id: ObjectId::from_hash([0; 32]),
            kind: ObjectKind::Blob,
            data: vec![b'h', b'i', 0xff],
        };
        assert_eq!(obj.text(), "hi\u{fffd}");
    }
}
