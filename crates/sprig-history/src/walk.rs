use std::collections::HashSet;

use sprig_store::Commit;
use sprig_types::ObjectId;

use crate::error::{HistoryError, HistoryResult};
use crate::reader::HistoryReader;

/// Iterator over a linear history, newest first.
///
/// Yields `(id, commit)` pairs. Stops after the first error; a repeated
/// digest is reported as [`HistoryError::CyclicHistory`].
pub struct HistoryWalk<'a> {
    reader: HistoryReader<'a>,
    next: Option<ObjectId>,
    visited: HashSet<ObjectId>,
}

impl<'a> HistoryWalk<'a> {
    pub(crate) fn new(reader: HistoryReader<'a>, start: Option<ObjectId>) -> Self {
        Self {
            reader,
            next: start,
            visited: HashSet::new(),
        }
    }
}

impl Iterator for HistoryWalk<'_> {
    type Item = HistoryResult<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        if !self.visited.insert(id) {
            return Some(Err(HistoryError::CyclicHistory(id)));
        }
        match self.reader.read_commit(&id) {
            Ok(commit) => {
                self.next = commit.parent;
                Some(Ok((id, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
