//! The [`RefStore`] trait defining the reference storage interface.

use sprig_types::ObjectId;

use crate::error::Result;

/// Storage backend for the head references.
///
/// Implementations must be thread-safe (`Send + Sync`). Updates replace the
/// whole reference at once; readers never observe a partial digest.
pub trait RefStore: Send + Sync {
    /// The current head commit.
    ///
    /// Returns `Ok(None)` before the first commit.
    fn head(&self) -> Result<Option<ObjectId>>;

    /// Point the head at `id`.
    fn set_head(&self, id: &ObjectId) -> Result<()>;

    /// The head as it was before the most recent commit, if any.
    fn orig_head(&self) -> Result<Option<ObjectId>>;

    /// Record `id` as the previous head.
    fn set_orig_head(&self, id: &ObjectId) -> Result<()>;

    /// Advance the head to `id`, recording the old head as `ORIG_HEAD`.
    ///
    /// Returns the previous head.
    fn advance_head(&self, id: &ObjectId) -> Result<Option<ObjectId>> {
        let previous = self.head()?;
        if let Some(prev) = &previous {
            self.set_orig_head(prev)?;
        }
        self.set_head(id)?;
        Ok(previous)
    }
}
