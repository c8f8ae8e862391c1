//! Control directory layout.

use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing::debug;

use crate::error::SdkResult;

/// Loose objects, sharded by the first two hex digits.
pub const OBJECTS_DIR: &str = "objects";
/// Staging index file.
pub const INDEX_FILE: &str = "index";
/// Repository configuration file.
pub const CONFIG_FILE: &str = "config";

const SUBDIRS: &[&str] = &["hooks", "info", "logs", OBJECTS_DIR, "refs/heads"];
const EMPTY_FILES: &[&str] = &["HEAD", "ORIG_HEAD", INDEX_FILE];

/// Create the directories and empty files of a fresh control directory.
///
/// Existing files are left untouched.
pub fn create_skeleton(control_dir: &Path) -> SdkResult<()> {
    for dir in SUBDIRS {
        fs::create_dir_all(control_dir.join(dir))?;
    }
    for file in EMPTY_FILES {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(control_dir.join(file))?;
    }
    debug!(path = %control_dir.display(), "control directory created");
    Ok(())
}
