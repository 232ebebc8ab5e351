//! # smb utils
//!
//! SMB protocol utilities

use std::path::Path;

use crate::engine::EntryStat;
use crate::fs::{FileInfo, Metadata};

/// Convert the engine-level stat for `path` into a `FileInfo`
pub fn stat_to_info<P: AsRef<Path>>(path: P, stat: EntryStat) -> FileInfo {
    let mut metadata = Metadata::default()
        .file_type(stat.file_type)
        .mode(stat.mode)
        .uid(stat.uid)
        .gid(stat.gid)
        .size(stat.size);
    if let Some(accessed) = stat.accessed {
        metadata = metadata.accessed(accessed);
    }
    if let Some(created) = stat.created {
        metadata = metadata.created(created);
    }
    if let Some(modified) = stat.modified {
        metadata = metadata.modified(modified);
    }
    FileInfo {
        path: path.as_ref().to_path_buf(),
        metadata,
    }
}
