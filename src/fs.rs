//! ## fs
//!
//! File entry and metadata model for remote shares

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Entry yielded by directory enumeration.
///
/// Carries the bare name and the share-relative path of the entry,
/// built by joining the listed directory with the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
}

impl FileEntry {
    /// Entry name, without any path component
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Share-relative path of the entry
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Entry extension, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
    }
}

/// Kind of a remote entry
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Directory,
    #[default]
    File,
    Symlink,
}

impl FileType {
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }
}

/// Metadata attached to a remote entry
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Last access time
    pub accessed: Option<SystemTime>,
    /// Creation time
    pub created: Option<SystemTime>,
    /// Last modification time
    pub modified: Option<SystemTime>,
    /// Entry kind
    pub file_type: FileType,
    /// Group id of the owner
    pub gid: Option<u32>,
    /// User id of the owner
    pub uid: Option<u32>,
    /// Unix permission bits
    pub mode: Option<u32>,
    /// Size in bytes
    pub size: u64,
}

impl Metadata {
    /// Construct metadata with the provided access time
    pub fn accessed(mut self, accessed: SystemTime) -> Self {
        self.accessed = Some(accessed);
        self
    }

    /// Construct metadata with the provided creation time
    pub fn created(mut self, created: SystemTime) -> Self {
        self.created = Some(created);
        self
    }

    /// Construct metadata with the provided modification time
    pub fn modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Construct metadata with the provided file type
    pub fn file_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self
    }

    /// Construct metadata with the provided group id
    pub fn gid(mut self, gid: u32) -> Self {
        self.gid = Some(gid);
        self
    }

    /// Construct metadata with the provided user id
    pub fn uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Construct metadata with the provided unix permission bits
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Construct metadata with the provided size
    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

/// Stat record for a single remote entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub metadata: Metadata,
}

impl FileInfo {
    /// Entry name, taken from the last path component
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Share-relative path the stat was taken at
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Entry metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        self.metadata.file_type.is_dir()
    }

    /// Whether the entry is a regular file
    pub fn is_file(&self) -> bool {
        self.metadata.file_type.is_file()
    }
}
