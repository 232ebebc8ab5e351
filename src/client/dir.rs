//! ## dir
//!
//! Directory enumeration

use std::path::Path;

use crate::engine::{DirToken, Dirent, ShareEngine};
use crate::error::ShareResult;
use crate::fs::FileEntry;

/// Scoped directory cursor.
///
/// The cursor is released on drop, so an error or early return while
/// enumerating cannot leak the remote handle.
struct DirGuard<'a> {
    engine: &'a dyn ShareEngine,
    token: DirToken,
    closed: bool,
}

impl<'a> DirGuard<'a> {
    fn open(engine: &'a dyn ShareEngine, address: &str) -> ShareResult<Self> {
        let token = engine.opendir(address)?;
        Ok(Self {
            engine,
            token,
            closed: false,
        })
    }

    fn advance(&mut self) -> ShareResult<Option<Dirent>> {
        self.engine.readdir(self.token)
    }

    fn close(mut self) -> ShareResult<()> {
        self.closed = true;
        self.engine.closedir(self.token)
    }
}

impl Drop for DirGuard<'_> {
    fn drop(&mut self) {
        if !self.closed {
            trace!("releasing unclosed directory cursor");
            let _ = self.engine.closedir(self.token);
        }
    }
}

/// List the entries of the directory at `address`.
///
/// Reflexive entries (`.` and `..`) are discarded; every other entry
/// is emitted with its path joined onto the caller-supplied `path`.
/// The listing is materialized eagerly and the cursor released before
/// returning.
pub(crate) fn list_directory(
    engine: &dyn ShareEngine,
    address: &str,
    path: &Path,
) -> ShareResult<Vec<FileEntry>> {
    let mut cursor = DirGuard::open(engine, address)?;
    let mut entries = Vec::new();
    while let Some(dirent) = cursor.advance()? {
        if dirent.name == "." || dirent.name == ".." {
            continue;
        }
        entries.push(FileEntry {
            path: path.join(&dirent.name),
            name: dirent.name,
        });
    }
    cursor.close()?;
    Ok(entries)
}
