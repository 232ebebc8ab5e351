//! ## share
//!
//! Share client composition root

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use super::credentials::ShareCredentials;
use super::options::ShareOptions;
use super::session::{ConnectionSession, SessionState};
use super::stream::{ReadStream, WriteStream};
use super::{dir, transfer};
use crate::engine::ShareEngine;
use crate::error::{ShareError, ShareResult};
use crate::fs::{FileEntry, FileInfo};
use crate::utils::xattr::{self, AttributeValue};
use crate::utils::{path as path_utils, smb as smb_utils};

/// Client for one remote share.
///
/// Owns the session to `smb://host/share` and translates path-based
/// filesystem operations into engine requests over it. Every operation
/// establishes the session first, so an explicit [`ShareClient::connect`]
/// is optional.
///
/// Operations are synchronous and the session is not meant for
/// concurrent use; callers needing parallel operations against the
/// same share should use independent clients.
pub struct ShareClient {
    credentials: ShareCredentials,
    options: ShareOptions,
    session: ConnectionSession,
}

impl ShareClient {
    /// Create a client over the given engine
    pub fn new<E: ShareEngine + 'static>(
        credentials: ShareCredentials,
        options: ShareOptions,
        engine: E,
    ) -> Self {
        Self::with_engine(credentials, options, Arc::new(engine))
    }

    /// Create a client over an already shared engine
    pub fn with_engine(
        credentials: ShareCredentials,
        options: ShareOptions,
        engine: Arc<dyn ShareEngine>,
    ) -> Self {
        Self {
            credentials,
            options,
            session: ConnectionSession::new(engine),
        }
    }

    /// Identity this client operates on
    pub fn credentials(&self) -> &ShareCredentials {
        &self.credentials
    }

    /// Current session state
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Establish the session now instead of on first use
    pub fn connect(&mut self) -> ShareResult<()> {
        self.session.ensure_connected(&self.credentials)
    }

    /// Forget the established session; the next operation reconnects
    pub fn disconnect(&mut self) {
        debug!("disconnecting from {}", self.credentials.host());
        self.session.reset();
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// List the entries of the directory at `path`, excluding the
    /// reflexive `.` and `..` markers
    pub fn dir(&mut self, path: &Path) -> ShareResult<Vec<FileEntry>> {
        self.session.ensure_connected(&self.credentials)?;
        let address = self.address(path);
        trace!("listing entries at {}", address);
        dir::list_directory(self.session.engine().as_ref(), &address, path)
    }

    /// Stat a single path without enumerating its parent
    pub fn stat(&mut self, path: &Path) -> ShareResult<FileInfo> {
        self.session.ensure_connected(&self.credentials)?;
        let address = self.address(path);
        trace!("get stat for {}", address);
        self.session
            .engine()
            .stat(&address)
            .map(|stat| smb_utils::stat_to_info(path, stat))
    }

    /// Whether an entry exists at `path`
    pub fn exists(&mut self, path: &Path) -> ShareResult<bool> {
        trace!("checking if {} exists", path.display());
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(ShareError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Create the directory at `path`
    pub fn mkdir(&mut self, path: &Path) -> ShareResult<()> {
        self.session.ensure_connected(&self.credentials)?;
        if self.exists(path)? {
            return Err(ShareError::AlreadyExists);
        }
        let address = self.address(path);
        trace!("making directory at {}", address);
        self.session.engine().mkdir(&address, self.options.dir_mode)
    }

    /// Remove the empty directory at `path`
    pub fn rmdir(&mut self, path: &Path) -> ShareResult<()> {
        self.session.ensure_connected(&self.credentials)?;
        let address = self.address(path);
        trace!("removing directory at {}", address);
        self.session.engine().rmdir(&address)
    }

    /// Delete the file at `path`
    pub fn del(&mut self, path: &Path) -> ShareResult<()> {
        self.session.ensure_connected(&self.credentials)?;
        let address = self.address(path);
        trace!("removing file {}", address);
        self.session.engine().unlink(&address)
    }

    /// Rename `from` into `to`
    pub fn rename(&mut self, from: &Path, to: &Path) -> ShareResult<()> {
        self.session.ensure_connected(&self.credentials)?;
        let from = self.address(from);
        let to = self.address(to);
        trace!("moving {} to {}", from, to);
        self.session.engine().rename(&from, &to)
    }

    /// Upload `reader` into the file at `path`, chunk by chunk.
    /// Returns the number of bytes transferred.
    pub fn put<R: Read>(&mut self, reader: &mut R, path: &Path) -> ShareResult<u64> {
        let mut stream = self.write(path)?;
        trace!("uploading to {}", path.display());
        // an early return drops the stream, releasing the handle
        let transferred = transfer::upload(reader, &mut stream, self.options.chunk_size)?;
        stream.close()?;
        debug!("uploaded {} bytes to {}", transferred, path.display());
        Ok(transferred)
    }

    /// Download the file at `path` into `writer`, chunk by chunk.
    /// Returns the number of bytes transferred.
    pub fn get<W: Write>(&mut self, path: &Path, writer: &mut W) -> ShareResult<u64> {
        let mut stream = self.read(path)?;
        trace!("downloading from {}", path.display());
        let transferred = transfer::download(&mut stream, writer, self.options.chunk_size)?;
        stream.close()?;
        debug!("downloaded {} bytes from {}", transferred, path.display());
        Ok(transferred)
    }

    /// Open the file at `path` for incremental reading.
    ///
    /// The returned stream owns the remote handle; the caller closes it
    /// (or lets drop release it).
    pub fn read(&mut self, path: &Path) -> ShareResult<ReadStream> {
        self.session.ensure_connected(&self.credentials)?;
        let address = self.address(path);
        trace!("opening {} for read", address);
        let token = self.session.engine().open(&address)?;
        Ok(ReadStream::new(Arc::clone(self.session.engine()), token))
    }

    /// Create (or truncate) the file at `path` for incremental writing
    pub fn write(&mut self, path: &Path) -> ShareResult<WriteStream> {
        self.session.ensure_connected(&self.credentials)?;
        let address = self.address(path);
        trace!("opening {} for write", address);
        let token = self
            .session
            .engine()
            .create(&address, self.options.file_mode)?;
        Ok(WriteStream::new(Arc::clone(self.session.engine()), token))
    }

    /// Query the extended attribute `name` at `path`, decoding the
    /// reserved DOS mode key
    pub fn get_attribute(&mut self, path: &Path, name: &str) -> ShareResult<AttributeValue> {
        self.session.ensure_connected(&self.credentials)?;
        let address = self.address(path);
        trace!("reading attribute {} of {}", name, address);
        let raw = self.session.engine().getxattr(&address, name)?;
        xattr::decode_attribute(name, raw)
    }

    // -- private

    fn address<P: AsRef<Path>>(&self, path: P) -> String {
        path_utils::build_address(self.credentials.host(), self.credentials.share(), path)
    }
}

#[cfg(test)]
mod test {

    use std::io::Cursor;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use rand::RngCore;

    use super::*;
    use crate::engine::MemoryEngine;
    use crate::error::ConnectError;

    fn init_client() -> (Arc<MemoryEngine>, ShareClient) {
        crate::mock::logger();
        let engine = Arc::new(
            MemoryEngine::new("localhost", "temp")
                .credentials("test", "test")
                .dir("x/sub")
                .file("x/a.txt", b"test data\n")
                .xattr("x/a.txt", "user.comment", "hello world"),
        );
        let client = ShareClient::with_engine(
            ShareCredentials::new("localhost", "temp")
                .username("test")
                .password("test"),
            ShareOptions::default(),
            Arc::clone(&engine) as Arc<dyn ShareEngine>,
        );
        (engine, client)
    }

    #[test]
    fn should_connect_implicitly_on_first_operation() {
        let (engine, mut client) = init_client();
        assert!(!client.is_connected());
        assert!(client.dir(Path::new("/x")).is_ok());
        assert!(client.is_connected());
        assert_eq!(engine.init_calls().len(), 1);
    }

    #[test]
    fn should_fail_with_auth_error_and_stay_unconnected() {
        crate::mock::logger();
        let engine =
            Arc::new(MemoryEngine::new("localhost", "temp").credentials("test", "letmein"));
        let mut client = ShareClient::with_engine(
            ShareCredentials::new("localhost", "temp")
                .username("test")
                .password("test"),
            ShareOptions::default(),
            Arc::clone(&engine) as Arc<dyn ShareEngine>,
        );
        assert!(matches!(
            client.dir(Path::new("/")).unwrap_err(),
            ShareError::Connect(ConnectError::AuthenticationFailed)
        ));
        assert_eq!(client.session_state(), SessionState::Unconnected);
        // once the server accepts the password the same client recovers
        engine.update_credentials("test", "test");
        assert!(client.dir(Path::new("/")).is_ok());
        assert_eq!(engine.init_calls().len(), 2);
    }

    #[test]
    fn should_reconnect_after_disconnect() {
        let (engine, mut client) = init_client();
        assert!(client.connect().is_ok());
        client.disconnect();
        assert!(!client.is_connected());
        assert!(client.stat(Path::new("/x")).is_ok());
        assert_eq!(engine.init_calls().len(), 2);
    }

    #[test]
    fn should_list_dir() {
        let (engine, mut client) = init_client();
        let entries = client.dir(Path::new("/x")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), "a.txt");
        assert_eq!(entries[0].path, PathBuf::from("/x/a.txt"));
        assert_eq!(entries[0].extension().as_deref(), Some("txt"));
        assert_eq!(entries[1].name(), "sub");
        assert_eq!(entries[1].path, PathBuf::from("/x/sub"));
        assert_eq!(engine.open_handles(), 0);
    }

    #[test]
    fn should_not_list_dir() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.dir(Path::new("/nope")).unwrap_err(),
            ShareError::NotFound
        ));
        assert!(matches!(
            client.dir(Path::new("/x/a.txt")).unwrap_err(),
            ShareError::InvalidType
        ));
    }

    #[test]
    fn should_stat_file() {
        let (_, mut client) = init_client();
        let info = client.stat(Path::new("/x/a.txt")).unwrap();
        assert_eq!(info.name().as_str(), "a.txt");
        assert_eq!(info.path(), Path::new("/x/a.txt"));
        assert!(info.is_file());
        assert_eq!(info.metadata().size, 10);
    }

    #[test]
    fn should_not_stat_file() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.stat(Path::new("/missing")).unwrap_err(),
            ShareError::NotFound
        ));
    }

    #[test]
    fn should_tell_whether_file_exists() {
        let (_, mut client) = init_client();
        assert!(client.exists(Path::new("/x/a.txt")).unwrap());
        assert!(!client.exists(Path::new("/x/b.txt")).unwrap());
    }

    #[test]
    fn should_create_directory() {
        let (engine, mut client) = init_client();
        assert!(client.mkdir(Path::new("/x/mydir")).is_ok());
        assert!(engine.entry_exists("x/mydir"));
    }

    #[test]
    fn should_not_create_directory_cause_already_exists() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.mkdir(Path::new("/x/sub")).unwrap_err(),
            ShareError::AlreadyExists
        ));
    }

    #[test]
    fn should_not_create_directory_without_parent() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.mkdir(Path::new("/missing/child")).unwrap_err(),
            ShareError::NotFound
        ));
    }

    #[test]
    fn should_remove_directory() {
        let (engine, mut client) = init_client();
        assert!(client.rmdir(Path::new("/x/sub")).is_ok());
        assert!(!engine.entry_exists("x/sub"));
    }

    #[test]
    fn should_not_remove_non_empty_directory() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.rmdir(Path::new("/x")).unwrap_err(),
            ShareError::InvalidType
        ));
    }

    #[test]
    fn should_not_remove_file_as_directory() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.rmdir(Path::new("/x/a.txt")).unwrap_err(),
            ShareError::InvalidType
        ));
    }

    #[test]
    fn should_delete_file() {
        let (engine, mut client) = init_client();
        assert!(client.del(Path::new("/x/a.txt")).is_ok());
        assert!(!engine.entry_exists("x/a.txt"));
    }

    #[test]
    fn should_connect_before_delete() {
        // delete as the very first operation must connect like its
        // siblings do
        let (engine, mut client) = init_client();
        assert!(client.del(Path::new("/x/a.txt")).is_ok());
        assert_eq!(engine.init_calls().len(), 1);
    }

    #[test]
    fn should_not_delete_directory() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.del(Path::new("/x/sub")).unwrap_err(),
            ShareError::InvalidType
        ));
    }

    #[test]
    fn should_rename_entry() {
        let (engine, mut client) = init_client();
        assert!(client
            .rename(Path::new("/x/a.txt"), Path::new("/x/b.txt"))
            .is_ok());
        assert!(!engine.entry_exists("x/a.txt"));
        assert!(engine.entry_exists("x/b.txt"));
    }

    #[test]
    fn should_not_rename_onto_existing_entry() {
        let (engine, mut client) = init_client();
        assert!(matches!(
            client
                .rename(Path::new("/x/a.txt"), Path::new("/x/sub"))
                .unwrap_err(),
            ShareError::AlreadyExists
        ));
        assert!(engine.entry_exists("x/a.txt"));
        assert!(engine.entry_exists("x/sub"));
    }

    #[test]
    fn should_not_rename_missing_entry() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client
                .rename(Path::new("/missing"), Path::new("/elsewhere"))
                .unwrap_err(),
            ShareError::NotFound
        ));
    }

    #[test]
    fn should_round_trip_files_across_chunk_boundaries() {
        let (engine, mut client) = init_client();
        for size in [0usize, 1, 4095, 4096, 10000] {
            let mut data = vec![0u8; size];
            rand::thread_rng().fill_bytes(&mut data);
            let remote = PathBuf::from(format!("/x/blob-{}.bin", size));
            let mut reader = Cursor::new(data.clone());
            assert_eq!(client.put(&mut reader, &remote).unwrap(), size as u64);
            let mut out = Vec::new();
            assert_eq!(client.get(&remote, &mut out).unwrap(), size as u64);
            assert_eq!(out, data, "round trip of {} bytes", size);
        }
        assert_eq!(engine.open_handles(), 0);
        assert_eq!(engine.double_closes(), 0);
    }

    #[test]
    fn should_round_trip_through_local_files() {
        let (_, mut client) = init_client();
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local.txt");
        std::fs::write(&local, b"on disk\n").unwrap();

        let mut source = std::fs::File::open(&local).unwrap();
        assert_eq!(
            client.put(&mut source, Path::new("/x/copy.txt")).unwrap(),
            8
        );

        let target_path = dir.path().join("back.txt");
        let mut target = std::fs::File::create(&target_path).unwrap();
        assert_eq!(
            client.get(Path::new("/x/copy.txt"), &mut target).unwrap(),
            8
        );
        drop(target);
        assert_eq!(std::fs::read(&target_path).unwrap(), b"on disk\n".to_vec());
    }

    #[test]
    fn should_not_put_without_parent() {
        let (_, mut client) = init_client();
        let mut reader = Cursor::new(b"data".to_vec());
        assert!(matches!(
            client
                .put(&mut reader, Path::new("/missing/child.txt"))
                .unwrap_err(),
            ShareError::NotFound
        ));
    }

    #[test]
    fn should_not_put_over_directory() {
        let (_, mut client) = init_client();
        let mut reader = Cursor::new(b"data".to_vec());
        assert!(matches!(
            client.put(&mut reader, Path::new("/x/sub")).unwrap_err(),
            ShareError::InvalidType
        ));
    }

    #[test]
    fn should_not_get_directory() {
        let (_, mut client) = init_client();
        let mut out = Vec::new();
        assert!(matches!(
            client.get(Path::new("/x/sub"), &mut out).unwrap_err(),
            ShareError::InvalidType
        ));
    }

    #[test]
    fn should_close_remote_handle_when_get_fails_midway() {
        crate::mock::logger();
        let engine = Arc::new(
            MemoryEngine::new("localhost", "temp")
                .file("big.bin", &vec![9u8; 4096 * 3])
                .fail_reads_after(2),
        );
        let mut client = ShareClient::with_engine(
            ShareCredentials::new("localhost", "temp")
                .username("test")
                .password("test"),
            ShareOptions::default(),
            Arc::clone(&engine) as Arc<dyn ShareEngine>,
        );
        let mut out = Vec::new();
        match client.get(Path::new("/big.bin"), &mut out).unwrap_err() {
            ShareError::Transfer { bytes, .. } => assert_eq!(bytes, 8192),
            other => panic!("unexpected error: {other:?}"),
        }
        // the handle was still released, exactly once
        assert_eq!(engine.open_handles(), 0);
        assert_eq!(engine.double_closes(), 0);
    }

    #[test]
    fn should_stream_reads_and_writes() {
        let (engine, mut client) = init_client();
        let mut stream = client.write(Path::new("/x/streamed.txt")).unwrap();
        stream.write_all(b"streamed contents").unwrap();
        stream.close().unwrap();

        let mut stream = client.read(Path::new("/x/streamed.txt")).unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        stream.close().unwrap();
        assert_eq!(out.as_str(), "streamed contents");
        assert_eq!(engine.open_handles(), 0);
    }

    #[test]
    fn should_not_open_missing_file_for_read() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client.read(Path::new("/missing.txt")).unwrap_err(),
            ShareError::NotFound
        ));
    }

    #[test]
    fn should_decode_dos_mode_attribute() {
        let (_, mut client) = init_client();
        let value = client
            .get_attribute(Path::new("/x/a.txt"), xattr::DOS_MODE_ATTRIBUTE)
            .unwrap();
        assert_eq!(value, AttributeValue::DosMode(32));
        let value = client
            .get_attribute(Path::new("/x"), xattr::DOS_MODE_ATTRIBUTE)
            .unwrap();
        assert_eq!(value, AttributeValue::DosMode(16));
    }

    #[test]
    fn should_return_other_attributes_verbatim() {
        let (_, mut client) = init_client();
        let value = client
            .get_attribute(Path::new("/x/a.txt"), "user.comment")
            .unwrap();
        assert_eq!(value, AttributeValue::Text(String::from("hello world")));
    }

    #[test]
    fn should_fail_attribute_on_missing_path() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client
                .get_attribute(Path::new("/missing"), xattr::DOS_MODE_ATTRIBUTE)
                .unwrap_err(),
            ShareError::NotFound
        ));
    }

    #[test]
    fn should_fail_unsupported_attribute() {
        let (_, mut client) = init_client();
        assert!(matches!(
            client
                .get_attribute(Path::new("/x/a.txt"), "user.unknown")
                .unwrap_err(),
            ShareError::AttributeNotSupported(_)
        ));
    }
}
