//! ## memory
//!
//! In-memory share engine.
//!
//! Backs the share client with a tree held in process memory, so the
//! library can be exercised without a native protocol backend. Handle
//! accounting (leaks, double closes) and read-failure injection are
//! exposed for tests of the client's cleanup discipline.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::{DirToken, Dirent, EntryStat, FileToken, ShareEngine};
use crate::error::{ConnectError, ShareError, ShareResult};
use crate::fs::FileType;
use crate::utils::xattr::DOS_MODE_ATTRIBUTE;

/// A node of the in-memory tree
#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

impl Node {
    fn is_dir(&self) -> bool {
        matches!(self, Node::Dir)
    }

    fn file_type(&self) -> FileType {
        match self {
            Node::Dir => FileType::Directory,
            Node::File(_) => FileType::File,
        }
    }
}

/// Recorded `init` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCall {
    pub workgroup: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
struct OpenDir {
    entries: Vec<Dirent>,
}

#[derive(Debug)]
struct OpenFile {
    path: String,
    pos: usize,
}

#[derive(Debug, Default)]
struct EngineState {
    /// Share-relative path -> node; the empty path is the share root
    nodes: BTreeMap<String, Node>,
    xattrs: HashMap<String, HashMap<String, String>>,
    auth: Option<(String, String)>,
    init_calls: Vec<InitCall>,
    dirs: HashMap<u64, OpenDir>,
    files: HashMap<u64, OpenFile>,
    dir_closes: HashMap<u64, u32>,
    file_closes: HashMap<u64, u32>,
    next_token: u64,
    /// Remaining successful reads before injected failure, if armed
    read_budget: Option<u32>,
}

/// In-memory [`ShareEngine`] implementation
pub struct MemoryEngine {
    base: String,
    host_valid: bool,
    reachable: bool,
    state: Mutex<EngineState>,
}

impl MemoryEngine {
    /// Create an engine serving `smb://host/share` with an empty root
    /// directory and no credential check.
    pub fn new<S: AsRef<str>>(host: S, share: S) -> Self {
        let host = host.as_ref().to_string();
        let share = share.as_ref().trim_matches('/').to_string();
        let mut state = EngineState::default();
        state.nodes.insert(String::new(), Node::Dir);
        Self {
            base: format!("smb://{}/{}", host, share),
            host_valid: !host.is_empty() && !host.contains(char::is_whitespace),
            reachable: true,
            state: Mutex::new(state),
        }
    }

    /// Require this username and password at `init`
    pub fn credentials<S: AsRef<str>>(self, username: S, password: S) -> Self {
        self.lock().auth = Some((
            username.as_ref().to_string(),
            password.as_ref().to_string(),
        ));
        self
    }

    /// Make every `init` fail as if the host were down
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Pre-populate a directory, creating missing parents
    pub fn dir<S: AsRef<str>>(self, path: S) -> Self {
        {
            let mut state = self.lock();
            state.insert_parents(path.as_ref());
            state
                .nodes
                .insert(normalize(path.as_ref()), Node::Dir);
        }
        self
    }

    /// Pre-populate a file with `contents`, creating missing parents
    pub fn file<S: AsRef<str>>(self, path: S, contents: &[u8]) -> Self {
        {
            let mut state = self.lock();
            state.insert_parents(path.as_ref());
            state
                .nodes
                .insert(normalize(path.as_ref()), Node::File(contents.to_vec()));
        }
        self
    }

    /// Attach an extended attribute to a pre-populated entry
    pub fn xattr<S: AsRef<str>>(self, path: S, name: S, value: S) -> Self {
        self.lock()
            .xattrs
            .entry(normalize(path.as_ref()))
            .or_default()
            .insert(name.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Arm read-failure injection: the first `n` reads succeed, every
    /// read after that fails.
    pub fn fail_reads_after(self, n: u32) -> Self {
        self.lock().read_budget = Some(n);
        self
    }

    /// Replace the required credentials on a live engine
    pub fn update_credentials<S: AsRef<str>>(&self, username: S, password: S) {
        self.lock().auth = Some((
            username.as_ref().to_string(),
            password.as_ref().to_string(),
        ));
    }

    // -- inspection

    /// Recorded `init` invocations, oldest first
    pub fn init_calls(&self) -> Vec<InitCall> {
        self.lock().init_calls.clone()
    }

    /// Directory cursors and file handles currently open
    pub fn open_handles(&self) -> usize {
        let state = self.lock();
        state.dirs.len() + state.files.len()
    }

    /// Handles that were closed more than once
    pub fn double_closes(&self) -> usize {
        let state = self.lock();
        state
            .dir_closes
            .values()
            .chain(state.file_closes.values())
            .filter(|&&n| n > 1)
            .count()
    }

    /// Current contents of the file at `path`, if it exists
    pub fn contents<S: AsRef<str>>(&self, path: S) -> Option<Vec<u8>> {
        match self.lock().nodes.get(&normalize(path.as_ref())) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Whether any entry exists at `path`
    pub fn entry_exists<S: AsRef<str>>(&self, path: S) -> bool {
        self.lock().nodes.contains_key(&normalize(path.as_ref()))
    }

    // -- private

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Strip the `smb://host/share` prefix off a canonical address
    fn rel(&self, address: &str) -> ShareResult<String> {
        match address.strip_prefix(&self.base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Ok(normalize(rest)),
            _ => Err(ShareError::NotFound),
        }
    }
}

impl EngineState {
    fn insert_parents(&mut self, path: &str) {
        let path = normalize(path);
        let mut prefix = String::new();
        let segments: Vec<&str> = path.split('/').collect();
        for segment in segments.into_iter().rev().skip(1).rev() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            self.nodes.entry(prefix.clone()).or_insert(Node::Dir);
        }
    }

    fn mint(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    /// Direct children of `dir`, by name
    fn children(&self, dir: &str) -> Vec<(String, FileType)> {
        self.nodes
            .iter()
            .filter(|(path, _)| !path.is_empty() && parent_of(path) == dir)
            .map(|(path, node)| (last_segment(path).to_string(), node.file_type()))
            .collect()
    }
}

fn normalize<S: AsRef<str>>(path: S) -> String {
    path.as_ref()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(p, _)| p).unwrap_or("")
}

fn last_segment(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, n)| n).unwrap_or(path)
}

impl ShareEngine for MemoryEngine {
    fn init(
        &self,
        workgroup: Option<&str>,
        username: &str,
        password: &str,
    ) -> Result<(), ConnectError> {
        let mut state = self.lock();
        state.init_calls.push(InitCall {
            workgroup: workgroup.map(|w| w.to_string()),
            username: username.to_string(),
            password: password.to_string(),
        });
        if !self.host_valid {
            return Err(ConnectError::InvalidHost);
        }
        if !self.reachable {
            return Err(ConnectError::HostUnreachable);
        }
        match &state.auth {
            Some((user, pass)) if user != username || pass != password => {
                Err(ConnectError::AuthenticationFailed)
            }
            _ => Ok(()),
        }
    }

    fn opendir(&self, address: &str) -> ShareResult<DirToken> {
        let rel = self.rel(address)?;
        let mut state = self.lock();
        match state.nodes.get(&rel) {
            None => return Err(ShareError::NotFound),
            Some(Node::File(_)) => return Err(ShareError::InvalidType),
            Some(Node::Dir) => {}
        }
        let mut entries = vec![
            Dirent {
                name: String::from("."),
                file_type: FileType::Directory,
            },
            Dirent {
                name: String::from(".."),
                file_type: FileType::Directory,
            },
        ];
        entries.extend(
            state
                .children(&rel)
                .into_iter()
                .map(|(name, file_type)| Dirent { name, file_type }),
        );
        let token = state.mint();
        state.dirs.insert(token, OpenDir { entries });
        Ok(DirToken::new(token))
    }

    fn readdir(&self, dir: DirToken) -> ShareResult<Option<Dirent>> {
        let mut state = self.lock();
        let cursor = state
            .dirs
            .get_mut(&dir.raw())
            .ok_or_else(ShareError::stale_handle)?;
        if cursor.entries.is_empty() {
            Ok(None)
        } else {
            Ok(Some(cursor.entries.remove(0)))
        }
    }

    fn closedir(&self, dir: DirToken) -> ShareResult<()> {
        let mut state = self.lock();
        *state.dir_closes.entry(dir.raw()).or_insert(0) += 1;
        match state.dirs.remove(&dir.raw()) {
            Some(_) => Ok(()),
            None => Err(ShareError::stale_handle()),
        }
    }

    fn open(&self, address: &str) -> ShareResult<FileToken> {
        let rel = self.rel(address)?;
        let mut state = self.lock();
        match state.nodes.get(&rel) {
            None => Err(ShareError::NotFound),
            Some(Node::Dir) => Err(ShareError::InvalidType),
            Some(Node::File(_)) => {
                let token = state.mint();
                state.files.insert(token, OpenFile { path: rel, pos: 0 });
                Ok(FileToken::new(token))
            }
        }
    }

    fn create(&self, address: &str, _mode: u32) -> ShareResult<FileToken> {
        let rel = self.rel(address)?;
        if rel.is_empty() {
            return Err(ShareError::InvalidType);
        }
        let mut state = self.lock();
        match state.nodes.get(&rel) {
            Some(Node::Dir) => return Err(ShareError::InvalidType),
            Some(Node::File(_)) | None => {}
        }
        match state.nodes.get(parent_of(&rel)) {
            Some(Node::Dir) => {}
            _ => return Err(ShareError::NotFound),
        }
        state.nodes.insert(rel.clone(), Node::File(Vec::new()));
        let token = state.mint();
        state.files.insert(token, OpenFile { path: rel, pos: 0 });
        Ok(FileToken::new(token))
    }

    fn read(&self, file: FileToken, buf: &mut [u8]) -> ShareResult<usize> {
        let mut state = self.lock();
        if let Some(budget) = state.read_budget.as_mut() {
            if *budget == 0 {
                return Err(ShareError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "injected read failure",
                )));
            }
            *budget -= 1;
        }
        let handle = state
            .files
            .get(&file.raw())
            .ok_or_else(ShareError::stale_handle)?;
        let (path, pos) = (handle.path.clone(), handle.pos);
        let data = match state.nodes.get(&path) {
            Some(Node::File(data)) => data,
            _ => return Err(ShareError::NotFound),
        };
        let available = data.len().saturating_sub(pos);
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        if let Some(handle) = state.files.get_mut(&file.raw()) {
            handle.pos += n;
        }
        Ok(n)
    }

    fn write(&self, file: FileToken, buf: &[u8]) -> ShareResult<usize> {
        let mut state = self.lock();
        let handle = state
            .files
            .get(&file.raw())
            .ok_or_else(ShareError::stale_handle)?;
        let (path, pos) = (handle.path.clone(), handle.pos);
        let data = match state.nodes.get_mut(&path) {
            Some(Node::File(data)) => data,
            _ => return Err(ShareError::NotFound),
        };
        if data.len() < pos + buf.len() {
            data.resize(pos + buf.len(), 0);
        }
        data[pos..pos + buf.len()].copy_from_slice(buf);
        if let Some(handle) = state.files.get_mut(&file.raw()) {
            handle.pos += buf.len();
        }
        Ok(buf.len())
    }

    fn close(&self, file: FileToken) -> ShareResult<()> {
        let mut state = self.lock();
        *state.file_closes.entry(file.raw()).or_insert(0) += 1;
        match state.files.remove(&file.raw()) {
            Some(_) => Ok(()),
            None => Err(ShareError::stale_handle()),
        }
    }

    fn stat(&self, address: &str) -> ShareResult<EntryStat> {
        let rel = self.rel(address)?;
        let state = self.lock();
        let node = state.nodes.get(&rel).ok_or(ShareError::NotFound)?;
        let (size, mode) = match node {
            Node::Dir => (0, 0o755),
            Node::File(data) => (data.len() as u64, 0o644),
        };
        Ok(EntryStat {
            file_type: node.file_type(),
            size,
            mode,
            uid: 1000,
            gid: 1000,
            accessed: None,
            created: None,
            modified: None,
        })
    }

    fn mkdir(&self, address: &str, _mode: u32) -> ShareResult<()> {
        let rel = self.rel(address)?;
        let mut state = self.lock();
        if state.nodes.contains_key(&rel) {
            return Err(ShareError::AlreadyExists);
        }
        match state.nodes.get(parent_of(&rel)) {
            Some(Node::Dir) => {}
            _ => return Err(ShareError::NotFound),
        }
        state.nodes.insert(rel, Node::Dir);
        Ok(())
    }

    fn rmdir(&self, address: &str) -> ShareResult<()> {
        let rel = self.rel(address)?;
        let mut state = self.lock();
        match state.nodes.get(&rel) {
            None => return Err(ShareError::NotFound),
            Some(Node::File(_)) => return Err(ShareError::InvalidType),
            Some(Node::Dir) => {}
        }
        if !state.children(&rel).is_empty() {
            return Err(ShareError::InvalidType);
        }
        state.nodes.remove(&rel);
        state.xattrs.remove(&rel);
        Ok(())
    }

    fn unlink(&self, address: &str) -> ShareResult<()> {
        let rel = self.rel(address)?;
        let mut state = self.lock();
        match state.nodes.get(&rel) {
            None => return Err(ShareError::NotFound),
            Some(Node::Dir) => return Err(ShareError::InvalidType),
            Some(Node::File(_)) => {}
        }
        state.nodes.remove(&rel);
        state.xattrs.remove(&rel);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> ShareResult<()> {
        let from = self.rel(from)?;
        let to = self.rel(to)?;
        let mut state = self.lock();
        if !state.nodes.contains_key(&from) {
            return Err(ShareError::NotFound);
        }
        if state.nodes.contains_key(&to) {
            return Err(ShareError::AlreadyExists);
        }
        match state.nodes.get(parent_of(&to)) {
            Some(Node::Dir) => {}
            _ => return Err(ShareError::NotFound),
        }
        let prefix = format!("{}/", from);
        let moved: Vec<String> = state
            .nodes
            .keys()
            .filter(|p| **p == from || p.starts_with(&prefix))
            .cloned()
            .collect();
        for old in moved {
            let new = format!("{}{}", to, &old[from.len()..]);
            if let Some(node) = state.nodes.remove(&old) {
                state.nodes.insert(new.clone(), node);
            }
            if let Some(attrs) = state.xattrs.remove(&old) {
                state.xattrs.insert(new, attrs);
            }
        }
        Ok(())
    }

    fn getxattr(&self, address: &str, name: &str) -> ShareResult<String> {
        let rel = self.rel(address)?;
        let state = self.lock();
        let node = state.nodes.get(&rel).ok_or(ShareError::NotFound)?;
        if let Some(value) = state.xattrs.get(&rel).and_then(|attrs| attrs.get(name)) {
            return Ok(value.clone());
        }
        // synthesize the DOS mode bits the way smb servers report them
        if name == DOS_MODE_ATTRIBUTE {
            return Ok(match node {
                Node::Dir => String::from("0x10"),
                Node::File(_) => String::from("0x20"),
            });
        }
        Err(ShareError::AttributeNotSupported(name.to_string()))
    }
}
