#![crate_name = "sharefs_smb"]
#![crate_type = "lib"]

//! # sharefs-smb
//!
//! sharefs-smb is a client-side filesystem layer over SMB-style remote shares: one
//! authenticated session per share, path-based operations translated into protocol
//! requests, and chunked streaming for file contents.
//!
//! ## Get started
//!
//! First of all you need to add **sharefs-smb** to your project dependencies:
//!
//! ```toml
//! sharefs-smb = "^0.1"
//! ```
//!
//! these features are supported:
//!
//! - `no-log`: disable logging. By default, this library will log via the `log` crate.
//!
//! The wire protocol itself lives behind the [`engine::ShareEngine`] trait; the
//! bundled [`engine::MemoryEngine`] serves a share out of process memory, which is
//! what the example below runs against.
//!
//! ### Share client
//!
//! ```rust
//! use std::path::Path;
//!
//! use sharefs_smb::engine::MemoryEngine;
//! use sharefs_smb::{ShareClient, ShareCredentials, ShareOptions};
//!
//! let engine = MemoryEngine::new("localhost", "temp")
//!     .credentials("test", "test")
//!     .file("docs/readme.txt", b"hello\n");
//!
//! let mut client = ShareClient::new(
//!     ShareCredentials::new("localhost", "temp")
//!         .username("test")
//!         .password("test")
//!         .workgroup("WORKGROUP"),
//!     ShareOptions::default().chunk_size(4096),
//!     engine,
//! );
//!
//! // connect explicitly (every operation would also connect on demand)
//! assert!(client.connect().is_ok());
//! // list the share root
//! let entries = client.dir(Path::new("/")).unwrap();
//! assert_eq!(entries[0].name(), "docs");
//! // download a file
//! let mut out = Vec::new();
//! client.get(Path::new("/docs/readme.txt"), &mut out).unwrap();
//! assert_eq!(out, b"hello\n");
//! ```
//!

// -- crates
#[macro_use]
extern crate log;

pub mod engine;

mod client;
mod error;
mod fs;

pub use client::{
    ConnectionSession, ReadStream, SessionState, ShareClient, ShareCredentials, ShareOptions,
    WriteStream,
};
pub use error::{ConnectError, ShareError, ShareResult};
pub use fs::{FileEntry, FileInfo, FileType, Metadata};
pub use utils::xattr::{AttributeValue, DOS_MODE_ATTRIBUTE};

// -- utils
pub(crate) mod utils;
// -- mock
#[cfg(test)]
pub(crate) mod mock;
