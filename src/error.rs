//! ## error
//!
//! Error types returned by share operations

use std::io;

use thiserror::Error;

/// Result alias returned by every fallible share operation
pub type ShareResult<T> = Result<T, ShareError>;

/// Errors raised while establishing the session with the remote share
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// Credentials were rejected by the remote host
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The host could not be reached or resolved
    #[error("host unreachable")]
    HostUnreachable,
    /// The host identity is malformed
    #[error("invalid host")]
    InvalidHost,
}

/// Errors raised by share operations
#[derive(Debug, Error)]
pub enum ShareError {
    /// The session could not be established
    #[error("connection error: {0}")]
    Connect(#[from] ConnectError),
    /// The path does not exist on the share
    #[error("no such file or directory")]
    NotFound,
    /// The target entry already exists
    #[error("entry already exists")]
    AlreadyExists,
    /// The operation is not valid for this entry kind
    #[error("invalid entry type for operation")]
    InvalidType,
    /// The remote side rejected the attribute name
    #[error("attribute not supported: {0}")]
    AttributeNotSupported(String),
    /// A transfer aborted partway; `bytes` were moved before the failure
    #[error("transfer aborted after {bytes} bytes")]
    Transfer {
        bytes: u64,
        #[source]
        source: Box<ShareError>,
    },
    /// Underlying I/O failure
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ShareError {
    /// Wrap `source` into a transfer failure carrying the byte count
    /// moved before the abort.
    pub(crate) fn transfer(bytes: u64, source: ShareError) -> Self {
        Self::Transfer {
            bytes,
            source: Box::new(source),
        }
    }

    /// Stale or unknown handle token passed to the engine.
    pub(crate) fn stale_handle() -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "stale or unknown handle",
        ))
    }
}

/// Convert a share error into an `io::Error` for the `Read`/`Write`
/// trait boundaries of the stream types.
pub(crate) fn to_io_error(err: ShareError) -> io::Error {
    match err {
        ShareError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}
