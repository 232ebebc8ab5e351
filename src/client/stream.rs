//! ## stream
//!
//! Typed streams over remote file handles.
//!
//! A stream owns its handle from the moment the engine opens it.
//! Closing is exactly-once: `close()` consumes the stream and surfaces
//! the engine's close result, while dropping an unclosed stream
//! releases the handle best-effort.

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::engine::{FileToken, ShareEngine};
use crate::error::{to_io_error, ShareResult};

/// Incremental reader over a remote file opened in read mode
pub struct ReadStream {
    engine: Arc<dyn ShareEngine>,
    token: FileToken,
    closed: bool,
}

impl std::fmt::Debug for ReadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadStream")
            .field("token", &self.token)
            .field("closed", &self.closed)
            .finish()
    }
}

impl ReadStream {
    pub(crate) fn new(engine: Arc<dyn ShareEngine>, token: FileToken) -> Self {
        Self {
            engine,
            token,
            closed: false,
        }
    }

    /// Release the remote handle
    pub fn close(mut self) -> ShareResult<()> {
        self.closed = true;
        self.engine.close(self.token)
    }
}

impl Read for ReadStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.engine.read(self.token, buf).map_err(to_io_error)
    }
}

impl Drop for ReadStream {
    fn drop(&mut self) {
        if !self.closed {
            trace!("releasing unclosed read handle");
            let _ = self.engine.close(self.token);
        }
    }
}

/// Incremental writer over a remote file opened in create mode
pub struct WriteStream {
    engine: Arc<dyn ShareEngine>,
    token: FileToken,
    closed: bool,
}

impl WriteStream {
    pub(crate) fn new(engine: Arc<dyn ShareEngine>, token: FileToken) -> Self {
        Self {
            engine,
            token,
            closed: false,
        }
    }

    /// Release the remote handle
    pub fn close(mut self) -> ShareResult<()> {
        self.closed = true;
        self.engine.close(self.token)
    }
}

impl Write for WriteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.engine.write(self.token, buf).map_err(to_io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for WriteStream {
    fn drop(&mut self) {
        if !self.closed {
            trace!("releasing unclosed write handle");
            let _ = self.engine.close(self.token);
        }
    }
}
