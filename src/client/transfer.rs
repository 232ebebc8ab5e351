//! ## transfer
//!
//! Chunked whole-file transfer.
//!
//! Both directions move data in fixed-size chunks so a transfer never
//! buffers more than one chunk. The loops terminate only on the
//! reader's end-of-stream signal (`read` returning zero), never on the
//! content of a chunk, so an empty-looking chunk mid-stream cannot
//! truncate the file.

use std::io::{self, Read, Write};

use super::stream::{ReadStream, WriteStream};
use crate::error::{ShareError, ShareResult};

/// Copy `reader` into the remote stream, returning the bytes moved.
///
/// A failure partway surfaces as `ShareError::Transfer` carrying the
/// byte count moved before the abort.
pub(crate) fn upload<R: Read>(
    reader: &mut R,
    stream: &mut WriteStream,
    chunk_size: usize,
) -> ShareResult<u64> {
    let mut buffer = vec![0u8; chunk_size];
    let mut transferred = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ShareError::transfer(transferred, e.into())),
        };
        stream
            .write_all(&buffer[..n])
            .map_err(|e| ShareError::transfer(transferred, e.into()))?;
        transferred += n as u64;
    }
    Ok(transferred)
}

/// Copy the remote stream into `writer`, returning the bytes moved.
pub(crate) fn download<W: Write>(
    stream: &mut ReadStream,
    writer: &mut W,
    chunk_size: usize,
) -> ShareResult<u64> {
    let mut buffer = vec![0u8; chunk_size];
    let mut transferred = 0u64;
    loop {
        let n = match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ShareError::transfer(transferred, e.into())),
        };
        writer
            .write_all(&buffer[..n])
            .map_err(|e| ShareError::transfer(transferred, e.into()))?;
        transferred += n as u64;
    }
    Ok(transferred)
}
