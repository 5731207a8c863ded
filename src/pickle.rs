// SPDX-License-Identifier: MIT OR Apache-2.0

//! Length-checked primitives for the binary account encoding ("pickling").
//!
//! Pickles are dense positional encodings: fixed field order, big-endian 32-bit integers,
//! length-prefixed lists, no compression and no self-description. [`Writer`] and [`Reader`]
//! keep the two directions symmetric; every read is bounds-checked against the end of the
//! input, so a decoder can never read past it.
use thiserror::Error;

/// Appends big-endian integers and raw bytes to a pickle buffer.
#[derive(Debug)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a pickle buffer which refuses to read past the end.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, PickleError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PickleError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], PickleError> {
        if self.buf.len() - self.pos < len {
            return Err(PickleError::BufferTooShort);
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }
}

#[derive(Debug, Error)]
pub enum PickleError {
    /// The input ended before all encoded fields were read.
    #[error("pickle ends before all encoded fields were read")]
    BufferTooShort,

    /// A field holds a value the encoder could never have produced.
    #[error("corrupted pickle: {0}")]
    CorruptedData(&'static str),

    /// The leading version tag is unknown to this version of the library.
    #[error("unsupported pickle version {0}")]
    UnsupportedVersion(u32),
}
