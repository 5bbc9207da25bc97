//! Bounded field primitives for message payloads.
//!
//! All integers are big-endian. Variable-length fields carry a `u16` length
//! prefix. Readers never index past the end of the payload: every read checks
//! `remaining()` first and fails with [`WireError::UnexpectedEof`] or
//! [`WireError::InvalidLength`] instead.
//!
//! [`Segment`] describes a kind's layout without decoding it, so the framer
//! can pull exactly one message off a stream.

use bytes::{Buf, BufMut};

use super::error::{Result, WireError};
use super::MessageType;

/// Size of a `u16` length prefix.
pub const LEN_PREFIX_SIZE: usize = 2;

/// One step of a kind's wire layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Fixed-width field.
    Fixed {
        /// Field name, as reported in errors.
        field: &'static str,
        /// Width in bytes.
        len: usize,
    },
    /// `u16` length prefix followed by that many bytes.
    Var {
        /// Field name, as reported in errors.
        field: &'static str,
        /// Largest length the field may declare.
        max: usize,
    },
}

impl Segment {
    /// Fixed-width field of `len` bytes.
    pub const fn fixed(field: &'static str, len: usize) -> Self {
        Segment::Fixed { field, len }
    }

    /// Length-prefixed field of at most `max` bytes.
    pub const fn var(field: &'static str, max: usize) -> Self {
        Segment::Var { field, max }
    }
}

/// Cursor over a single message payload.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    /// Reader positioned at the start of `payload`.
    pub fn new(payload: &'a [u8]) -> Self {
        Self { buf: payload }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, field: &'static str, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(WireError::eof(field, n, self.remaining()));
        }
        Ok(())
    }

    /// Read one byte.
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        self.need(field, 1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        self.need(field, 2)?;
        Ok(self.buf.get_u16())
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        self.need(field, 4)?;
        Ok(self.buf.get_u32())
    }

    /// Read a big-endian `u64`.
    pub fn read_u64(&mut self, field: &'static str) -> Result<u64> {
        self.need(field, 8)?;
        Ok(self.buf.get_u64())
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        self.need(field, N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Read a `u16`-prefixed byte string whose length may not exceed `max`
    /// nor the bytes left in the payload.
    pub fn read_var_bytes(&mut self, field: &'static str, max: usize) -> Result<Vec<u8>> {
        let declared = self.read_u16(field)? as usize;
        if declared > max {
            return Err(WireError::invalid_length(field, declared, max));
        }
        if declared > self.remaining() {
            return Err(WireError::invalid_length(field, declared, self.remaining()));
        }
        let mut out = vec![0u8; declared];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Read the trailing `u16`-prefixed byte string of a payload.
    ///
    /// The declared length must account for every byte left; anything else
    /// is an [`WireError::InvalidLength`] for this field.
    pub fn read_tail_var_bytes(&mut self, field: &'static str, max: usize) -> Result<Vec<u8>> {
        let declared = self.read_u16(field)? as usize;
        if declared > max {
            return Err(WireError::invalid_length(field, declared, max));
        }
        if declared != self.remaining() {
            return Err(WireError::invalid_length(field, declared, self.remaining()));
        }
        let out = self.buf.to_vec();
        self.buf.advance(declared);
        Ok(out)
    }

    /// Assert the whole payload was consumed.
    pub fn finish(self, msg_type: MessageType) -> Result<()> {
        if self.remaining() > 0 {
            return Err(WireError::InvalidLength {
                field: msg_type.name(),
                declared: self.remaining(),
                allowed: 0,
            });
        }
        Ok(())
    }
}

/// Payload builder for one message kind.
#[derive(Debug)]
pub struct PayloadWriter {
    msg_type: MessageType,
    buf: Vec<u8>,
}

impl PayloadWriter {
    /// Empty payload for `msg_type`; bound violations are reported against it.
    pub fn new(msg_type: MessageType) -> Self {
        Self {
            msg_type,
            buf: Vec::with_capacity(64),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append one byte.
    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Append a big-endian `u16`.
    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Append a big-endian `u32`.
    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    /// Append a big-endian `u64`.
    pub fn write_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    /// Append raw bytes with no length prefix.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Write a `u16`-prefixed byte string, refusing to emit one longer than
    /// `max`.
    pub fn write_var_bytes(&mut self, data: &[u8], max: usize) -> Result<()> {
        let bound = max.min(u16::MAX as usize);
        if data.len() > bound {
            return Err(WireError::PayloadTooLarge {
                msg_type: self.msg_type,
                size: data.len(),
                max: bound,
            });
        }
        self.buf.put_u16(data.len() as u16);
        self.buf.put_slice(data);
        Ok(())
    }

    /// The finished payload.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
