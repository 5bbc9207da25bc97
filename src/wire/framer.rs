//! Message framing: the 2-byte type prefix plus global size enforcement.
//!
//! ```text
//! message := [type_code: 2, big-endian][payload: kind-specific]
//! ```
//!
//! [`read_message`] consumes exactly one message from a stream and leaves
//! whatever follows in place, so one connection can carry messages back to
//! back. The payload is pulled segment by segment from the kind's layout;
//! each length prefix is checked against the global and per-kind ceilings
//! before its body is read. [`decode_message`] takes one complete frame and
//! rejects trailing bytes.

use std::io::{self, Read, Write};

use bytes::Buf;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{Result, WireError, TYPE_FIELD};
use super::fields::{Segment, LEN_PREFIX_SIZE};
use super::{
    Message, MessageType, ProtocolVersion, MAX_MESSAGE_PAYLOAD, MAX_MESSAGE_SIZE,
    TYPE_PREFIX_SIZE,
};

/// Read and decode one message from `r`.
///
/// Reads the type prefix and then exactly the bytes the kind's layout
/// declares; nothing past the end of the message is consumed.
pub fn read_message<R: Read>(r: &mut R, pver: ProtocolVersion) -> Result<Message> {
    let mut prefix = [0u8; TYPE_PREFIX_SIZE];
    let filled = read_full(r, &mut prefix)?;
    let msg_type = resolve_prefix(&prefix, filled)?;

    let mut frame = FrameReader::new(msg_type, pver);
    while let Some(step) = frame.next_step()? {
        let filled = read_full(r, frame.buffer(step.len))?;
        frame.commit(step, filled)?;
    }

    decode_frame(msg_type, &frame.into_payload(), pver)
}

/// Encode `msg` and write it to `w`. Returns bytes written, prefix included.
///
/// The frame is built in memory first; an encode error leaves `w` untouched.
pub fn write_message<W: Write>(w: &mut W, msg: &Message, pver: ProtocolVersion) -> Result<usize> {
    let frame = encode_message(msg, pver)?;
    w.write_all(&frame)?;
    Ok(frame.len())
}

/// Decode one message from a complete frame.
///
/// Unlike [`read_message`], the whole of `data` must be the message: bytes
/// left over after the kind's fields are an [`WireError::InvalidLength`].
pub fn decode_message(data: &[u8], pver: ProtocolVersion) -> Result<Message> {
    let filled = data.len().min(TYPE_PREFIX_SIZE);
    let mut prefix = [0u8; TYPE_PREFIX_SIZE];
    prefix[..filled].copy_from_slice(&data[..filled]);
    let msg_type = resolve_prefix(&prefix, filled)?;

    decode_frame(msg_type, &data[TYPE_PREFIX_SIZE..], pver)
}

/// Encode `msg` into a new frame.
pub fn encode_message(msg: &Message, pver: ProtocolVersion) -> Result<Vec<u8>> {
    let msg_type = msg.msg_type();
    let payload = msg.encode_payload(pver)?;
    check_frame_size(payload.len())?;

    let mut frame = Vec::with_capacity(TYPE_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&msg_type.to_bytes());
    frame.extend_from_slice(&payload);

    tracing::trace!(msg_type = %msg_type, payload_len = payload.len(), "encoded wire message");
    Ok(frame)
}

/// Async counterpart of [`read_message`].
pub async fn read_message_async<R>(r: &mut R, pver: ProtocolVersion) -> Result<Message>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; TYPE_PREFIX_SIZE];
    let filled = read_full_async(r, &mut prefix).await?;
    let msg_type = resolve_prefix(&prefix, filled)?;

    let mut frame = FrameReader::new(msg_type, pver);
    while let Some(step) = frame.next_step()? {
        let filled = read_full_async(r, frame.buffer(step.len)).await?;
        frame.commit(step, filled)?;
    }

    decode_frame(msg_type, &frame.into_payload(), pver)
}

/// Async counterpart of [`write_message`].
pub async fn write_message_async<W>(
    w: &mut W,
    msg: &Message,
    pver: ProtocolVersion,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_message(msg, pver)?;
    w.write_all(&frame).await?;
    w.flush().await?;
    Ok(frame.len())
}

/// One read the framer must perform.
#[derive(Debug, Clone, Copy)]
struct Step {
    field: &'static str,
    len: usize,
    /// Set for the body of a length-prefixed field.
    body: bool,
}

/// Walks a kind's layout and collects its payload from a stream.
///
/// Each step is checked against the ceilings before any of its bytes are
/// read, so a hostile length prefix never causes a large read.
struct FrameReader {
    msg_type: MessageType,
    kind_max: usize,
    segments: std::vec::IntoIter<Segment>,
    /// Variable field whose length prefix was the last thing read.
    pending: Option<(&'static str, usize)>,
    payload: Vec<u8>,
}

impl FrameReader {
    fn new(msg_type: MessageType, pver: ProtocolVersion) -> Self {
        Self {
            msg_type,
            kind_max: msg_type.max_payload_length(pver) as usize,
            segments: msg_type.layout(pver).into_iter(),
            pending: None,
            payload: Vec::new(),
        }
    }

    /// Next read, or `None` once the layout is exhausted.
    fn next_step(&mut self) -> Result<Option<Step>> {
        if let Some((field, max)) = self.pending.take() {
            let mut len_prefix = &self.payload[self.payload.len() - LEN_PREFIX_SIZE..];
            let declared = len_prefix.get_u16() as usize;
            self.check_room(declared)?;
            if declared > max {
                return Err(WireError::invalid_length(field, declared, max));
            }
            return Ok(Some(Step {
                field,
                len: declared,
                body: true,
            }));
        }

        let (step, pending) = match self.segments.next() {
            None => return Ok(None),
            Some(Segment::Fixed { field, len }) => (
                Step {
                    field,
                    len,
                    body: false,
                },
                None,
            ),
            Some(Segment::Var { field, max }) => (
                Step {
                    field,
                    len: LEN_PREFIX_SIZE,
                    body: false,
                },
                Some((field, max)),
            ),
        };
        self.check_room(step.len)?;
        self.pending = pending;
        Ok(Some(step))
    }

    /// Space for the next `len` bytes.
    fn buffer(&mut self, len: usize) -> &mut [u8] {
        let start = self.payload.len();
        self.payload.resize(start + len, 0);
        &mut self.payload[start..]
    }

    /// Check that the stream delivered the whole step.
    fn commit(&self, step: Step, filled: usize) -> Result<()> {
        if filled == step.len {
            return Ok(());
        }
        if step.body {
            Err(WireError::invalid_length(step.field, step.len, filled))
        } else {
            Err(WireError::eof(step.field, step.len, filled))
        }
    }

    fn check_room(&self, len: usize) -> Result<()> {
        let size = self.payload.len() + len;
        check_frame_size(size)?;
        if size > self.kind_max {
            return Err(WireError::PayloadTooLarge {
                msg_type: self.msg_type,
                size,
                max: self.kind_max,
            });
        }
        Ok(())
    }

    fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

async fn read_full_async<R: AsyncRead + Unpin>(r: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn resolve_prefix(prefix: &[u8; TYPE_PREFIX_SIZE], filled: usize) -> Result<MessageType> {
    if filled < TYPE_PREFIX_SIZE {
        return Err(WireError::eof(TYPE_FIELD, TYPE_PREFIX_SIZE, filled));
    }
    MessageType::from_code(u16::from_be_bytes(*prefix))
}

fn check_frame_size(payload_len: usize) -> Result<()> {
    if payload_len > MAX_MESSAGE_PAYLOAD {
        return Err(WireError::MessageTooLarge {
            size: TYPE_PREFIX_SIZE + payload_len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(())
}

fn decode_frame(msg_type: MessageType, payload: &[u8], pver: ProtocolVersion) -> Result<Message> {
    check_frame_size(payload.len())?;
    let msg = Message::decode_payload(msg_type, payload, pver)?;
    tracing::trace!(msg_type = %msg_type, payload_len = payload.len(), "decoded wire message");
    Ok(msg)
}
