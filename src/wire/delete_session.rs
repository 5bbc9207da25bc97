//! `DeleteSession` / `DeleteSessionReply`.
//!
//! The request has an empty payload: the session is identified by the
//! transport-level client key. The reply carries only a status code.

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::fields::{PayloadReader, PayloadWriter, Segment};
use super::message::WireMessage;
use super::{ErrorCode, MessageType, ProtocolVersion};

/// Fixed payload size of `DeleteSessionReply`.
pub const DELETE_SESSION_REPLY_SIZE: usize = 2;

/// Request to delete the session bound to the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSession {}

impl WireMessage for DeleteSession {
    const MSG_TYPE: MessageType = MessageType::DeleteSession;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        0
    }

    fn layout(_pver: ProtocolVersion) -> Vec<Segment> {
        Vec::new()
    }

    fn encode(&self, _w: &mut PayloadWriter, _pver: ProtocolVersion) -> Result<()> {
        Ok(())
    }

    fn decode(_r: &mut PayloadReader<'_>, _pver: ProtocolVersion) -> Result<Self> {
        Ok(Self {})
    }
}

/// Tower's answer to [`DeleteSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSessionReply {
    /// Outcome.
    pub code: ErrorCode,
}

impl WireMessage for DeleteSessionReply {
    const MSG_TYPE: MessageType = MessageType::DeleteSessionReply;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        DELETE_SESSION_REPLY_SIZE as u32
    }

    fn layout(_pver: ProtocolVersion) -> Vec<Segment> {
        vec![Segment::fixed("reply code", 2)]
    }

    fn encode(&self, w: &mut PayloadWriter, _pver: ProtocolVersion) -> Result<()> {
        w.write_u16(self.code.0);
        Ok(())
    }

    fn decode(r: &mut PayloadReader<'_>, _pver: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            code: ErrorCode(r.read_u16("reply code")?),
        })
    }
}
