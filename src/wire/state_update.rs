//! `StateUpdate` / `StateUpdateReply` - encrypted blob upload.
//!
//! ```text
//! StateUpdate:
//!   [seq_num: 2][last_applied: 2][is_complete: 1][hint: 16][blob_len: 2][blob: blob_len]
//!
//! StateUpdateReply (4 bytes):
//!   [code: 2][last_applied: 2]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{Result, WireError};
use super::fields::{PayloadReader, PayloadWriter, Segment, LEN_PREFIX_SIZE};
use super::message::WireMessage;
use super::{ErrorCode, MessageType, ProtocolVersion, MAX_MESSAGE_PAYLOAD};

/// Size of a breach hint.
pub const BREACH_HINT_SIZE: usize = 16;

/// Fixed part of `StateUpdate` before the blob.
const STATE_UPDATE_FIXED: usize = 2 + 2 + 1 + BREACH_HINT_SIZE;

/// Fixed payload size of `StateUpdateReply`.
pub const STATE_UPDATE_REPLY_SIZE: usize = 2 + 2;

/// Short tag derived from a revoked commitment txid, used by the tower to
/// match breaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreachHint(pub [u8; BREACH_HINT_SIZE]);

impl fmt::Display for BreachHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// One encrypted state update within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Sequence number of this update, starting at 1.
    pub seq_num: u16,
    /// Last update the client saw the tower acknowledge.
    pub last_applied: u16,
    /// Client will send no further updates in this session.
    pub is_complete: bool,
    /// Hint identifying the breach this blob remedies.
    pub hint: BreachHint,
    /// Encrypted breach-remedy blob, opaque to the codec.
    pub encrypted_blob: Vec<u8>,
}

impl StateUpdate {
    /// Largest encrypted blob for protocol version `pver`.
    pub fn max_blob_len(pver: ProtocolVersion) -> usize {
        Self::max_payload_length(pver) as usize - STATE_UPDATE_FIXED - LEN_PREFIX_SIZE
    }
}

impl WireMessage for StateUpdate {
    const MSG_TYPE: MessageType = MessageType::StateUpdate;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        MAX_MESSAGE_PAYLOAD as u32
    }

    fn layout(pver: ProtocolVersion) -> Vec<Segment> {
        vec![
            Segment::fixed("seq num", 2),
            Segment::fixed("last applied", 2),
            Segment::fixed("is complete", 1),
            Segment::fixed("hint", BREACH_HINT_SIZE),
            Segment::var("encrypted blob", Self::max_blob_len(pver)),
        ]
    }

    fn encode(&self, w: &mut PayloadWriter, pver: ProtocolVersion) -> Result<()> {
        w.write_u16(self.seq_num);
        w.write_u16(self.last_applied);
        w.write_u8(u8::from(self.is_complete));
        w.write_bytes(&self.hint.0);
        w.write_var_bytes(&self.encrypted_blob, Self::max_blob_len(pver))
    }

    fn decode(r: &mut PayloadReader<'_>, pver: ProtocolVersion) -> Result<Self> {
        let seq_num = r.read_u16("seq num")?;
        let last_applied = r.read_u16("last applied")?;
        let is_complete = match r.read_u8("is complete")? {
            0 => false,
            1 => true,
            other => {
                return Err(WireError::MalformedField {
                    field: "is complete",
                    reason: format!("expected 0 or 1, got {other}"),
                })
            },
        };
        let hint = BreachHint(r.read_array("hint")?);
        let encrypted_blob = r.read_tail_var_bytes("encrypted blob", Self::max_blob_len(pver))?;
        Ok(Self {
            seq_num,
            last_applied,
            is_complete,
            hint,
            encrypted_blob,
        })
    }
}

/// Tower's acknowledgement of a [`StateUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdateReply {
    /// Outcome.
    pub code: ErrorCode,
    /// Highest sequence number the tower has durably applied.
    pub last_applied: u16,
}

impl WireMessage for StateUpdateReply {
    const MSG_TYPE: MessageType = MessageType::StateUpdateReply;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        STATE_UPDATE_REPLY_SIZE as u32
    }

    fn layout(_pver: ProtocolVersion) -> Vec<Segment> {
        vec![
            Segment::fixed("reply code", 2),
            Segment::fixed("last applied", 2),
        ]
    }

    fn encode(&self, w: &mut PayloadWriter, _pver: ProtocolVersion) -> Result<()> {
        w.write_u16(self.code.0);
        w.write_u16(self.last_applied);
        Ok(())
    }

    fn decode(r: &mut PayloadReader<'_>, _pver: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            code: ErrorCode(r.read_u16("reply code")?),
            last_applied: r.read_u16("last applied")?,
        })
    }
}
