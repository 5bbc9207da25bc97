//! `CreateSession` / `CreateSessionReply` - session negotiation.
//!
//! ```text
//! CreateSession (20 bytes):
//!   [blob_type: 2][max_updates: 2][reward_base: 4][reward_rate: 4][sweep_fee_rate: 8]
//!
//! CreateSessionReply:
//!   [code: 2][last_applied: 2][data_len: 2][data: data_len]
//! ```
//!
//! `data` in the reply is the reward output script the tower wants paid when
//! the session carries a reward; `last_applied` is only meaningful when the
//! code is [`ErrorCode::CREATE_SESSION_ALREADY_EXISTS`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::fields::{PayloadReader, PayloadWriter, Segment, LEN_PREFIX_SIZE};
use super::message::WireMessage;
use super::{ErrorCode, MessageType, ProtocolVersion, MAX_MESSAGE_PAYLOAD};

/// Fixed payload size of `CreateSession`.
pub const CREATE_SESSION_SIZE: usize = 2 + 2 + 4 + 4 + 8;

/// Fixed part of `CreateSessionReply` before the reward script.
const CREATE_SESSION_REPLY_FIXED: usize = 2 + 2;

/// Blob format selector (16-bit flag set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobType(pub u16);

impl BlobType {
    /// Justice transaction pays the tower a reward output
    pub const FLAG_REWARD: u16 = 1 << 0;
    /// Blob sweeps the commitment outputs
    pub const FLAG_COMMIT_OUTPUTS: u16 = 1 << 1;
    /// Channel uses anchor outputs
    pub const FLAG_ANCHOR_CHANNEL: u16 = 1 << 2;
    /// Channel uses taproot outputs
    pub const FLAG_TAPROOT_CHANNEL: u16 = 1 << 3;

    /// Altruist blob for legacy channels
    pub const ALTRUIST_COMMIT: BlobType = BlobType(Self::FLAG_COMMIT_OUTPUTS);
    /// Altruist blob for anchor channels
    pub const ALTRUIST_ANCHOR_COMMIT: BlobType =
        BlobType(Self::FLAG_COMMIT_OUTPUTS | Self::FLAG_ANCHOR_CHANNEL);
    /// Altruist blob for taproot channels
    pub const ALTRUIST_TAPROOT_COMMIT: BlobType =
        BlobType(Self::FLAG_COMMIT_OUTPUTS | Self::FLAG_TAPROOT_CHANNEL);
    /// Reward blob for legacy channels
    pub const REWARD_COMMIT: BlobType = BlobType(Self::FLAG_REWARD | Self::FLAG_COMMIT_OUTPUTS);

    /// Raw flag bits.
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// True if any bit of `flag` is set.
    pub fn has(&self, flag: u16) -> bool {
        self.0 & flag != 0
    }
}

impl fmt::Display for BlobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.has(Self::FLAG_REWARD) {
            names.push("reward");
        }
        if self.has(Self::FLAG_COMMIT_OUTPUTS) {
            names.push("commit-outputs");
        }
        if self.has(Self::FLAG_ANCHOR_CHANNEL) {
            names.push("anchor");
        }
        if self.has(Self::FLAG_TAPROOT_CHANNEL) {
            names.push("taproot");
        }
        write!(f, "[{}]({:#06x})", names.join("|"), self.0)
    }
}

/// Session request: the policy the client wants the tower to accept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSession {
    /// Blob format the client will upload.
    pub blob_type: BlobType,
    /// Maximum number of state updates in this session.
    pub max_updates: u16,
    /// Fixed reward, in satoshis, offered to the tower.
    pub reward_base: u32,
    /// Proportional reward, in millionths of the swept value.
    pub reward_rate: u32,
    /// Fee rate, in sat/kw, for justice transactions.
    pub sweep_fee_rate: u64,
}

impl WireMessage for CreateSession {
    const MSG_TYPE: MessageType = MessageType::CreateSession;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        CREATE_SESSION_SIZE as u32
    }

    fn layout(_pver: ProtocolVersion) -> Vec<Segment> {
        vec![
            Segment::fixed("blob type", 2),
            Segment::fixed("max updates", 2),
            Segment::fixed("reward base", 4),
            Segment::fixed("reward rate", 4),
            Segment::fixed("sweep fee rate", 8),
        ]
    }

    fn encode(&self, w: &mut PayloadWriter, _pver: ProtocolVersion) -> Result<()> {
        w.write_u16(self.blob_type.0);
        w.write_u16(self.max_updates);
        w.write_u32(self.reward_base);
        w.write_u32(self.reward_rate);
        w.write_u64(self.sweep_fee_rate);
        Ok(())
    }

    fn decode(r: &mut PayloadReader<'_>, _pver: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            blob_type: BlobType(r.read_u16("blob type")?),
            max_updates: r.read_u16("max updates")?,
            reward_base: r.read_u32("reward base")?,
            reward_rate: r.read_u32("reward rate")?,
            sweep_fee_rate: r.read_u64("sweep fee rate")?,
        })
    }
}

/// Tower's answer to [`CreateSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionReply {
    /// Outcome.
    pub code: ErrorCode,
    /// Last update the tower applied, for an already existing session.
    pub last_applied: u16,
    /// Reward output script.
    pub data: Vec<u8>,
}

impl CreateSessionReply {
    /// Largest reward script for protocol version `pver`.
    pub fn max_data_len(pver: ProtocolVersion) -> usize {
        Self::max_payload_length(pver) as usize - CREATE_SESSION_REPLY_FIXED - LEN_PREFIX_SIZE
    }
}

impl WireMessage for CreateSessionReply {
    const MSG_TYPE: MessageType = MessageType::CreateSessionReply;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        MAX_MESSAGE_PAYLOAD as u32
    }

    fn layout(pver: ProtocolVersion) -> Vec<Segment> {
        vec![
            Segment::fixed("reply code", 2),
            Segment::fixed("last applied", 2),
            Segment::var("reward script", Self::max_data_len(pver)),
        ]
    }

    fn encode(&self, w: &mut PayloadWriter, pver: ProtocolVersion) -> Result<()> {
        w.write_u16(self.code.0);
        w.write_u16(self.last_applied);
        w.write_var_bytes(&self.data, Self::max_data_len(pver))
    }

    fn decode(r: &mut PayloadReader<'_>, pver: ProtocolVersion) -> Result<Self> {
        let code = ErrorCode(r.read_u16("reply code")?);
        let last_applied = r.read_u16("last applied")?;
        let data = r.read_tail_var_bytes("reward script", Self::max_data_len(pver))?;
        Ok(Self {
            code,
            last_applied,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Message, WireError};
    use hex_literal::hex;

    fn sample() -> CreateSession {
        CreateSession {
            blob_type: BlobType::ALTRUIST_ANCHOR_COMMIT,
            max_updates: 1024,
            reward_base: 0,
            reward_rate: 0,
            sweep_fee_rate: 2500,
        }
    }

    #[test]
    fn test_create_session_layout() {
        let payload = Message::CreateSession(sample()).encode_payload(0).unwrap();
        assert_eq!(
            payload,
            hex!("0006 0400 00000000 00000000 00000000000009C4")
        );
        assert_eq!(payload.len(), CREATE_SESSION_SIZE);
    }

    #[test]
    fn test_create_session_roundtrip() {
        let msg = Message::CreateSession(sample());
        let payload = msg.encode_payload(0).unwrap();
        let decoded = Message::decode_payload(MessageType::CreateSession, &payload, 0).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_create_session_truncated() {
        let payload = Message::CreateSession(sample()).encode_payload(0).unwrap();
        let err = Message::decode_payload(MessageType::CreateSession, &payload[..19], 0)
            .unwrap_err();
        assert!(matches!(
            err,
            WireError::UnexpectedEof {
                field: "sweep fee rate",
                needed: 8,
                available: 7
            }
        ));
    }

    #[test]
    fn test_create_session_oversized() {
        let payload = [0u8; CREATE_SESSION_SIZE + 1];
        assert!(matches!(
            Message::decode_payload(MessageType::CreateSession, &payload, 0),
            Err(WireError::PayloadTooLarge { max: 20, .. })
        ));
    }

    #[test]
    fn test_reply_roundtrip_with_script() {
        let reply = CreateSessionReply {
            code: ErrorCode::OK,
            last_applied: 0,
            data: hex!("0014 89abcdef0123456789abcdef0123456789abcdef").to_vec(),
        };
        let msg = Message::CreateSessionReply(reply);
        let payload = msg.encode_payload(0).unwrap();
        assert_eq!(payload.len(), 2 + 2 + 2 + 22);
        let decoded =
            Message::decode_payload(MessageType::CreateSessionReply, &payload, 0).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_reply_script_length_mismatch() {
        let payload = hex!("003C 0007 0005 AABBCC");
        let err =
            Message::decode_payload(MessageType::CreateSessionReply, &payload, 0).unwrap_err();
        assert!(matches!(
            err,
            WireError::InvalidLength {
                field: "reward script",
                declared: 5,
                allowed: 3
            }
        ));
    }

    #[test]
    fn test_blob_type_display() {
        assert_eq!(
            BlobType::ALTRUIST_ANCHOR_COMMIT.to_string(),
            "[commit-outputs|anchor](0x0006)"
        );
        assert!(BlobType::REWARD_COMMIT.has(BlobType::FLAG_REWARD));
    }
}
