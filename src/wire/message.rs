//! The closed set of watchtower messages.
//!
//! Each kind is its own struct implementing [`WireMessage`]; [`Message`] is
//! the sum over all of them and dispatches with an exhaustive `match`.

use serde::{Deserialize, Serialize};

use super::error::{Result, WireError};
use super::fields::{PayloadReader, PayloadWriter, Segment};
use super::{
    CreateSession, CreateSessionReply, DeleteSession, DeleteSessionReply, ErrorMsg, Init,
    MessageType, ProtocolVersion, StateUpdate, StateUpdateReply,
};

/// Per-kind payload codec.
///
/// `encode` must write exactly the fields `decode` reads, in the same order,
/// and `layout` must list those same fields. `decode` must consume the whole
/// payload or fail.
pub trait WireMessage: Sized {
    /// Wire type code of this kind.
    const MSG_TYPE: MessageType;

    /// Maximum payload length for protocol version `pver`.
    fn max_payload_length(pver: ProtocolVersion) -> u32;

    /// Field layout under `pver`, in wire order.
    fn layout(pver: ProtocolVersion) -> Vec<Segment>;

    /// Append the payload fields.
    fn encode(&self, w: &mut PayloadWriter, pver: ProtocolVersion) -> Result<()>;

    /// Parse the payload fields.
    fn decode(r: &mut PayloadReader<'_>, pver: ProtocolVersion) -> Result<Self>;
}

/// Any watchtower wire message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body")]
pub enum Message {
    /// Capability announcement.
    Init(Init),
    /// Error notification.
    Error(ErrorMsg),
    /// Session request.
    CreateSession(CreateSession),
    /// Session request reply.
    CreateSessionReply(CreateSessionReply),
    /// Encrypted state update.
    StateUpdate(StateUpdate),
    /// State update acknowledgement.
    StateUpdateReply(StateUpdateReply),
    /// Session deletion request.
    DeleteSession(DeleteSession),
    /// Session deletion reply.
    DeleteSessionReply(DeleteSessionReply),
}

impl Message {
    /// Kind of this message.
    pub fn msg_type(&self) -> MessageType {
        match self {
            Message::Init(_) => Init::MSG_TYPE,
            Message::Error(_) => ErrorMsg::MSG_TYPE,
            Message::CreateSession(_) => CreateSession::MSG_TYPE,
            Message::CreateSessionReply(_) => CreateSessionReply::MSG_TYPE,
            Message::StateUpdate(_) => StateUpdate::MSG_TYPE,
            Message::StateUpdateReply(_) => StateUpdateReply::MSG_TYPE,
            Message::DeleteSession(_) => DeleteSession::MSG_TYPE,
            Message::DeleteSessionReply(_) => DeleteSessionReply::MSG_TYPE,
        }
    }

    /// Maximum payload length of this message's kind under `pver`.
    pub fn max_payload_length(&self, pver: ProtocolVersion) -> u32 {
        self.msg_type().max_payload_length(pver)
    }

    /// Encode the payload (no type prefix).
    ///
    /// Fails with [`WireError::PayloadTooLarge`] rather than produce a
    /// payload above the kind's ceiling.
    pub fn encode_payload(&self, pver: ProtocolVersion) -> Result<Vec<u8>> {
        match self {
            Message::Init(m) => encode_kind(m, pver),
            Message::Error(m) => encode_kind(m, pver),
            Message::CreateSession(m) => encode_kind(m, pver),
            Message::CreateSessionReply(m) => encode_kind(m, pver),
            Message::StateUpdate(m) => encode_kind(m, pver),
            Message::StateUpdateReply(m) => encode_kind(m, pver),
            Message::DeleteSession(m) => encode_kind(m, pver),
            Message::DeleteSessionReply(m) => encode_kind(m, pver),
        }
    }

    /// Decode a payload of kind `msg_type`.
    ///
    /// The payload length is validated against the kind's ceiling before any
    /// field is interpreted.
    pub fn decode_payload(
        msg_type: MessageType,
        payload: &[u8],
        pver: ProtocolVersion,
    ) -> Result<Self> {
        let msg = match msg_type {
            MessageType::Init => Message::Init(decode_kind(payload, pver)?),
            MessageType::Error => Message::Error(decode_kind(payload, pver)?),
            MessageType::CreateSession => Message::CreateSession(decode_kind(payload, pver)?),
            MessageType::CreateSessionReply => {
                Message::CreateSessionReply(decode_kind(payload, pver)?)
            },
            MessageType::StateUpdate => Message::StateUpdate(decode_kind(payload, pver)?),
            MessageType::StateUpdateReply => Message::StateUpdateReply(decode_kind(payload, pver)?),
            MessageType::DeleteSession => Message::DeleteSession(decode_kind(payload, pver)?),
            MessageType::DeleteSessionReply => {
                Message::DeleteSessionReply(decode_kind(payload, pver)?)
            },
        };
        Ok(msg)
    }
}

fn encode_kind<M: WireMessage>(msg: &M, pver: ProtocolVersion) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new(M::MSG_TYPE);
    msg.encode(&mut w, pver)?;
    check_payload_len(M::MSG_TYPE, w.len(), pver)?;
    Ok(w.into_inner())
}

fn decode_kind<M: WireMessage>(payload: &[u8], pver: ProtocolVersion) -> Result<M> {
    check_payload_len(M::MSG_TYPE, payload.len(), pver)?;
    let mut r = PayloadReader::new(payload);
    let msg = M::decode(&mut r, pver)?;
    r.finish(M::MSG_TYPE)?;
    Ok(msg)
}

/// Validate a payload length against the kind's ceiling.
fn check_payload_len(
    msg_type: MessageType,
    len: usize,
    pver: ProtocolVersion,
) -> Result<()> {
    let max = msg_type.max_payload_length(pver) as usize;
    if len > max {
        return Err(WireError::PayloadTooLarge {
            msg_type,
            size: len,
            max,
        });
    }
    Ok(())
}

macro_rules! impl_from_kind {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Message {
                fn from(m: $kind) -> Self {
                    Message::$kind(m)
                }
            }
        )*
    };
}

impl_from_kind!(
    Init,
    CreateSession,
    CreateSessionReply,
    StateUpdate,
    StateUpdateReply,
    DeleteSession,
    DeleteSessionReply,
);

impl From<ErrorMsg> for Message {
    fn from(m: ErrorMsg) -> Self {
        Message::Error(m)
    }
}
