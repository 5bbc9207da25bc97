//! Message-kind registry.
//!
//! Every wire message starts with a big-endian `u16` type code. The set of
//! codes is closed; a code→kind mapping, once assigned, never changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{Result, WireError};
use super::fields::Segment;
use super::message::{Message, WireMessage};
use super::{
    CreateSession, CreateSessionReply, DeleteSession, DeleteSessionReply, ErrorMsg, Init,
    ProtocolVersion, StateUpdate, StateUpdateReply,
};

/// Registered message kinds and their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum MessageType {
    /// Capability announcement, sent by both sides on connect.
    Init = 600,
    /// Error notification, either direction.
    Error = 601,
    /// Client asks the tower to open a session.
    CreateSession = 602,
    /// Tower answers a session request.
    CreateSessionReply = 603,
    /// Client pushes an encrypted breach-remedy blob.
    StateUpdate = 604,
    /// Tower acknowledges a state update.
    StateUpdateReply = 605,
    /// Client asks the tower to drop the current session.
    DeleteSession = 606,
    /// Tower answers a delete request.
    DeleteSessionReply = 607,
}

impl MessageType {
    /// All registered kinds, in code order.
    pub const ALL: [MessageType; 8] = [
        MessageType::Init,
        MessageType::Error,
        MessageType::CreateSession,
        MessageType::CreateSessionReply,
        MessageType::StateUpdate,
        MessageType::StateUpdateReply,
        MessageType::DeleteSession,
        MessageType::DeleteSessionReply,
    ];

    /// Resolve a wire code.
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            600 => Ok(MessageType::Init),
            601 => Ok(MessageType::Error),
            602 => Ok(MessageType::CreateSession),
            603 => Ok(MessageType::CreateSessionReply),
            604 => Ok(MessageType::StateUpdate),
            605 => Ok(MessageType::StateUpdateReply),
            606 => Ok(MessageType::DeleteSession),
            607 => Ok(MessageType::DeleteSessionReply),
            other => Err(WireError::UnknownMessageType(other)),
        }
    }

    /// Wire code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Wire code as the 2-byte big-endian prefix.
    pub fn to_bytes(self) -> [u8; 2] {
        self.code().to_be_bytes()
    }

    /// Kind name as used in logs and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Init => "Init",
            MessageType::Error => "Error",
            MessageType::CreateSession => "CreateSession",
            MessageType::CreateSessionReply => "CreateSessionReply",
            MessageType::StateUpdate => "StateUpdate",
            MessageType::StateUpdateReply => "StateUpdateReply",
            MessageType::DeleteSession => "DeleteSession",
            MessageType::DeleteSessionReply => "DeleteSessionReply",
        }
    }

    /// Maximum payload length (excluding the type prefix) for this kind
    /// under protocol version `pver`.
    pub fn max_payload_length(self, pver: ProtocolVersion) -> u32 {
        match self {
            MessageType::Init => Init::max_payload_length(pver),
            MessageType::Error => ErrorMsg::max_payload_length(pver),
            MessageType::CreateSession => CreateSession::max_payload_length(pver),
            MessageType::CreateSessionReply => CreateSessionReply::max_payload_length(pver),
            MessageType::StateUpdate => StateUpdate::max_payload_length(pver),
            MessageType::StateUpdateReply => StateUpdateReply::max_payload_length(pver),
            MessageType::DeleteSession => DeleteSession::max_payload_length(pver),
            MessageType::DeleteSessionReply => DeleteSessionReply::max_payload_length(pver),
        }
    }

    /// Field layout of this kind under `pver`, in wire order.
    pub fn layout(self, pver: ProtocolVersion) -> Vec<Segment> {
        match self {
            MessageType::Init => Init::layout(pver),
            MessageType::Error => ErrorMsg::layout(pver),
            MessageType::CreateSession => CreateSession::layout(pver),
            MessageType::CreateSessionReply => CreateSessionReply::layout(pver),
            MessageType::StateUpdate => StateUpdate::layout(pver),
            MessageType::StateUpdateReply => StateUpdateReply::layout(pver),
            MessageType::DeleteSession => DeleteSession::layout(pver),
            MessageType::DeleteSessionReply => DeleteSessionReply::layout(pver),
        }
    }

    /// Empty, zero-valued message of this kind.
    pub fn empty_message(self) -> Message {
        match self {
            MessageType::Init => Message::Init(Init::default()),
            MessageType::Error => Message::Error(ErrorMsg::default()),
            MessageType::CreateSession => Message::CreateSession(CreateSession::default()),
            MessageType::CreateSessionReply => {
                Message::CreateSessionReply(CreateSessionReply::default())
            },
            MessageType::StateUpdate => Message::StateUpdate(StateUpdate::default()),
            MessageType::StateUpdateReply => Message::StateUpdateReply(StateUpdateReply::default()),
            MessageType::DeleteSession => Message::DeleteSession(DeleteSession::default()),
            MessageType::DeleteSessionReply => {
                Message::DeleteSessionReply(DeleteSessionReply::default())
            },
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u16> for MessageType {
    type Error = WireError;

    fn try_from(code: u16) -> Result<Self> {
        Self::from_code(code)
    }
}

/// Resolve `code` and return an empty message of that kind.
pub fn make_empty_message(code: u16) -> Result<Message> {
    MessageType::from_code(code).map(MessageType::empty_message)
}
