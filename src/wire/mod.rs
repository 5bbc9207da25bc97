//! Watchtower wire protocol - binary message codec.
//!
//! Every message is a 2-byte big-endian type code followed by a
//! kind-specific payload. The codec parses bytes from untrusted peers before
//! any content is authenticated, so every length is bounded before it is
//! used and every decode either yields a complete message or an error.
//!
//! # Wire Format
//!
//! ```text
//! message := [type_code: u16 BE][payload]
//!
//! | Type | Code | Payload                                                   | Max   |
//! |------|------|-----------------------------------------------------------|-------|
//! | Init               | 600 | features_len:2 features chain_hash:32       | 65533 |
//! | Error              | 601 | code:2 data_len:2 data                      | 65533 |
//! | CreateSession      | 602 | blob_type:2 max_updates:2 reward_base:4     |    20 |
//! |                    |     | reward_rate:4 sweep_fee_rate:8              |       |
//! | CreateSessionReply | 603 | code:2 last_applied:2 data_len:2 data       | 65533 |
//! | StateUpdate        | 604 | seq_num:2 last_applied:2 is_complete:1      | 65533 |
//! |                    |     | hint:16 blob_len:2 blob                     |       |
//! | StateUpdateReply   | 605 | code:2 last_applied:2                       |     4 |
//! | DeleteSession      | 606 | (empty)                                     |     0 |
//! | DeleteSessionReply | 607 | code:2                                      |     2 |
//! ```
//!
//! # Protocol Version
//!
//! The negotiated protocol version is not on the wire; callers pass it to
//! every encode and decode. Per-kind payload ceilings are pure functions of
//! `(kind, version)`.
//!
//! # Example
//!
//! ```rust
//! use wtwire::wire::{decode_message, encode_message, DeleteSessionReply, ErrorCode, Message};
//!
//! let msg = Message::DeleteSessionReply(DeleteSessionReply { code: ErrorCode::OK });
//! let frame = encode_message(&msg, 0).unwrap();
//! assert_eq!(frame, vec![0x02, 0x5F, 0x00, 0x00]);
//! assert_eq!(decode_message(&frame, 0).unwrap(), msg);
//! ```

mod create_session;
mod delete_session;
mod error;
mod error_code;
mod error_msg;
pub mod features;
mod fields;
mod framer;
mod init;
mod message;
mod message_type;
mod state_update;

pub use create_session::{BlobType, CreateSession, CreateSessionReply, CREATE_SESSION_SIZE};
pub use delete_session::{DeleteSession, DeleteSessionReply, DELETE_SESSION_REPLY_SIZE};
pub use error::{Result, WireError};
pub use error_code::ErrorCode;
pub use error_msg::ErrorMsg;
pub use features::{FeatureBit, FeatureVector};
pub use fields::{PayloadReader, PayloadWriter, Segment};
pub use framer::{
    decode_message, encode_message, read_message, read_message_async, write_message,
    write_message_async,
};
pub use init::{ChainHash, Init, InitError, CHAIN_HASH_SIZE};
pub use message::{Message, WireMessage};
pub use message_type::{make_empty_message, MessageType};
pub use state_update::{
    BreachHint, StateUpdate, StateUpdateReply, BREACH_HINT_SIZE, STATE_UPDATE_REPLY_SIZE,
};

/// Protocol version negotiated by the connection layer.
pub type ProtocolVersion = u32;

/// Size of the type code prefix.
pub const TYPE_PREFIX_SIZE: usize = 2;

/// Largest frame, type prefix included.
pub const MAX_MESSAGE_SIZE: usize = 65535;

/// Largest payload any message may carry.
pub const MAX_MESSAGE_PAYLOAD: usize = MAX_MESSAGE_SIZE - TYPE_PREFIX_SIZE;
