//! `Error` - error notification, sent in either direction.
//!
//! ```text
//! [code: 2][data_len: 2][data: data_len]
//! ```
//!
//! `data` is usually human-readable text but is kept as raw bytes so that any
//! payload a peer sends re-encodes byte-for-byte.

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::fields::{PayloadReader, PayloadWriter, Segment, LEN_PREFIX_SIZE};
use super::message::WireMessage;
use super::{ErrorCode, MessageType, ProtocolVersion, MAX_MESSAGE_PAYLOAD};

/// Error notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMsg {
    /// What went wrong.
    pub code: ErrorCode,
    /// Free-form detail.
    pub data: Vec<u8>,
}

impl ErrorMsg {
    /// Create an error notification with a text message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            data: message.into().into_bytes(),
        }
    }

    /// `data` as text, replacing invalid UTF-8.
    pub fn message_text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Largest `data` field for protocol version `pver`.
    pub fn max_data_len(pver: ProtocolVersion) -> usize {
        Self::max_payload_length(pver) as usize - 2 - LEN_PREFIX_SIZE
    }
}

impl WireMessage for ErrorMsg {
    const MSG_TYPE: MessageType = MessageType::Error;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        MAX_MESSAGE_PAYLOAD as u32
    }

    fn layout(pver: ProtocolVersion) -> Vec<Segment> {
        vec![
            Segment::fixed("error code", 2),
            Segment::var("error data", Self::max_data_len(pver)),
        ]
    }

    fn encode(&self, w: &mut PayloadWriter, pver: ProtocolVersion) -> Result<()> {
        w.write_u16(self.code.0);
        w.write_var_bytes(&self.data, Self::max_data_len(pver))
    }

    fn decode(r: &mut PayloadReader<'_>, pver: ProtocolVersion) -> Result<Self> {
        let code = ErrorCode(r.read_u16("error code")?);
        let data = r.read_tail_var_bytes("error data", Self::max_data_len(pver))?;
        Ok(Self { code, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Message, WireError};
    use hex_literal::hex;

    #[test]
    fn test_error_wire_layout() {
        let msg = Message::Error(ErrorMsg::new(ErrorCode::TEMPORARY_FAILURE, "busy"));
        let payload = msg.encode_payload(0).unwrap();
        assert_eq!(payload, hex!("0001 0004 62757379"));
    }

    #[test]
    fn test_error_declared_length_exceeds_payload() {
        // data_len claims 1000 bytes but only 10 follow
        let mut payload = hex!("0002 03E8").to_vec();
        payload.extend_from_slice(b"0123456789");
        let err = Message::decode_payload(MessageType::Error, &payload, 0).unwrap_err();
        assert!(matches!(
            err,
            WireError::InvalidLength {
                field: "error data",
                declared: 1000,
                allowed: 10
            }
        ));
    }

    #[test]
    fn test_error_missing_length_is_eof() {
        let payload = hex!("0002 00");
        let err = Message::decode_payload(MessageType::Error, &payload, 0).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_error_non_utf8_preserved() {
        let payload = hex!("0050 0002 FFFE");
        let msg = Message::decode_payload(MessageType::Error, &payload, 0).unwrap();
        let Message::Error(err) = &msg else {
            panic!("expected Error, got {msg:?}");
        };
        assert_eq!(err.code, ErrorCode::DELETE_SESSION_NOT_FOUND);
        assert_eq!(err.data, vec![0xFF, 0xFE]);
        assert_eq!(msg.encode_payload(0).unwrap(), payload);
    }

    #[test]
    fn test_error_oversized_data_refused() {
        let msg = Message::Error(ErrorMsg {
            code: ErrorCode::PERMANENT_FAILURE,
            data: vec![b'x'; ErrorMsg::max_data_len(0) + 1],
        });
        assert!(matches!(
            msg.encode_payload(0),
            Err(WireError::PayloadTooLarge {
                msg_type: MessageType::Error,
                ..
            })
        ));
    }

    #[test]
    fn test_error_max_data_fits_exactly() {
        let msg = Message::Error(ErrorMsg {
            code: ErrorCode::PERMANENT_FAILURE,
            data: vec![b'x'; ErrorMsg::max_data_len(0)],
        });
        let payload = msg.encode_payload(0).unwrap();
        assert_eq!(payload.len(), MAX_MESSAGE_PAYLOAD);
        assert_eq!(
            Message::decode_payload(MessageType::Error, &payload, 0).unwrap(),
            msg
        );
    }
}
