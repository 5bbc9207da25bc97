//! Codec error type.
//!
//! Every failure the codec can produce is a [`WireError`]. Nothing inside the
//! codec logs, retries or swallows an error; the first one encountered is
//! returned to the caller of [`read_message`](super::read_message) or
//! [`write_message`](super::write_message).
//!
//! # Classification
//!
//! | Error | Raised by | Typical cause |
//! |-------|-----------|---------------|
//! | `UnknownMessageType` | decode | Peer sent a type code outside the registry |
//! | `UnexpectedEof` | decode | Stream ended before a fixed field was complete |
//! | `MessageTooLarge` | decode, encode | Frame exceeds the protocol-wide ceiling |
//! | `PayloadTooLarge` | decode, encode | Payload exceeds the kind's ceiling |
//! | `InvalidLength` | decode | Length prefix disagrees with the payload |
//! | `MalformedField` | decode | Fixed field holds a value outside its domain |
//! | `Io` | decode, encode | Transport failure other than end of stream |
//!
//! Decode errors on bytes received from a peer should normally be treated as
//! connection-fatal. Encode errors come from locally constructed values and
//! only fail the single attempt.

use std::io;

use thiserror::Error;

use super::MessageType;

/// Field name used for the 2-byte type prefix.
pub(crate) const TYPE_FIELD: &str = "message type";

/// Codec errors.
#[derive(Debug, Error)]
pub enum WireError {
    // ═══════════════════════════════════════════════════════════════════════
    // Framing
    // ═══════════════════════════════════════════════════════════════════════
    /// Type code is not one of the registered message kinds.
    #[error("unknown message type: {0}")]
    UnknownMessageType(u16),

    /// Stream ended before `field` could be read completely.
    #[error("unexpected EOF reading {field}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        /// Field being read.
        field: &'static str,
        /// Bytes the field requires.
        needed: usize,
        /// Bytes that were actually available.
        available: usize,
    },

    /// Whole frame exceeds the protocol-wide ceiling.
    #[error("message too large: {size} bytes exceeds maximum of {max}")]
    MessageTooLarge {
        /// Offending size in bytes.
        size: usize,
        /// Global ceiling.
        max: usize,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Payload validation
    // ═══════════════════════════════════════════════════════════════════════
    /// Payload exceeds the per-kind ceiling for the negotiated version.
    #[error("payload too large for {msg_type}: {size} bytes exceeds maximum of {max}")]
    PayloadTooLarge {
        /// Kind whose ceiling was exceeded.
        msg_type: MessageType,
        /// Offending size in bytes.
        size: usize,
        /// Ceiling for this kind and version.
        max: usize,
    },

    /// A variable-length field's length prefix is inconsistent with the
    /// payload or exceeds the field's bound.
    #[error("invalid length for {field}: declared {declared}, allowed {allowed}")]
    InvalidLength {
        /// Field whose length is wrong.
        field: &'static str,
        /// Declared (or observed) length.
        declared: usize,
        /// Length the payload can accommodate.
        allowed: usize,
    },

    /// A fixed field holds a value outside its defined range.
    #[error("malformed {field}: {reason}")]
    MalformedField {
        /// Field that failed validation.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Transport
    // ═══════════════════════════════════════════════════════════════════════
    /// I/O failure from the underlying stream.
    #[error("stream error: {0}")]
    Io(#[source] io::Error),
}

impl WireError {
    /// True when the stream was already exhausted before the type prefix.
    ///
    /// Both a clean end of stream and a mid-message truncation surface as
    /// [`WireError::UnexpectedEof`]; this lets a connection loop tell them
    /// apart.
    pub fn is_clean_eof(&self) -> bool {
        matches!(
            self,
            WireError::UnexpectedEof {
                field: TYPE_FIELD,
                available: 0,
                ..
            }
        )
    }

    pub(crate) fn eof(field: &'static str, needed: usize, available: usize) -> Self {
        WireError::UnexpectedEof {
            field,
            needed,
            available,
        }
    }

    pub(crate) fn invalid_length(field: &'static str, declared: usize, allowed: usize) -> Self {
        WireError::InvalidLength {
            field,
            declared,
            allowed,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        WireError::Io(err)
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_eof_detection() {
        let clean = WireError::eof(TYPE_FIELD, 2, 0);
        assert!(clean.is_clean_eof());

        let partial = WireError::eof(TYPE_FIELD, 2, 1);
        assert!(!partial.is_clean_eof());

        let mid_payload = WireError::eof("seq num", 2, 0);
        assert!(!mid_payload.is_clean_eof());
    }

    #[test]
    fn test_display_mentions_kind() {
        let err = WireError::PayloadTooLarge {
            msg_type: MessageType::StateUpdateReply,
            size: 5,
            max: 4,
        };
        let text = err.to_string();
        assert!(text.contains("StateUpdateReply"));
        assert!(text.contains('5'));
    }

    #[test]
    fn test_io_error_source_chain() {
        use std::error::Error;

        let err: WireError = io::Error::new(io::ErrorKind::BrokenPipe, "peer gone").into();
        assert!(matches!(err, WireError::Io(_)));
        assert!(err.source().unwrap().to_string().contains("peer gone"));
    }
}
