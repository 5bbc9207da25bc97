//! Status codes carried in replies and error notifications.
//!
//! The codec treats a code as an opaque `u16`: any value decodes and
//! re-encodes unchanged. The named constants cover the codes towers and
//! clients are known to exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reply/error status code (16 bits on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    /// Request succeeded.
    pub const OK: ErrorCode = ErrorCode(0);
    /// Transient failure; the request may be retried.
    pub const TEMPORARY_FAILURE: ErrorCode = ErrorCode(1);
    /// Permanent failure; do not retry.
    pub const PERMANENT_FAILURE: ErrorCode = ErrorCode(2);
    /// Tower does not support the requested blob type.
    pub const REJECT_BLOB_TYPE: ErrorCode = ErrorCode(40);
    /// A session already exists for this client key.
    pub const CREATE_SESSION_ALREADY_EXISTS: ErrorCode = ErrorCode(60);
    /// Update would exceed the session's negotiated maximum.
    pub const STATE_UPDATE_MAX_UPDATES_EXCEEDED: ErrorCode = ErrorCode(70);
    /// Client's view of the session is behind the tower's.
    pub const STATE_UPDATE_CLIENT_BEHIND: ErrorCode = ErrorCode(71);
    /// Encrypted blob has the wrong size for the session's blob type.
    pub const STATE_UPDATE_INVALID_BLOB_SIZE: ErrorCode = ErrorCode(72);
    /// No session to delete.
    pub const DELETE_SESSION_NOT_FOUND: ErrorCode = ErrorCode(80);

    /// Raw code.
    pub fn code(self) -> u16 {
        self.0
    }

    /// True for [`ErrorCode::OK`].
    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    /// Name of a well-known code.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::OK => "OK",
            Self::TEMPORARY_FAILURE => "TemporaryFailure",
            Self::PERMANENT_FAILURE => "PermanentFailure",
            Self::REJECT_BLOB_TYPE => "RejectBlobType",
            Self::CREATE_SESSION_ALREADY_EXISTS => "CreateSessionAlreadyExists",
            Self::STATE_UPDATE_MAX_UPDATES_EXCEEDED => "StateUpdateMaxUpdatesExceeded",
            Self::STATE_UPDATE_CLIENT_BEHIND => "StateUpdateClientBehind",
            Self::STATE_UPDATE_INVALID_BLOB_SIZE => "StateUpdateInvalidBlobSize",
            Self::DELETE_SESSION_NOT_FOUND => "DeleteSessionNotFound",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "UnknownErrorCode({})", self.0),
        }
    }
}

impl From<u16> for ErrorCode {
    fn from(code: u16) -> Self {
        ErrorCode(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_display() {
        assert_eq!(ErrorCode::OK.to_string(), "OK");
        assert_eq!(
            ErrorCode::STATE_UPDATE_CLIENT_BEHIND.to_string(),
            "StateUpdateClientBehind"
        );
    }

    #[test]
    fn test_unknown_code_display() {
        assert_eq!(ErrorCode(999).to_string(), "UnknownErrorCode(999)");
        assert!(ErrorCode(999).name().is_none());
    }

    #[test]
    fn test_default_is_ok() {
        assert!(ErrorCode::default().is_ok());
        assert!(!ErrorCode::PERMANENT_FAILURE.is_ok());
    }
}
