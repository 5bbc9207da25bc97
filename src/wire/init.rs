//! `Init` - capability announcement.
//!
//! Both sides send `Init` as the first message on a connection. It carries
//! the sender's connection features and the genesis hash of the chain it
//! operates on.
//!
//! ```text
//! [features_len: 2][features: features_len][chain_hash: 32]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::Result;
use super::features::{FeatureBit, FeatureVector, MAX_FEATURE_BYTES};
use super::fields::{PayloadReader, PayloadWriter, Segment, LEN_PREFIX_SIZE};
use super::message::WireMessage;
use super::{MessageType, ProtocolVersion, MAX_MESSAGE_PAYLOAD};

/// Size of a chain hash.
pub const CHAIN_HASH_SIZE: usize = 32;

/// Genesis block hash identifying a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainHash(pub [u8; CHAIN_HASH_SIZE]);

impl fmt::Display for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Capability announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Init {
    /// Features the sender supports or requires on this connection.
    pub conn_features: FeatureVector,
    /// Chain the sender operates on.
    pub chain_hash: ChainHash,
}

/// Reasons a remote `Init` is incompatible with ours.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// Remote is on a different chain.
    #[error("remote init has unknown chain hash {remote}, expected {local}")]
    UnknownChainHash {
        /// Our chain.
        local: ChainHash,
        /// Their chain.
        remote: ChainHash,
    },

    /// Remote requires features we do not understand.
    #[error("remote init requires unknown features: {0:?}")]
    UnknownRequiredFeatures(Vec<FeatureBit>),
}

impl Init {
    /// Create an `Init` for `chain_hash` with the given features.
    pub fn new(conn_features: FeatureVector, chain_hash: ChainHash) -> Self {
        Self {
            conn_features,
            chain_hash,
        }
    }

    /// Validate a peer's `Init` against ours.
    ///
    /// The chain hashes must match and every required (even) feature the
    /// remote sets must be listed in `known`.
    pub fn check_remote_init(
        &self,
        remote: &Init,
        known: &[(FeatureBit, &str)],
    ) -> std::result::Result<(), InitError> {
        if self.chain_hash != remote.chain_hash {
            return Err(InitError::UnknownChainHash {
                local: self.chain_hash,
                remote: remote.chain_hash,
            });
        }

        let unknown = remote.conn_features.unknown_required(known);
        if !unknown.is_empty() {
            return Err(InitError::UnknownRequiredFeatures(unknown));
        }

        Ok(())
    }

    /// Largest feature field that still leaves room for the chain hash.
    fn max_feature_len(pver: ProtocolVersion) -> usize {
        let room = Self::max_payload_length(pver) as usize - LEN_PREFIX_SIZE - CHAIN_HASH_SIZE;
        room.min(MAX_FEATURE_BYTES)
    }
}

impl WireMessage for Init {
    const MSG_TYPE: MessageType = MessageType::Init;

    fn max_payload_length(_pver: ProtocolVersion) -> u32 {
        MAX_MESSAGE_PAYLOAD as u32
    }

    fn layout(pver: ProtocolVersion) -> Vec<Segment> {
        vec![
            Segment::var("conn features", Self::max_feature_len(pver)),
            Segment::fixed("chain hash", CHAIN_HASH_SIZE),
        ]
    }

    fn encode(&self, w: &mut PayloadWriter, pver: ProtocolVersion) -> Result<()> {
        w.write_var_bytes(&self.conn_features.to_bytes(), Self::max_feature_len(pver))?;
        w.write_bytes(&self.chain_hash.0);
        Ok(())
    }

    fn decode(r: &mut PayloadReader<'_>, pver: ProtocolVersion) -> Result<Self> {
        let raw = r.read_var_bytes("conn features", Self::max_feature_len(pver))?;
        let chain_hash = ChainHash(r.read_array("chain hash")?);
        Ok(Self {
            conn_features: FeatureVector::from_bytes(&raw),
            chain_hash,
        })
    }
}
