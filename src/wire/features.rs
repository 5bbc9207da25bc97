//! Feature bit vectors exchanged in `Init`.
//!
//! Bits follow the "it's OK to be odd" rule: an even bit is required, the odd
//! bit right above it is the optional form of the same feature. On the wire
//! the vector is a big-endian bit field (bit 0 is the least significant bit
//! of the last byte) behind a `u16` length prefix.
//!
//! Decoding normalizes the field by dropping leading zero bytes, so two
//! encodings of the same bit set decode to equal values.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single feature bit.
pub type FeatureBit = u16;

/// Known feature bits.
pub mod bits {
    use super::FeatureBit;

    /// Tower accepts altruist (reward-free) sessions; required form.
    pub const ALTRUIST_SESSIONS_REQUIRED: FeatureBit = 0;
    /// Tower accepts altruist (reward-free) sessions; optional form.
    pub const ALTRUIST_SESSIONS_OPTIONAL: FeatureBit = 1;
    /// Anchor-output commitment blobs; required form.
    pub const ANCHOR_COMMIT_REQUIRED: FeatureBit = 2;
    /// Anchor-output commitment blobs; optional form.
    pub const ANCHOR_COMMIT_OPTIONAL: FeatureBit = 3;
    /// Taproot commitment blobs; required form.
    pub const TAPROOT_COMMIT_REQUIRED: FeatureBit = 4;
    /// Taproot commitment blobs; optional form.
    pub const TAPROOT_COMMIT_OPTIONAL: FeatureBit = 5;
}

/// Names of every feature bit this crate understands.
pub const KNOWN_FEATURES: &[(FeatureBit, &str)] = &[
    (bits::ALTRUIST_SESSIONS_REQUIRED, "altruist-sessions"),
    (bits::ALTRUIST_SESSIONS_OPTIONAL, "altruist-sessions"),
    (bits::ANCHOR_COMMIT_REQUIRED, "anchor-commit"),
    (bits::ANCHOR_COMMIT_OPTIONAL, "anchor-commit"),
    (bits::TAPROOT_COMMIT_REQUIRED, "taproot-commit"),
    (bits::TAPROOT_COMMIT_OPTIONAL, "taproot-commit"),
];

/// Look up the name of a known feature bit.
pub fn feature_name(bit: FeatureBit) -> Option<&'static str> {
    KNOWN_FEATURES
        .iter()
        .find(|(b, _)| *b == bit)
        .map(|(_, name)| *name)
}

/// Set of feature bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    bits: BTreeSet<FeatureBit>,
}

impl FeatureVector {
    /// Empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of bits.
    pub fn from_bits(bits: impl IntoIterator<Item = FeatureBit>) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    /// Set a bit.
    pub fn set(&mut self, bit: FeatureBit) {
        self.bits.insert(bit);
    }

    /// Clear a bit.
    pub fn unset(&mut self, bit: FeatureBit) {
        self.bits.remove(&bit);
    }

    /// Check if bit is set.
    pub fn is_set(&self, bit: FeatureBit) -> bool {
        self.bits.contains(&bit)
    }

    /// Iterate set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureBit> + '_ {
        self.bits.iter().copied()
    }

    /// True when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Required (even) bits set here that are absent from `known`.
    pub fn unknown_required(&self, known: &[(FeatureBit, &str)]) -> Vec<FeatureBit> {
        self.iter()
            .filter(|bit| bit % 2 == 0)
            .filter(|bit| !known.iter().any(|(k, _)| k == bit))
            .collect()
    }

    /// Encoded length of the bit field (without the length prefix).
    pub fn serialized_len(&self) -> usize {
        self.bits
            .iter()
            .next_back()
            .map_or(0, |&highest| highest as usize / 8 + 1)
    }

    /// Encode as a minimal big-endian bit field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.serialized_len();
        let mut out = vec![0u8; len];
        for &bit in &self.bits {
            let byte = len - 1 - bit as usize / 8;
            out[byte] |= 1 << (bit % 8);
        }
        out
    }

    /// Decode a big-endian bit field of any length.
    ///
    /// Bits beyond `u16::MAX` cannot be represented; the caller bounds the
    /// field to [`MAX_FEATURE_BYTES`], which keeps every index in range.
    pub fn from_bytes(data: &[u8]) -> Self {
        let len = data.len();
        let mut bits = BTreeSet::new();
        for (i, &byte) in data.iter().enumerate() {
            if byte == 0 {
                continue;
            }
            let base = (len - 1 - i) * 8;
            for shift in 0..8 {
                if byte & (1 << shift) != 0 {
                    bits.insert((base + shift) as FeatureBit);
                }
            }
        }
        Self { bits }
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for bit in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            match feature_name(bit) {
                Some(name) => write!(f, "{name}({bit})")?,
                None => write!(f, "unknown({bit})")?,
            }
        }
        Ok(())
    }
}

/// Largest feature field the codec accepts: every bit index must fit a
/// [`FeatureBit`].
pub const MAX_FEATURE_BYTES: usize = (FeatureBit::MAX as usize + 1) / 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout() {
        let fv = FeatureVector::from_bits([bits::ALTRUIST_SESSIONS_OPTIONAL, 9]);
        // bit 9 lands in the first of two bytes
        assert_eq!(fv.to_bytes(), vec![0x02, 0x02]);
        assert_eq!(fv.serialized_len(), 2);
    }

    #[test]
    fn test_empty_vector_encodes_empty() {
        let fv = FeatureVector::new();
        assert!(fv.to_bytes().is_empty());
        assert_eq!(FeatureVector::from_bytes(&[]), fv);
    }

    #[test]
    fn test_leading_zero_bytes_normalize() {
        let padded = FeatureVector::from_bytes(&[0x00, 0x00, 0x01]);
        let minimal = FeatureVector::from_bytes(&[0x01]);
        assert_eq!(padded, minimal);
        assert_eq!(padded.to_bytes(), vec![0x01]);
    }

    #[test]
    fn test_set_unset() {
        let mut fv = FeatureVector::new();
        fv.set(bits::ANCHOR_COMMIT_OPTIONAL);
        assert!(fv.is_set(bits::ANCHOR_COMMIT_OPTIONAL));
        fv.unset(bits::ANCHOR_COMMIT_OPTIONAL);
        assert!(fv.is_empty());
    }

    #[test]
    fn test_unknown_required() {
        let fv = FeatureVector::from_bits([bits::ALTRUIST_SESSIONS_REQUIRED, 40, 41]);
        assert_eq!(fv.unknown_required(KNOWN_FEATURES), vec![40]);
    }

    #[test]
    fn test_highest_bit_fits() {
        let data = vec![0xFFu8; MAX_FEATURE_BYTES];
        let fv = FeatureVector::from_bytes(&data);
        assert!(fv.is_set(FeatureBit::MAX));
        assert_eq!(fv.to_bytes(), data);
    }

    #[test]
    fn test_display_names() {
        let fv = FeatureVector::from_bits([bits::TAPROOT_COMMIT_OPTIONAL, 100]);
        assert_eq!(fv.to_string(), "taproot-commit(5), unknown(100)");
    }
}
