#![forbid(unsafe_code)]
//! Slot identifiers, record kinds, and the crate-wide error type.

use std::fmt;

/// Width in bytes of an encoded [`Index`].
pub const INDEX_LEN: usize = 4;

/// A 32-bit slot identifier.
///
/// Indices are stored little-endian on disk and held as an unsigned
/// magnitude in memory, so the all-ones pattern decodes to 4294967295
/// rather than -1. Compare against [`EMPTY`] to test for absence; arithmetic
/// on indices carries no meaning.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Index(pub u32);

/// Reserved index meaning "no reference".
pub const EMPTY: Index = Index::from_le_bytes([0xFF; INDEX_LEN]);

impl Index {
    /// Decodes an index from its on-disk byte pattern.
    pub const fn from_le_bytes(bytes: [u8; INDEX_LEN]) -> Self {
        Index(
            bytes[0] as u32
                | (bytes[1] as u32) << 8
                | (bytes[2] as u32) << 16
                | (bytes[3] as u32) << 24,
        )
    }

    /// Encodes the index low byte first.
    pub const fn to_le_bytes(self) -> [u8; INDEX_LEN] {
        self.0.to_le_bytes()
    }

    /// Returns the raw slot number.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true when this is the [`EMPTY`] sentinel.
    pub const fn is_empty(self) -> bool {
        self.0 == EMPTY.0
    }
}

impl From<u32> for Index {
    fn from(value: u32) -> Self {
        Index(value)
    }
}

impl From<Index> for u32 {
    fn from(value: Index) -> Self {
        value.0
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("empty")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Kind of fixed-size record held in a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RecordKind {
    /// Node record.
    Node,
    /// Relationship record.
    Relationship,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Node => f.write_str("node"),
            RecordKind::Relationship => f.write_str("relationship"),
        }
    }
}

/// Errors raised by the record codecs, the fetcher, and the stores.
#[derive(thiserror::Error, Debug)]
pub enum SlotError {
    /// Failure reported by the underlying medium.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// Decode input did not match the fixed record width.
    #[error("invalid {kind} record length: expected {expected} bytes, got {got}")]
    InvalidRecordLength {
        /// Record kind being decoded.
        kind: RecordKind,
        /// Fixed width of the record.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },
    /// The medium held fewer bytes than one record at the requested slot.
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead {
        /// Record size requested.
        expected: usize,
        /// Bytes actually available.
        got: usize,
    },
    /// A store refused to write the slot.
    #[error("write to slot {index} rejected: {reason}")]
    WriteRejected {
        /// Target slot.
        index: Index,
        /// Why the write was refused.
        reason: &'static str,
    },
    /// A relationship chain points somewhere it should not.
    #[error("broken relationship chain for node {node} at {at}: {reason}")]
    BrokenChain {
        /// Node owning the chain.
        node: Index,
        /// Relationship slot where the violation was observed.
        at: Index,
        /// Description of the violation.
        reason: &'static str,
    },
    /// A relationship chain revisits a slot.
    #[error("relationship chain for node {node} revisits {at}")]
    ChainCycle {
        /// Node owning the chain.
        node: Index,
        /// First slot seen twice.
        at: Index,
    },
    /// Caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SlotError>;
