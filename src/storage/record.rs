//! Fixed-width node and relationship record codecs.
//!
//! | Record | Size | Layout |
//! |---|---|---|
//! | node | 9 | `[active:1][relationships:4][properties:4]` |
//! | link | 12 | `[self:4][previous:4][next:4]` |
//! | relationship | 33 | `[active:1][type:4][properties:4][start:12][end:12]` |
//!
//! All indices are little-endian. The codecs only check widths; chain
//! acyclicity is upheld by whoever writes the records.

use core::ops::Range;

use crate::primitives::bytes::{flag, le};
use crate::types::{Index, RecordKind, Result, SlotError, EMPTY};

/// Encoded width of a [`NodeRecord`].
pub const NODE_RECORD_LEN: usize = 9;
/// Encoded width of a [`Link`].
pub const LINK_LEN: usize = 12;
/// Encoded width of a [`RelationshipRecord`].
pub const RELATIONSHIP_RECORD_LEN: usize = 33;

mod node_layout {
    use core::ops::Range;

    pub const ACTIVE: usize = 0;
    pub const RELATIONSHIPS: Range<usize> = 1..5;
    pub const PROPERTIES: Range<usize> = 5..9;
}

mod link_layout {
    use core::ops::Range;

    pub const SELF_INDEX: Range<usize> = 0..4;
    pub const PREVIOUS: Range<usize> = 4..8;
    pub const NEXT: Range<usize> = 8..12;
}

mod relationship_layout {
    use core::ops::Range;

    pub const ACTIVE: usize = 0;
    pub const TYPE: Range<usize> = 1..5;
    pub const PROPERTIES: Range<usize> = 5..9;
    pub const START: Range<usize> = 9..21;
    pub const END: Range<usize> = 21..33;
}

/// A record with a fixed on-disk width.
pub trait FixedRecord: Sized + Clone + Send + Sync + 'static {
    /// Kind reported in length errors.
    const KIND: RecordKind;
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Writes the record into `dst`, which must be exactly [`Self::SIZE`] bytes.
    fn encode_into(&self, dst: &mut [u8]);

    /// Decodes a record, rejecting inputs that are not [`Self::SIZE`] bytes.
    fn decode(bytes: &[u8]) -> Result<Self>;

    /// Whether the record is live rather than soft-deleted.
    fn is_active(&self) -> bool;

    /// Returns a copy with the active flag cleared.
    fn deactivated(&self) -> Self;

    /// Encodes the record into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::SIZE];
        self.encode_into(&mut buf);
        buf
    }
}

fn check_len(kind: RecordKind, expected: usize, bytes: &[u8]) -> Result<()> {
    if bytes.len() != expected {
        return Err(SlotError::InvalidRecordLength {
            kind,
            expected,
            got: bytes.len(),
        });
    }
    Ok(())
}

fn index_at(bytes: &[u8], range: Range<usize>) -> Index {
    le::get_index(&bytes[range])
}

/// A node and the heads of its relationship and property chains.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeRecord {
    /// Cleared when the node is logically deleted.
    pub active: bool,
    /// First relationship in this node's chain, or [`EMPTY`].
    pub relationships: Index,
    /// First property in this node's chain, or [`EMPTY`].
    pub properties: Index,
}

impl NodeRecord {
    /// A live node with no relationships and no properties.
    pub const fn new() -> Self {
        Self {
            active: true,
            relationships: EMPTY,
            properties: EMPTY,
        }
    }

    /// Encodes into the fixed 9-byte layout.
    pub fn to_bytes(&self) -> [u8; NODE_RECORD_LEN] {
        let mut buf = [0u8; NODE_RECORD_LEN];
        self.encode_into(&mut buf);
        buf
    }

    /// Decodes from exactly 9 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        <Self as FixedRecord>::decode(bytes)
    }
}

impl Default for NodeRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedRecord for NodeRecord {
    const KIND: RecordKind = RecordKind::Node;
    const SIZE: usize = NODE_RECORD_LEN;

    fn encode_into(&self, dst: &mut [u8]) {
        assert_eq!(dst.len(), NODE_RECORD_LEN, "node destination must be 9 bytes");
        dst[node_layout::ACTIVE] = flag::encode(self.active);
        le::put_index(&mut dst[node_layout::RELATIONSHIPS], self.relationships);
        le::put_index(&mut dst[node_layout::PROPERTIES], self.properties);
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        check_len(RecordKind::Node, NODE_RECORD_LEN, bytes)?;
        Ok(Self {
            active: flag::decode(bytes[node_layout::ACTIVE]),
            relationships: index_at(bytes, node_layout::RELATIONSHIPS),
            properties: index_at(bytes, node_layout::PROPERTIES),
        })
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivated(&self) -> Self {
        Self {
            active: false,
            ..*self
        }
    }
}

/// One endpoint's position in a node's doubly linked relationship chain.
///
/// The link does not name the node; a walk tells the two links of a
/// relationship apart by which `previous` matches the slot it came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Link {
    /// Slot of the relationship record this link belongs to.
    pub self_index: Index,
    /// Previous relationship in the chain, or [`EMPTY`] at the head.
    pub previous: Index,
    /// Next relationship in the chain, or [`EMPTY`] at the tail.
    pub next: Index,
}

impl Link {
    /// A link of the relationship at `self_index` with no neighbours.
    pub const fn detached(self_index: Index) -> Self {
        Self {
            self_index,
            previous: EMPTY,
            next: EMPTY,
        }
    }

    /// True when nothing precedes this link.
    pub const fn is_head(&self) -> bool {
        self.previous.is_empty()
    }

    /// True when nothing follows this link.
    pub const fn is_tail(&self) -> bool {
        self.next.is_empty()
    }

    /// Encodes into the 12-byte sub-layout.
    pub fn to_bytes(&self) -> [u8; LINK_LEN] {
        let mut buf = [0u8; LINK_LEN];
        self.write_to(&mut buf);
        buf
    }

    fn write_to(&self, dst: &mut [u8]) {
        le::put_index(&mut dst[link_layout::SELF_INDEX], self.self_index);
        le::put_index(&mut dst[link_layout::PREVIOUS], self.previous);
        le::put_index(&mut dst[link_layout::NEXT], self.next);
    }

    // Always a 12-byte window of a relationship record; callers guarantee width.
    fn read_from(src: &[u8]) -> Self {
        Self {
            self_index: index_at(src, link_layout::SELF_INDEX),
            previous: index_at(src, link_layout::PREVIOUS),
            next: index_at(src, link_layout::NEXT),
        }
    }
}

/// Which of a relationship's two links a chain runs through.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChainSide {
    /// The start endpoint's link.
    Start,
    /// The end endpoint's link.
    End,
}

/// A typed relationship threaded into the chains of both endpoints.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RelationshipRecord {
    /// Cleared when the relationship is logically deleted.
    pub active: bool,
    /// Relationship type identifier.
    pub ty: Index,
    /// First property in this relationship's chain, or [`EMPTY`].
    pub properties: Index,
    /// Position in the start node's chain.
    pub start: Link,
    /// Position in the end node's chain.
    pub end: Link,
}

impl RelationshipRecord {
    /// A live relationship of type `ty` stored at `slot`, linked into no chain.
    pub const fn new(slot: Index, ty: Index) -> Self {
        Self {
            active: true,
            ty,
            properties: EMPTY,
            start: Link::detached(slot),
            end: Link::detached(slot),
        }
    }

    /// The link on `side`.
    pub fn link(&self, side: ChainSide) -> &Link {
        match side {
            ChainSide::Start => &self.start,
            ChainSide::End => &self.end,
        }
    }

    /// Picks the side a chain walk continues through after leaving `previous`.
    ///
    /// A side is chosen when exactly one link's `previous` matches. When both
    /// match, `prefer` breaks the tie; without it the tie is only accepted if
    /// both links lead to the same next slot.
    pub fn side_after(
        &self,
        previous: Index,
        prefer: Option<ChainSide>,
    ) -> core::result::Result<ChainSide, &'static str> {
        match (self.start.previous == previous, self.end.previous == previous) {
            (true, false) => Ok(ChainSide::Start),
            (false, true) => Ok(ChainSide::End),
            (true, true) if self.start.next == self.end.next => {
                Ok(prefer.unwrap_or(ChainSide::Start))
            }
            (true, true) => prefer.ok_or("both links follow the previous slot"),
            (false, false) => Err("no link follows the previous slot"),
        }
    }

    /// Encodes into the fixed 33-byte layout.
    pub fn to_bytes(&self) -> [u8; RELATIONSHIP_RECORD_LEN] {
        let mut buf = [0u8; RELATIONSHIP_RECORD_LEN];
        self.encode_into(&mut buf);
        buf
    }

    /// Decodes from exactly 33 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        <Self as FixedRecord>::decode(bytes)
    }
}

impl FixedRecord for RelationshipRecord {
    const KIND: RecordKind = RecordKind::Relationship;
    const SIZE: usize = RELATIONSHIP_RECORD_LEN;

    fn encode_into(&self, dst: &mut [u8]) {
        assert_eq!(
            dst.len(),
            RELATIONSHIP_RECORD_LEN,
            "relationship destination must be 33 bytes"
        );
        dst[relationship_layout::ACTIVE] = flag::encode(self.active);
        le::put_index(&mut dst[relationship_layout::TYPE], self.ty);
        le::put_index(&mut dst[relationship_layout::PROPERTIES], self.properties);
        self.start.write_to(&mut dst[relationship_layout::START]);
        self.end.write_to(&mut dst[relationship_layout::END]);
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        check_len(RecordKind::Relationship, RELATIONSHIP_RECORD_LEN, bytes)?;
        Ok(Self {
            active: flag::decode(bytes[relationship_layout::ACTIVE]),
            ty: index_at(bytes, relationship_layout::TYPE),
            properties: index_at(bytes, relationship_layout::PROPERTIES),
            start: Link::read_from(&bytes[relationship_layout::START]),
            end: Link::read_from(&bytes[relationship_layout::END]),
        })
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivated(&self) -> Self {
        Self {
            active: false,
            ..*self
        }
    }
}
