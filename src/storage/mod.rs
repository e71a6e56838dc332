//! Fixed-size record storage for nodes and relationships.
//!
//! Implements the on-disk record codecs, slot-addressed fetching, index-keyed
//! stores, and relationship chain traversal.

mod chain;
mod fetcher;
mod options;
mod record;
mod store;

/// Relationship chain traversal and validation.
pub use chain::{validate_chain, walk_chain, ChainStep, ChainWalker};

/// Slot-addressed record reads.
pub use fetcher::{fetch, slot_offset, Fetcher};

/// Store configuration options.
pub use options::StoreOptions;

/// Record codecs and layout constants.
pub use record::{
    ChainSide, FixedRecord, Link, NodeRecord, RelationshipRecord, LINK_LEN, NODE_RECORD_LEN,
    RELATIONSHIP_RECORD_LEN,
};

/// Store capabilities and implementations.
pub use store::{
    FileStore, MemoryStore, NodeFile, NodeStore, RecordStore, RelationshipFile, RelationshipStore,
};
