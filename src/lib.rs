//! Fixed-size node and relationship records for a slot-addressed graph store.
//!
//! Records live at `record_size * index` in a random-access medium. This crate
//! provides the byte codecs, the fetch primitive, index-keyed stores, and
//! chain traversal helpers. Slot allocation, page caching, and write-ahead
//! logging belong to the layers above.

#![warn(missing_docs)]

pub mod logging;
pub mod primitives;
pub mod storage;
pub mod types;
