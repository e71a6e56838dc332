//! Index-keyed record stores layered on the fetcher and codecs.

use std::marker::PhantomData;
use std::path::Path;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::fetcher::{slot_offset, Fetcher};
use super::options::StoreOptions;
use super::record::{FixedRecord, NodeRecord, RelationshipRecord};
use crate::primitives::bytes::flag;
use crate::primitives::io::{Medium, StdFileIo};
use crate::types::{Index, Result, SlotError};

/// Fetch and store records of one kind by slot index.
///
/// `fetch` returns `Ok(None)` when the slot holds no record: the sentinel
/// index, a slot never written, or one wholly past the end of the medium.
/// Read failures, torn records, and undecodable bytes are errors, not
/// absence. A `store` followed by a `fetch` of the same slot yields the
/// stored record, whether or not it is active.
///
/// Stores never pick slots or relink chains; that belongs to the allocator
/// driving them. Concurrent writers to one slot must be serialized by the
/// caller.
pub trait RecordStore<R: FixedRecord> {
    /// Reads the record at `index`.
    fn fetch(&self, index: Index) -> Result<Option<R>>;

    /// Writes `record` at `index`.
    fn store(&self, index: Index, record: &R) -> Result<()>;

    /// Soft-deletes the record at `index` by clearing its active flag.
    fn delete(&self, index: Index) -> Result<()> {
        match self.fetch(index)? {
            Some(record) => self.store(index, &record.deactivated()),
            None => Err(SlotError::WriteRejected {
                index,
                reason: "slot holds no record",
            }),
        }
    }
}

/// Capability to fetch and store node records.
pub trait NodeStore: RecordStore<NodeRecord> {}

impl<T: RecordStore<NodeRecord> + ?Sized> NodeStore for T {}

/// Capability to fetch and store relationship records.
pub trait RelationshipStore: RecordStore<RelationshipRecord> {}

impl<T: RecordStore<RelationshipRecord> + ?Sized> RelationshipStore for T {}

fn reject_sentinel(index: Index) -> Result<()> {
    if index.is_empty() {
        return Err(SlotError::WriteRejected {
            index,
            reason: "sentinel index addresses no slot",
        });
    }
    Ok(())
}

/// In-memory store keeping each slot's encoded bytes.
pub struct MemoryStore<R> {
    slots: RwLock<FxHashMap<Index, Vec<u8>>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: FixedRecord> MemoryStore<R> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(FxHashMap::default()),
            _record: PhantomData,
        }
    }

    /// Number of slots ever written.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// True when no slot has been written.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

impl<R: FixedRecord> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: FixedRecord> RecordStore<R> for MemoryStore<R> {
    fn fetch(&self, index: Index) -> Result<Option<R>> {
        let slots = self.slots.read();
        match slots.get(&index) {
            Some(bytes) => R::decode(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn store(&self, index: Index, record: &R) -> Result<()> {
        reject_sentinel(index)?;
        self.slots.write().insert(index, record.encode());
        Ok(())
    }
}

const GAP_CHUNK: usize = 64 * 1024;

/// Node store over a record file.
pub type NodeFile = FileStore<NodeRecord, StdFileIo>;

/// Relationship store over a record file.
pub type RelationshipFile = FileStore<RelationshipRecord, StdFileIo>;

/// Store backed by a byte-addressable medium, one record per `R::SIZE` window.
pub struct FileStore<R, M> {
    fetcher: Fetcher<M>,
    opts: StoreOptions,
    _record: PhantomData<fn() -> R>,
}

impl<R: FixedRecord> FileStore<R, StdFileIo> {
    /// Opens the record file at `path`.
    pub fn open(path: impl AsRef<Path>, opts: StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        let medium = StdFileIo::open(path, opts.create_if_missing)?;
        debug!(path = %path.display(), kind = %R::KIND, "store.open");
        Self::new(medium, opts)
    }
}

impl<R: FixedRecord, M: Medium> FileStore<R, M> {
    /// Wraps `medium` as a record store.
    pub fn new(medium: M, opts: StoreOptions) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(R::SIZE, medium)?,
            opts,
            _record: PhantomData,
        })
    }

    /// The underlying medium.
    pub fn medium(&self) -> &M {
        self.fetcher.source()
    }

    /// Options the store was opened with.
    pub fn options(&self) -> StoreOptions {
        self.opts
    }

    /// Number of whole record windows the medium currently holds.
    pub fn slot_count(&self) -> Result<u64> {
        Ok(self.medium().len()? / R::SIZE as u64)
    }

    /// Iterates the records of every whole slot in order, skipping empty slots.
    pub fn records(&self) -> Result<impl Iterator<Item = Result<(Index, R)>> + '_> {
        let count = u32::try_from(self.slot_count()?)
            .map_err(|_| SlotError::Invalid("slot count exceeds u32"))?;
        Ok((0..count).map(Index).filter_map(move |index| {
            self.fetch(index)
                .transpose()
                .map(|step| step.map(|record| (index, record)))
        }))
    }

    /// Decodes every whole slot that holds a record.
    pub fn scan(&self) -> Result<Vec<(Index, R)>> {
        self.records()?.collect()
    }

    /// Counts the slots holding an active record.
    pub fn active_count(&self) -> Result<u64> {
        let mut active = 0;
        for step in self.records()? {
            if step?.1.is_active() {
                active += 1;
            }
        }
        Ok(active)
    }

    // Marks the windows between the current end and `offset` as unwritten.
    fn fill_gap(&self, offset: u64) -> Result<()> {
        let mut at = self.medium().len()?;
        if at >= offset {
            return Ok(());
        }
        let chunk = vec![flag::UNWRITTEN; GAP_CHUNK];
        while at < offset {
            let n = (offset - at).min(GAP_CHUNK as u64) as usize;
            self.medium().write_at(at, &chunk[..n])?;
            at += n as u64;
        }
        trace!(kind = %R::KIND, offset, "store.fill_gap");
        Ok(())
    }
}

impl<R: FixedRecord, M: Medium> RecordStore<R> for FileStore<R, M> {
    fn fetch(&self, index: Index) -> Result<Option<R>> {
        if index.is_empty() {
            return Ok(None);
        }
        match self.fetcher.fetch(index) {
            Ok(bytes) if bytes[0] == flag::UNWRITTEN => Ok(None),
            Ok(bytes) => R::decode(&bytes).map(Some),
            Err(SlotError::ShortRead { got: 0, .. }) => {
                debug!(index = index.get(), kind = %R::KIND, "store.fetch_absent");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn store(&self, index: Index, record: &R) -> Result<()> {
        reject_sentinel(index)?;
        let offset = slot_offset(R::SIZE, index).map_err(|_| SlotError::WriteRejected {
            index,
            reason: "slot offset overflows",
        })?;
        self.fill_gap(offset)?;
        self.medium().write_at(offset, &record.encode())?;
        if self.opts.sync_on_store {
            self.medium().sync_all()?;
        }
        trace!(
            index = index.get(),
            offset,
            kind = %R::KIND,
            active = record.is_active(),
            "store.write"
        );
        Ok(())
    }
}
