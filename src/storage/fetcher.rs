//! Slot-addressed reads of fixed-size records.

use tracing::{debug, trace};

use crate::primitives::io::ByteSource;
use crate::types::{Index, Result, SlotError};

/// Computes the byte offset of slot `index` for records of `record_size` bytes.
pub fn slot_offset(record_size: usize, index: Index) -> Result<u64> {
    (record_size as u64)
        .checked_mul(u64::from(index.get()))
        .ok_or(SlotError::Invalid("slot offset overflows u64"))
}

/// Reads exactly one record's bytes for slot `index` from `source`.
///
/// Fails with [`SlotError::ShortRead`] when the source ends before a full
/// record is available. Nothing is retried.
pub fn fetch<S>(record_size: usize, source: &S, index: Index) -> Result<Vec<u8>>
where
    S: ByteSource + ?Sized,
{
    if record_size == 0 {
        return Err(SlotError::Invalid("record size must be non-zero"));
    }
    let offset = slot_offset(record_size, index)?;
    let mut buffer = vec![0u8; record_size];
    let got = source.read_at(offset, &mut buffer)?;
    trace!(index = index.get(), offset, record_size, got, "fetcher.read");
    if got != record_size {
        debug!(
            index = index.get(),
            offset,
            expected = record_size,
            got,
            "fetcher.short_read"
        );
        return Err(SlotError::ShortRead {
            expected: record_size,
            got,
        });
    }
    Ok(buffer)
}

/// Binds a record size to a byte source.
#[derive(Clone, Debug)]
pub struct Fetcher<S> {
    record_size: usize,
    source: S,
}

impl<S: ByteSource> Fetcher<S> {
    /// Creates a fetcher for records of `record_size` bytes.
    pub fn new(record_size: usize, source: S) -> Result<Self> {
        if record_size == 0 {
            return Err(SlotError::Invalid("record size must be non-zero"));
        }
        Ok(Self {
            record_size,
            source,
        })
    }

    /// Width of each record.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// The underlying byte source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reads the bytes of slot `index`.
    pub fn fetch(&self, index: Index) -> Result<Vec<u8>> {
        fetch(self.record_size, &self.source, index)
    }
}
