#![forbid(unsafe_code)]

use std::{
    fs::{File, OpenOptions},
    io,
    path::Path,
    sync::Arc,
};

use parking_lot::RwLock;

use crate::types::{Result, SlotError};

#[cfg(test)]
macro_rules! io_test_log {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

#[cfg(not(test))]
macro_rules! io_test_log {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}

/// Random-access byte source addressed by absolute offset.
pub trait ByteSource: Send + Sync {
    /// Reads up to `dst.len()` bytes starting at `off`.
    ///
    /// Returns how many bytes were actually available; a count below
    /// `dst.len()` means the source ended first. Failures of the medium
    /// itself are reported as [`SlotError::Io`].
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<usize>;
}

/// A byte source that can also be written, synced, and measured.
pub trait Medium: ByteSource {
    /// Writes all of `src` at `off`, growing the medium if needed.
    fn write_at(&self, off: u64, src: &[u8]) -> Result<()>;
    /// Flushes written data to durable storage.
    fn sync_all(&self) -> Result<()>;
    /// Returns the current length of the medium in bytes.
    fn len(&self) -> Result<u64>;
    /// Returns true if the medium holds no bytes.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl ByteSource for [u8] {
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<usize> {
        let start = match usize::try_from(off) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };
        let n = dst.len().min(self.len() - start);
        dst[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl ByteSource for Vec<u8> {
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<usize> {
        self.as_slice().read_at(off, dst)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<usize> {
        (**self).read_at(off, dst)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Arc<T> {
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<usize> {
        (**self).read_at(off, dst)
    }
}

impl<T: Medium + ?Sized> Medium for Arc<T> {
    fn write_at(&self, off: u64, src: &[u8]) -> Result<()> {
        (**self).write_at(off, src)
    }

    fn sync_all(&self) -> Result<()> {
        (**self).sync_all()
    }

    fn len(&self) -> Result<u64> {
        (**self).len()
    }
}

#[cfg(unix)]
/// Unix-specific positioned I/O using POSIX APIs.
pub mod stdio_unix {
    use std::{
        fs::File,
        io::{self, ErrorKind},
        os::unix::fs::FileExt,
    };

    /// Reads until `dst` is full or the file ends, returning the byte count.
    pub fn read_available(file: &File, mut off: u64, dst: &mut [u8]) -> io::Result<usize> {
        io_test_log!("[io.read_available] start off={} len={}", off, dst.len());
        let mut filled = 0;
        while filled < dst.len() {
            match file.read_at(&mut dst[filled..], off) {
                Ok(0) => {
                    io_test_log!("[io.read_available] eof off={} filled={}", off, filled);
                    break;
                }
                Ok(read) => {
                    filled += read;
                    off += read as u64;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }

    /// Writes all bytes at offset using Unix pwrite semantics.
    pub fn write_all(file: &File, mut off: u64, mut src: &[u8]) -> io::Result<()> {
        io_test_log!("[io.write_all] start off={} len={}", off, src.len());
        while !src.is_empty() {
            let written = file.write_at(src, off)?;
            if written == 0 {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "write_at wrote zero bytes",
                ));
            }
            src = &src[written..];
            off += written as u64;
        }
        Ok(())
    }
}

#[cfg(windows)]
/// Windows-specific positioned I/O using seek_read/seek_write.
pub mod stdio_win {
    use std::{
        fs::File,
        io::{self, ErrorKind},
        os::windows::fs::FileExt,
    };

    /// Reads until `dst` is full or the file ends, returning the byte count.
    pub fn read_available(file: &File, mut off: u64, dst: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < dst.len() {
            match file.seek_read(&mut dst[filled..], off) {
                Ok(0) => break,
                Ok(read) => {
                    filled += read;
                    off += read as u64;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }

    /// Writes all bytes at offset using Windows seek_write semantics.
    pub fn write_all(file: &File, mut off: u64, mut src: &[u8]) -> io::Result<()> {
        while !src.is_empty() {
            let written = file.seek_write(src, off)?;
            if written == 0 {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "seek_write wrote zero bytes",
                ));
            }
            src = &src[written..];
            off += written as u64;
        }
        Ok(())
    }
}

/// File-backed medium sharing one handle through `Arc<File>`.
#[derive(Clone)]
pub struct StdFileIo {
    inner: Arc<File>,
}

impl StdFileIo {
    /// Wraps an already opened file.
    pub fn new(file: File) -> Self {
        Self {
            inner: Arc::new(file),
        }
    }

    /// Opens a file for read-write access, creating it when `create` is set.
    pub fn open(path: impl AsRef<Path>, create: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(path)
            .map_err(SlotError::from)?;
        Ok(Self::new(file))
    }

    fn file(&self) -> &File {
        &self.inner
    }

    #[cfg(unix)]
    fn read_available(&self, off: u64, dst: &mut [u8]) -> io::Result<usize> {
        stdio_unix::read_available(self.file(), off, dst)
    }

    #[cfg(windows)]
    fn read_available(&self, off: u64, dst: &mut [u8]) -> io::Result<usize> {
        stdio_win::read_available(self.file(), off, dst)
    }

    #[cfg(unix)]
    fn write_all(&self, off: u64, src: &[u8]) -> io::Result<()> {
        stdio_unix::write_all(self.file(), off, src)
    }

    #[cfg(windows)]
    fn write_all(&self, off: u64, src: &[u8]) -> io::Result<()> {
        stdio_win::write_all(self.file(), off, src)
    }

    #[cfg(not(any(unix, windows)))]
    fn read_available(&self, _off: u64, _dst: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "StdFileIo unsupported on this platform",
        ))
    }

    #[cfg(not(any(unix, windows)))]
    fn write_all(&self, _off: u64, _src: &[u8]) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "StdFileIo unsupported on this platform",
        ))
    }
}

impl ByteSource for StdFileIo {
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<usize> {
        self.read_available(off, dst).map_err(SlotError::from)
    }
}

impl Medium for StdFileIo {
    fn write_at(&self, off: u64, src: &[u8]) -> Result<()> {
        self.write_all(off, src).map_err(SlotError::from)
    }

    fn sync_all(&self) -> Result<()> {
        io_test_log!("[io.sync_all] start");
        self.file().sync_all().map_err(SlotError::from)
    }

    fn len(&self) -> Result<u64> {
        Ok(self.file().metadata().map_err(SlotError::from)?.len())
    }
}

/// Growable in-memory medium.
#[derive(Default)]
pub struct MemIo {
    bytes: RwLock<Vec<u8>>,
}

impl MemIo {
    /// Creates an empty medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium holding a copy of `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: RwLock::new(bytes.into()),
        }
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }
}

impl ByteSource for MemIo {
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<usize> {
        self.bytes.read().read_at(off, dst)
    }
}

impl Medium for MemIo {
    fn write_at(&self, off: u64, src: &[u8]) -> Result<()> {
        let start =
            usize::try_from(off).map_err(|_| SlotError::Invalid("offset exceeds address space"))?;
        let end = start
            .checked_add(src.len())
            .ok_or(SlotError::Invalid("write offset overflow"))?;
        let mut bytes = self.bytes.write();
        if bytes.len() < end {
            bytes.resize(end, 0);
        }
        bytes[start..end].copy_from_slice(src);
        Ok(())
    }

    fn sync_all(&self) -> Result<()> {
        Ok(())
    }

    fn len(&self) -> Result<u64> {
        Ok(self.bytes.read().len() as u64)
    }
}
