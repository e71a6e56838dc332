//! Low-level primitives for building the record stores.
//!
//! Includes little-endian field helpers and positioned I/O over files and
//! in-memory buffers.

/// Byte-level utilities and encoding/decoding.
///
/// Fixed-offset little-endian field access and flag bytes.
pub mod bytes;

/// I/O abstractions and utilities.
///
/// Random-access byte sources and writable media.
pub mod io;
