#![forbid(unsafe_code)]
//! Fixed-offset little-endian helpers shared by the record codecs.

pub mod le {
    //! Little-endian field access at known offsets.

    use crate::types::{Index, INDEX_LEN};

    const U32_LEN: usize = core::mem::size_of::<u32>();

    /// Writes `v` low byte first into the first four bytes of `dst`.
    pub fn put_u32_le(dst: &mut [u8], v: u32) {
        assert!(dst.len() >= U32_LEN, "destination too small");
        dst[..U32_LEN].copy_from_slice(&v.to_le_bytes());
    }

    /// Reads a little-endian u32 from the first four bytes of `src`.
    pub fn get_u32_le(src: &[u8]) -> u32 {
        let head = src
            .get(..U32_LEN)
            .unwrap_or_else(|| panic!("u32 source shorter than 4 bytes (have {})", src.len()));
        let bytes: [u8; U32_LEN] = head.try_into().unwrap();
        u32::from_le_bytes(bytes)
    }

    /// Writes an index at the start of `dst`.
    pub fn put_index(dst: &mut [u8], index: Index) {
        assert!(dst.len() >= INDEX_LEN, "destination too small");
        dst[..INDEX_LEN].copy_from_slice(&index.to_le_bytes());
    }

    /// Reads an index from the start of `src`.
    pub fn get_index(src: &[u8]) -> Index {
        Index(get_u32_le(src))
    }
}

pub mod flag {
    //! Single-byte boolean flags.

    /// Byte written for a set flag.
    pub const SET: u8 = 1;
    /// Byte written for a cleared flag.
    pub const CLEAR: u8 = 0;

    /// Encodes a flag as exactly 1 or 0.
    pub const fn encode(v: bool) -> u8 {
        if v {
            SET
        } else {
            CLEAR
        }
    }

    /// Fill byte of windows no record was ever written to.
    pub const UNWRITTEN: u8 = 0xFF;

    /// Only the byte 1 reads as set; every other pattern reads as cleared.
    pub const fn decode(byte: u8) -> bool {
        byte == SET
    }
}
