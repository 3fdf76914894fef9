//! Fixed-width record layout helpers.
//!
//! Text fields occupy a fixed number of bytes and are NUL padded, so one byte
//! of every text field is reserved for the terminator. Integers are stored as
//! little-endian `i32`.

use crate::error::StorageError;

/// Turns one item into exactly `RECORD_SIZE` bytes and back.
pub trait RecordCodec {
    type Item;

    const RECORD_SIZE: usize;

    fn encode(&self, item: &Self::Item, buf: &mut [u8]) -> Result<(), StorageError>;

    fn decode(&self, buf: &[u8]) -> Result<Self::Item, StorageError>;
}

pub const INT_WIDTH: usize = 4;

/// Longest text a field of `width` bytes can hold.
pub const fn text_capacity(width: usize) -> usize {
    width - 1
}

pub fn put_text(
    buf: &mut [u8],
    offset: usize,
    width: usize,
    field: &'static str,
    bytes: &[u8],
) -> Result<(), StorageError> {
    let max = text_capacity(width);
    if bytes.len() > max {
        return Err(StorageError::FieldTooLong {
            field,
            len: bytes.len(),
            max,
        });
    }
    if bytes.contains(&0) {
        return Err(StorageError::FieldContainsNul { field });
    }

    let slot = &mut buf[offset..offset + width];
    slot.fill(0);
    slot[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Bytes of a text field up to the first NUL.
pub fn get_text(buf: &[u8], offset: usize, width: usize) -> &[u8] {
    let slot = &buf[offset..offset + width];
    let end = slot.iter().position(|&b| b == 0).unwrap_or(width);
    &slot[..end]
}

pub fn put_i32(buf: &mut [u8], offset: usize, value: i32) {
    buf[offset..offset + INT_WIDTH].copy_from_slice(&value.to_le_bytes());
}

pub fn get_i32(buf: &[u8], offset: usize) -> i32 {
    let mut raw = [0u8; INT_WIDTH];
    raw.copy_from_slice(&buf[offset..offset + INT_WIDTH]);
    i32::from_le_bytes(raw)
}
