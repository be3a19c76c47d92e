//! Item encoding for block contents.

use super::ITEM_WIDTH;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Encode items as consecutive little-endian `i32` values.
pub fn encode_items(items: &[i32]) -> Bytes {
    let mut buf = BytesMut::with_capacity(items.len() * ITEM_WIDTH);
    for &item in items {
        buf.put_i32_le(item);
    }
    buf.freeze()
}

/// Decode every whole item in `data`.
///
/// A trailing partial item is ignored.
pub fn decode_items(mut data: &[u8]) -> Vec<i32> {
    let mut items = Vec::with_capacity(data.len() / ITEM_WIDTH);
    while data.remaining() >= ITEM_WIDTH {
        items.push(data.get_i32_le());
    }
    items
}
