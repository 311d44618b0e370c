//! Byte formats of the intermediate and output artifacts.
//!
//! An intermediate artifact is a `u64` pair count followed by, for every
//! pair, a `u32` key length, the UTF-8 key and the `u64` value. An output
//! artifact is a plain run of `u64` records. All integers are little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::CodecError;
use crate::utils::string_from_bytes;
use crate::KeyValue;

/// Width of one output record.
pub const RECORD_WIDTH: usize = 8;

/// Serializes `pairs` in order.
pub fn encode_pairs(pairs: &[KeyValue]) -> Result<Bytes, CodecError> {
    let body: usize = pairs.iter().map(|kv| 4 + kv.key.len() + 8).sum();
    let mut buf = BytesMut::with_capacity(8 + body);
    buf.put_u64_le(pairs.len() as u64);
    for kv in pairs {
        let len = u32::try_from(kv.key.len())
            .map_err(|_| CodecError::Encoding { len: kv.key.len() })?;
        buf.put_u32_le(len);
        buf.put_slice(kv.key.as_bytes());
        buf.put_u64_le(kv.value);
    }
    Ok(buf.freeze())
}

/// Inverse of [`encode_pairs`].
pub fn decode_pairs(mut buf: &[u8]) -> Result<Vec<KeyValue>, CodecError> {
    ensure_remaining(buf, 8)?;
    let count = buf.get_u64_le();
    // The count comes from the buffer itself, so never trust it for the
    // allocation size.
    let mut pairs = Vec::with_capacity(usize::try_from(count).unwrap_or(0).min(buf.len() / 12));
    for _ in 0..count {
        ensure_remaining(buf, 4)?;
        let len = buf.get_u32_le() as usize;
        ensure_remaining(buf, len)?;
        let key = string_from_bytes(buf.copy_to_bytes(len))?;
        ensure_remaining(buf, 8)?;
        let value = buf.get_u64_le();
        pairs.push(KeyValue { key, value });
    }
    if buf.has_remaining() {
        return Err(CodecError::TrailingBytes(buf.remaining()));
    }
    Ok(pairs)
}

/// Serializes reduced values as fixed-width records.
pub fn encode_records(records: &[u64]) -> Bytes {
    let mut buf = BytesMut::with_capacity(records.len() * RECORD_WIDTH);
    for record in records {
        buf.put_u64_le(*record);
    }
    buf.freeze()
}

/// Inverse of [`encode_records`].
pub fn decode_records(mut buf: &[u8]) -> Result<Vec<u64>, CodecError> {
    if buf.len() % RECORD_WIDTH != 0 {
        return Err(CodecError::Misaligned(buf.len()));
    }
    let mut records = Vec::with_capacity(buf.len() / RECORD_WIDTH);
    while buf.has_remaining() {
        records.push(buf.get_u64_le());
    }
    Ok(records)
}

fn ensure_remaining(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if buf.remaining() < needed {
        return Err(CodecError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}
