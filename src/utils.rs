//! Utility functions that may be helpful for implementing
//! and testing MapReduce.
//!

use std::string::FromUtf8Error;

use bytes::Bytes;

use crate::KeyValue;

/// Read an entire [`Bytes`] slice into a [`String`].
///
/// Note that the entire slice will be read into the string.
/// It is the caller's responsibility to ensure the slice is
/// of the correct length.
///
/// Returns an error if the slice contains invalid UTF-8.
pub fn string_from_bytes(buf: Bytes) -> Result<String, FromUtf8Error> {
    String::from_utf8(buf.as_ref().into())
}

/// Splits `content` into lines and each non-empty line into
/// whitespace-delimited tokens, pairing every token with `1`.
pub fn tokens_with_unit_count(content: &str) -> Vec<KeyValue> {
    content
        .lines()
        .flat_map(str::split_whitespace)
        .map(|token| KeyValue::new(token, 1))
        .collect()
}

/// Sums `values`, wrapping on overflow like an accumulating counter.
#[inline]
pub fn sum(values: &[u64]) -> u64 {
    values.iter().fold(0, |acc, v| acc.wrapping_add(*v))
}
