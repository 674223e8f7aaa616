// Copyright 2025 Justin Hu
//
// This file is part of Far Horizons.
//
// Far Horizons is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Far Horizons is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with Far Horizons. If not, see <https://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Reading and writing the legacy fixed-layout save files
//!
//! The layout of each record lives with the record type in [`crate::record`];
//! this module only knows how to walk a byte buffer in a configured byte
//! order and how to report running out of bytes.

use num_traits::{FromBytes, ToBytes};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use thiserror::Error;

/// Byte order of the integers in a save file
///
/// This is an installation setting; the files themselves don't say which one they use.
#[derive(
    Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ByteOrder {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

/// Errors from decoding a save file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Not enough bytes left for the record being decoded
    #[error(
        "truncated {record} record #{index}: needed {needed} bytes at offset {offset}, only {available} available"
    )]
    TruncatedRecord {
        /// Which kind of record
        record: &'static str,
        /// Position of the record within its array (0 for headers)
        index: usize,
        /// Byte offset the record starts at
        offset: usize,
        /// Size of the record
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },
    /// A record count embedded in a header was negative
    #[error("invalid {record} count {count}")]
    InvalidCount {
        /// Which kind of record the count is for
        record: &'static str,
        /// The count as stored
        count: i32,
    },
}

/// A fixed-size record in a save file
pub trait Record: Sized {
    /// Name used in error messages
    const NAME: &'static str;
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode the record's fields; the reader has already checked that `SIZE` bytes remain
    fn read_fields(reader: &mut Reader<'_>) -> Self;

    /// Encode the record's fields, writing exactly `SIZE` bytes
    fn write_fields(&self, writer: &mut Writer);

    /// Decode a single record from the start of a buffer
    fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self, CodecError> {
        Reader::new(bytes, order).record(0)
    }

    /// Encode a single record into a fresh buffer
    fn encode(&self, order: ByteOrder) -> Vec<u8> {
        let mut writer = Writer::with_capacity(order, Self::SIZE);
        writer.record(self);
        writer.into_bytes()
    }
}

/// Cursor over a save file
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    /// Start reading from the beginning of some bytes
    pub fn new(bytes: &'a [u8], order: ByteOrder) -> Self {
        Self {
            bytes,
            offset: 0,
            order,
        }
    }

    /// How many bytes haven't been read yet
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Everything not yet read, consuming it
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.offset..];
        self.offset = self.bytes.len();
        rest
    }

    /// Decode one record, failing if the buffer ends before the record does
    pub fn record<R: Record>(&mut self, index: usize) -> Result<R, CodecError> {
        if self.remaining() < R::SIZE {
            return Err(CodecError::TruncatedRecord {
                record: R::NAME,
                index,
                offset: self.offset,
                needed: R::SIZE,
                available: self.remaining(),
            });
        }
        let start = self.offset;
        let record = R::read_fields(self);
        debug_assert_eq!(self.offset - start, R::SIZE, "{} layout size", R::NAME);
        Ok(record)
    }

    /// Decode `count` consecutive records
    pub fn records<R: Record>(&mut self, count: usize) -> Result<Vec<R>, CodecError> {
        (0..count).map(|index| self.record(index)).collect()
    }

    /// Read a record count that precedes an array
    pub fn count(&mut self, record: &'static str) -> Result<usize, CodecError> {
        if self.remaining() < 4 {
            return Err(CodecError::TruncatedRecord {
                record,
                index: 0,
                offset: self.offset,
                needed: 4,
                available: self.remaining(),
            });
        }
        let count = self.i32();
        usize::try_from(count).map_err(|_| CodecError::InvalidCount { record, count })
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0_u8; N];
        out.copy_from_slice(&self.bytes[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    fn int<T: FromBytes<Bytes = [u8; N]>, const N: usize>(&mut self) -> T {
        let bytes = self.take::<N>();
        match self.order {
            ByteOrder::Little => T::from_le_bytes(&bytes),
            ByteOrder::Big => T::from_be_bytes(&bytes),
        }
    }

    pub(crate) fn u8(&mut self) -> u8 {
        self.int::<u8, 1>()
    }

    pub(crate) fn i16(&mut self) -> i16 {
        self.int::<i16, 2>()
    }

    pub(crate) fn i32(&mut self) -> i32 {
        self.int::<i32, 4>()
    }

    pub(crate) fn u32(&mut self) -> u32 {
        self.int::<u32, 4>()
    }

    pub(crate) fn bytes<const N: usize>(&mut self) -> [u8; N] {
        self.take::<N>()
    }

    pub(crate) fn i16s<const N: usize>(&mut self) -> [i16; N] {
        std::array::from_fn(|_| self.i16())
    }

    pub(crate) fn i32s<const N: usize>(&mut self) -> [i32; N] {
        std::array::from_fn(|_| self.i32())
    }

    pub(crate) fn u32s<const N: usize>(&mut self) -> [u32; N] {
        std::array::from_fn(|_| self.u32())
    }
}

/// Growing output buffer for a save file
pub struct Writer {
    bytes: Vec<u8>,
    order: ByteOrder,
}

impl Writer {
    /// Start an empty buffer
    pub fn new(order: ByteOrder) -> Self {
        Self::with_capacity(order, 0)
    }

    /// Start an empty buffer with room for some bytes
    pub fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            order,
        }
    }

    /// Append a record
    pub fn record<R: Record>(&mut self, record: &R) {
        let start = self.bytes.len();
        record.write_fields(self);
        debug_assert_eq!(self.bytes.len() - start, R::SIZE, "{} layout size", R::NAME);
    }

    /// Append a count followed by the records it counts
    pub fn counted<R: Record>(&mut self, records: &[R]) {
        self.i32(records.len() as i32);
        for record in records {
            self.record(record);
        }
    }

    /// Append raw bytes
    pub fn raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Finish writing
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn int<T: ToBytes<Bytes = [u8; N]>, const N: usize>(&mut self, value: T) {
        let bytes = match self.order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.bytes.extend_from_slice(&bytes);
    }

    pub(crate) fn u8(&mut self, value: u8) {
        self.int::<u8, 1>(value);
    }

    pub(crate) fn i16(&mut self, value: i16) {
        self.int::<i16, 2>(value);
    }

    pub(crate) fn i32(&mut self, value: i32) {
        self.int::<i32, 4>(value);
    }

    pub(crate) fn u32(&mut self, value: u32) {
        self.int::<u32, 4>(value);
    }

    pub(crate) fn i16s(&mut self, values: &[i16]) {
        for &value in values {
            self.i16(value);
        }
    }

    pub(crate) fn i32s(&mut self, values: &[i32]) {
        for &value in values {
            self.i32(value);
        }
    }

    pub(crate) fn u32s(&mut self, values: &[u32]) {
        for &value in values {
            self.u32(value);
        }
    }
}

/// A 32-byte NUL-padded name, kept byte for byte
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct FixedName(pub [u8; FixedName::LEN]);

impl FixedName {
    /// Width of a name field
    pub const LEN: usize = 32;

    /// Pack a name, truncating it to leave room for the terminating NUL
    pub fn new(name: &str) -> Self {
        let mut bytes = [0_u8; Self::LEN];
        let mut len = name.len().min(Self::LEN - 1);
        while !name.is_char_boundary(len) {
            len -= 1;
        }
        bytes[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self(bytes)
    }

    /// The text before the first NUL
    pub fn as_string(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(Self::LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl Default for FixedName {
    fn default() -> Self {
        Self([0; Self::LEN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_order_changes_integer_layout() {
        let mut little = Writer::new(ByteOrder::Little);
        little.i32(0x0102_0304);
        let mut big = Writer::new(ByteOrder::Big);
        big.i32(0x0102_0304);
        assert_eq!(little.into_bytes(), vec![4, 3, 2, 1]);
        assert_eq!(big.into_bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn negative_count_is_rejected() {
        let bytes = (-3_i32).to_le_bytes();
        let mut reader = Reader::new(&bytes, ByteOrder::Little);
        assert_eq!(
            reader.count("star"),
            Err(CodecError::InvalidCount {
                record: "star",
                count: -3
            })
        );
    }

    #[test]
    fn short_count_is_truncated() {
        let mut reader = Reader::new(&[1, 0], ByteOrder::Little);
        assert!(matches!(
            reader.count("planet"),
            Err(CodecError::TruncatedRecord { needed: 4, available: 2, .. })
        ));
    }

    #[test]
    fn fixed_name_truncates_on_char_boundary() {
        let long = "é".repeat(20);
        let name = FixedName::new(&long);
        assert_eq!(name.0[31], 0);
        assert_eq!(name.as_string(), "é".repeat(15));
    }

    #[test]
    fn fixed_name_stops_at_nul() {
        let mut bytes = [0_u8; 32];
        bytes[..5].copy_from_slice(b"Terra");
        bytes[6..9].copy_from_slice(b"xyz");
        assert_eq!(FixedName(bytes).as_string(), "Terra");
    }
}
