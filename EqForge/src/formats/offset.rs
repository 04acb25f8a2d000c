//! Offset-array serialization
//!
//! Model files start with a fixed-size header of `(count, offset)` pairs that
//! point into a trailing data region. Layout happens in two passes:
//!
//! 1. Reserve the header as zero bytes ([`OffsetBuilder::new`]). Its size is
//!    a static function of which optional fields are present.
//! 2. Append each variable-length payload in header order, collecting the
//!    returned [`OffsetArray`]s.
//! 3. Serialize the header with those arrays and backfill it in place
//!    ([`OffsetBuilder::finish`]).
//!
//! Offsets are absolute: they count from the first byte of the object, not
//! from the end of the header.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::common::ToBytes;
use crate::error::{Error, Result};

/// A header field pair locating an array in the data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetArray {
    pub count: u32,
    pub offset: u32,
}

impl OffsetArray {
    pub const EMPTY: Self = Self { count: 0, offset: 0 };
}

impl ToBytes for OffsetArray {
    const SIZE: usize = 8;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
    }
}

/// A growable little-endian byte buffer.
#[derive(Debug, Default, Clone)]
pub struct Section {
    pub data: Vec<u8>,
}

impl Section {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.data.len() % alignment)) % alignment;
        self.data.extend(std::iter::repeat_n(0u8, padding));
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.data.extend(std::iter::repeat_n(0u8, count));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write any fixed-layout value.
    pub fn write<T: ToBytes>(&mut self, value: &T) {
        value.write_bytes(&mut self.data);
    }

    /// Write a fixed-width, NUL padded string field, truncating if needed.
    pub fn write_fixed_str(&mut self, value: &str, width: usize) {
        let bytes = value.as_bytes();
        let used = bytes.len().min(width.saturating_sub(1));
        self.data.extend_from_slice(&bytes[..used]);
        self.write_zeros(width - used);
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Two-pass builder for a header followed by offset-addressed arrays.
#[derive(Debug)]
pub struct OffsetBuilder {
    body: Section,
    header_size: usize,
    alignment: usize,
}

impl OffsetBuilder {
    /// Reserve `header_size` zero bytes for the header.
    #[must_use]
    pub fn new(header_size: usize) -> Self {
        let mut body = Section::with_capacity(header_size * 4);
        body.write_zeros(header_size);
        Self {
            body,
            header_size,
            alignment: 1,
        }
    }

    /// Pad to `alignment` before each non-empty array.
    #[must_use]
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment.max(1);
        self
    }

    #[must_use]
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Current size of header plus data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Append `count` pre-encoded elements.
    pub fn push_raw(&mut self, count: usize, bytes: &[u8]) -> Result<OffsetArray> {
        if count == 0 {
            return Ok(OffsetArray::EMPTY);
        }
        self.body.align(self.alignment);
        let offset = u32::try_from(self.body.len()).map_err(|_| Error::OffsetOverflow(self.body.len()))?;
        let count = u32::try_from(count).map_err(|_| Error::OffsetOverflow(count))?;
        self.body.write_bytes(bytes);
        Ok(OffsetArray { count, offset })
    }

    /// Append an array of fixed-layout elements.
    pub fn push_array<T: ToBytes>(&mut self, items: &[T]) -> Result<OffsetArray> {
        let mut bytes = Vec::with_capacity(items.len() * T::SIZE);
        for item in items {
            item.write_bytes(&mut bytes);
        }
        self.push_raw(items.len(), &bytes)
    }

    /// Append a NUL terminated string; the count includes the terminator.
    pub fn push_string(&mut self, value: &str) -> Result<OffsetArray> {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        self.push_raw(bytes.len(), &bytes)
    }

    /// Backfill the reserved region with `header` and return the whole object.
    pub fn finish(mut self, header: &[u8]) -> Result<Vec<u8>> {
        if header.len() != self.header_size {
            return Err(Error::HeaderSizeMismatch {
                reserved: self.header_size,
                actual: header.len(),
            });
        }
        self.body.data[..self.header_size].copy_from_slice(header);
        Ok(self.body.into_bytes())
    }
}
