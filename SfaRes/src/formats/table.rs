//! `.TAB` offset tables paired with `.BIN` blobs
//!
//! A TAB file is a flat array of big-endian offsets into its BIN file. Entry
//! `n` spans from offset `n` to offset `n + 1`, so the last offset is a
//! terminator rather than an entry of its own.

use std::io::Cursor;
use std::ops::Range;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Width of each offset in a TAB file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetWidth {
    U16,
    U32,
}

impl OffsetWidth {
    fn bytes(self) -> usize {
        match self {
            OffsetWidth::U16 => 2,
            OffsetWidth::U32 => 4,
        }
    }
}

/// A parsed TAB file.
#[derive(Debug, Clone)]
pub struct OffsetTable {
    name: &'static str,
    entries: Vec<u32>,
}

impl OffsetTable {
    /// Parse a TAB file. A trailing partial entry is ignored.
    pub fn parse(name: &'static str, data: &[u8], width: OffsetWidth) -> Result<Self> {
        let count = data.len() / width.bytes();
        let mut cursor = Cursor::new(data);
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let value = match width {
                OffsetWidth::U16 => u32::from(cursor.read_u16::<BigEndian>()?),
                OffsetWidth::U32 => cursor.read_u32::<BigEndian>()?,
            };
            entries.push(value);
        }
        Ok(Self { name, entries })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of raw offsets, including the terminator.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw (unmasked) value at `index`.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.entries.get(index).copied()
    }

    /// Byte range of entry `index`, with both offsets masked by `mask`.
    ///
    /// Returns `None` when the entry or its terminator is missing.
    pub fn span(&self, index: usize, mask: u32) -> Option<Range<usize>> {
        let start = self.get(index)? & mask;
        let end = self.get(index.checked_add(1)?)? & mask;
        Some(start as usize..end as usize)
    }

    /// Slice entry `index` out of `bin`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedTable`] if the offsets run backwards or past
    /// the end of `bin`.
    pub fn slice<'a>(&self, bin: &'a [u8], range: Range<usize>) -> Result<&'a [u8]> {
        if range.end < range.start {
            return Err(Error::MalformedTable {
                name: self.name,
                message: format!("entry ends at 0x{:x} before it starts at 0x{:x}", range.end, range.start),
            });
        }
        bin.get(range.clone()).ok_or_else(|| Error::MalformedTable {
            name: self.name,
            message: format!(
                "entry 0x{:x}..0x{:x} exceeds data of {} bytes",
                range.start,
                range.end,
                bin.len()
            ),
        })
    }
}
