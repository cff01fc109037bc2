//! Fixed-layout container headers (all fields big-endian)

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::ContainerKind;
use crate::error::{Error, Result};

/// Header of a `ZLB\0` container.
///
/// ```text
/// 0x0  magic "ZLB\0"
/// 0x4  reserved
/// 0x8  reserved
/// 0xC  zlib stream size
/// 0x10 zlib stream
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlbHeader {
    pub magic: u32,
    pub unk4: u32,
    pub unk8: u32,
    pub size: u32,
}

impl ZlbHeader {
    pub const SIZE: usize = 16;

    /// Read the header at the start of `data`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedContainer`] if the buffer is too short or the
    /// magic is not `ZLB\0`.
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let truncated = |_| Error::malformed(ContainerKind::Zlb, "truncated header");

        let header = Self {
            magic: cursor.read_u32::<BigEndian>().map_err(truncated)?,
            unk4: cursor.read_u32::<BigEndian>().map_err(truncated)?,
            unk8: cursor.read_u32::<BigEndian>().map_err(truncated)?,
            size: cursor.read_u32::<BigEndian>().map_err(truncated)?,
        };

        if header.magic != ContainerKind::ZLB_TAG {
            return Err(Error::malformed(
                ContainerKind::Zlb,
                format!("invalid magic identifier 0x{:08x}", header.magic),
            ));
        }
        Ok(header)
    }

    /// The zlib stream described by this header.
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        region(ContainerKind::Zlb, data, Self::SIZE, self.size)
    }
}

/// Header of a `DIR` container: a sized region at a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirHeader {
    pub tag: u32,
    pub size: u32,
}

impl DirHeader {
    pub const SIZE_OFFSET: usize = 0x8;
    pub const DATA_OFFSET: usize = 0x20;

    pub fn read(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let truncated = |_| Error::malformed(ContainerKind::Dir, "truncated header");

        let tag = cursor.read_u32::<BigEndian>().map_err(truncated)?;
        cursor.set_position(Self::SIZE_OFFSET as u64);
        let size = cursor.read_u32::<BigEndian>().map_err(truncated)?;
        Ok(Self { tag, size })
    }

    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        region(ContainerKind::Dir, data, Self::DATA_OFFSET, self.size)
    }
}

/// Header of an `LZOn` container located at `offset` within its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzoHeader {
    pub offset: usize,
    pub uncompressed_size: u32,
}

impl LzoHeader {
    pub const SIZE_OFFSET: usize = 0x8;
    pub const SIZE: usize = 0x10;

    pub fn read_at(data: &[u8], offset: usize) -> Result<Self> {
        let truncated = || Error::malformed(ContainerKind::Lzo, format!("truncated header at 0x{offset:x}"));
        let field = offset.checked_add(Self::SIZE_OFFSET).ok_or_else(truncated)?;
        let bytes = data
            .get(field..field.saturating_add(4))
            .filter(|b| b.len() == 4)
            .ok_or_else(truncated)?;
        let mut cursor = Cursor::new(bytes);
        let uncompressed_size = cursor.read_u32::<BigEndian>()?;
        Ok(Self {
            offset,
            uncompressed_size,
        })
    }

    /// The token stream, running to the end of the buffer.
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        self.offset
            .checked_add(Self::SIZE)
            .and_then(|start| data.get(start..))
            .ok_or_else(|| Error::malformed(ContainerKind::Lzo, "truncated header"))
    }
}

fn region(kind: ContainerKind, data: &[u8], start: usize, size: u32) -> Result<&[u8]> {
    let end = start.checked_add(size as usize);
    end.and_then(|end| data.get(start..end)).ok_or_else(|| {
        Error::malformed(
            kind,
            format!(
                "payload of {size} bytes at 0x{start:x} exceeds buffer of {} bytes",
                data.len()
            ),
        )
    })
}
