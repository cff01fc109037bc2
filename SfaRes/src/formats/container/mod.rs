//! Resource containers: `ZLB\0`, `DIR*` and `LZOn`
//!
//! Every resource fetched from the game disc may be wrapped in one of three
//! containers identified by a big-endian four-character tag at offset 0.
//! [`decode_container`] strips exactly one layer; [`decode_nested`] keeps
//! stripping until the data no longer carries a recognized tag.
//!
//! Data without a recognized tag is not an error: it is returned unchanged
//! after a single warning, since plenty of resources are stored raw.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::compression::{self, lzo};
use crate::error::{Error, Result};

pub mod header;
pub mod writer;

pub use header::{DirHeader, LzoHeader, ZlbHeader};
pub use writer::{wrap_dir, wrap_lzo, wrap_zlb};

/// Default cap for [`decode_nested`].
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 8;

/// The wrapper kinds a resource can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContainerKind {
    /// `ZLB\0`: zlib stream after a 16-byte header.
    Zlb,
    /// `DIR?`: uncompressed region at 0x20 (the fourth tag byte is ignored).
    Dir,
    /// `LZOn`: LZO token stream after a 16-byte header.
    Lzo,
}

impl ContainerKind {
    pub const ZLB_TAG: u32 = fourcc(*b"ZLB\0");
    pub const DIR_TAG: u32 = fourcc(*b"DIRn");
    pub const LZO_TAG: u32 = fourcc(*b"LZOn");

    /// Identify the container tag at the start of `data`.
    ///
    /// Buffers shorter than a tag are never containers.
    pub fn identify(data: &[u8]) -> Option<Self> {
        let tag = read_tag(data)?;
        match tag {
            Self::ZLB_TAG => Some(Self::Zlb),
            Self::LZO_TAG => Some(Self::Lzo),
            t if t >> 8 == Self::DIR_TAG >> 8 => Some(Self::Dir),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Zlb => "ZLB",
            Self::Dir => "DIR",
            Self::Lzo => "LZOn",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn fourcc(tag: [u8; 4]) -> u32 {
    u32::from_be_bytes(tag)
}

fn read_tag(data: &[u8]) -> Option<u32> {
    let tag: [u8; 4] = data.get(..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(tag))
}

/// Strip one container layer from `data`.
///
/// Unrecognized data is returned borrowed and unchanged after one warning.
///
/// # Errors
/// Returns [`Error::MalformedContainer`] for a recognized tag with an invalid
/// header, or a decompression error if the payload is corrupt.
pub fn decode_container(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    match ContainerKind::identify(data) {
        Some(kind) => decode_kind(kind, data).map(Cow::Owned),
        None => {
            match read_tag(data) {
                Some(tag) => tracing::warn!("Invalid magic identifier 0x{tag:08x}"),
                None => tracing::warn!("Buffer of {} bytes too short for a container tag", data.len()),
            }
            Ok(Cow::Borrowed(data))
        }
    }
}

/// Strip container layers until the data has no recognized tag.
///
/// # Errors
/// Returns [`Error::ContainerNestingTooDeep`] after `max_depth` recognized
/// layers, plus any error [`decode_container`] can return.
pub fn decode_nested(data: &[u8], max_depth: usize) -> Result<Cow<'_, [u8]>> {
    let mut current = Cow::Borrowed(data);
    let mut depth = 0;

    while let Some(kind) = ContainerKind::identify(&current) {
        if depth == max_depth {
            return Err(Error::ContainerNestingTooDeep { depth: max_depth });
        }
        tracing::debug!("Unwrapping {kind} layer {depth} ({} bytes)", current.len());
        current = Cow::Owned(decode_kind(kind, &current)?);
        depth += 1;
    }

    Ok(current)
}

/// Decode an `LZOn` container whose header starts at `src_offset`.
///
/// Used for LZO data nested behind another header, where the tag at offset 0
/// belongs to the outer wrapper.
pub fn decode_lzo_at(data: &[u8], src_offset: usize) -> Result<Vec<u8>> {
    let header = LzoHeader::read_at(data, src_offset)?;
    lzo::decompress(header.payload(data)?, header.uncompressed_size as usize)
}

fn decode_kind(kind: ContainerKind, data: &[u8]) -> Result<Vec<u8>> {
    match kind {
        ContainerKind::Zlb => {
            let header = ZlbHeader::read(data)?;
            compression::inflate(header.payload(data)?)
        }
        ContainerKind::Dir => {
            let header = DirHeader::read(data)?;
            Ok(header.payload(data)?.to_vec())
        }
        ContainerKind::Lzo => decode_lzo_at(data, 0),
    }
}
