//! Container writers
//!
//! Produce buffers that [`super::decode_container`] unwraps back to the
//! original payload. Reserved header words are written as zero.

use byteorder::{BigEndian, WriteBytesExt};

use super::{ContainerKind, DirHeader, LzoHeader, ZlbHeader};
use crate::compression::{self, lzo};
use crate::error::Result;

/// Wrap `payload` in a `ZLB\0` container.
///
/// # Errors
/// Returns an error if zlib compression fails.
pub fn wrap_zlb(payload: &[u8]) -> Result<Vec<u8>> {
    let stream = compression::deflate(payload)?;

    let mut out = Vec::with_capacity(ZlbHeader::SIZE + stream.len());
    out.write_u32::<BigEndian>(ContainerKind::ZLB_TAG)?;
    out.write_u32::<BigEndian>(0)?;
    out.write_u32::<BigEndian>(0)?;
    out.write_u32::<BigEndian>(stream.len() as u32)?;
    out.extend_from_slice(&stream);
    Ok(out)
}

/// Wrap `payload` in an uncompressed `DIRn` container.
pub fn wrap_dir(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; DirHeader::DATA_OFFSET];
    out[..4].copy_from_slice(&ContainerKind::DIR_TAG.to_be_bytes());
    out[DirHeader::SIZE_OFFSET..DirHeader::SIZE_OFFSET + 4]
        .copy_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Wrap `payload` in an `LZOn` container holding a literal-only stream.
pub fn wrap_lzo(payload: &[u8]) -> Vec<u8> {
    let stream = lzo::store(payload);

    let mut out = vec![0u8; LzoHeader::SIZE];
    out[..4].copy_from_slice(&ContainerKind::LZO_TAG.to_be_bytes());
    out[LzoHeader::SIZE_OFFSET..LzoHeader::SIZE_OFFSET + 4]
        .copy_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&stream);
    out
}
