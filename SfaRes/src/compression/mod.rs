//! Compression backends for resource containers

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{Error, Result};

pub mod lzo;

/// Inflate a zlib stream.
///
/// Bytes following the end of the stream are ignored.
///
/// # Errors
/// Returns [`Error::ZlibDecompressionFailed`] if the stream is corrupt or truncated.
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::with_capacity(compressed.len().saturating_mul(2));

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::ZlibDecompressionFailed {
            message: e.to_string(),
        })?;

    Ok(decompressed)
}

/// Deflate data into a zlib stream at the default level.
///
/// # Errors
/// Returns an error if compression fails.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::ZlibCompressionFailed {
            message: e.to_string(),
        })?;
    encoder.finish().map_err(|e| Error::ZlibCompressionFailed {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflate_round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog ".repeat(16);
        let compressed = deflate(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(inflate(&compressed).unwrap(), data);
    }

    #[test]
    fn test_inflate_corrupt_stream() {
        let err = inflate(&[0x78, 0x9C, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap_err();
        assert!(err.is_decompression_error());
    }
}
