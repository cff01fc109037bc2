//! LZO decompression for `LZOn` containers
//!
//! The token stream follows the LZO1X layout. Every read and every
//! back-reference is bounds-checked, and the output must land exactly on the
//! size declared by the container header.

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Distance bias of the 3-byte match that directly follows a literal run.
const M2_MAX_OFFSET: usize = 0x0800;

/// Distance bias of M4 matches.
const M4_DISTANCE_BIAS: usize = 0x4000;

/// Longest literal run that fits in the leading byte.
const MAX_LEADING_LITERALS: usize = 0xFF - 17;

/// End-of-stream marker (an M4 match with distance 0).
const END_OF_STREAM: [u8; 3] = [0x11, 0x00, 0x00];

/// Up-front allocation is capped at this multiple of the input length;
/// the declared size comes from an untrusted header.
const CAPACITY_RATIO: usize = 8;

// ============================================================================
// Decoder
// ============================================================================

/// Where the decoder resumes after the current token.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Read a token that may start a literal run.
    Literals,
    /// A literal run just ended; short tokens are 3-byte far matches.
    AfterLiterals,
    /// Decode a match token already read from the stream.
    Match(usize),
    /// The end-of-stream marker was decoded.
    Finished,
}

struct LzoDecoder<'a> {
    src: &'a [u8],
    ip: usize,
    output: Vec<u8>,
    limit: usize,
}

impl<'a> LzoDecoder<'a> {
    fn new(src: &'a [u8], output_size: usize) -> Self {
        Self {
            src,
            ip: 0,
            output: Vec::with_capacity(output_size.min(src.len().saturating_mul(CAPACITY_RATIO))),
            limit: output_size,
        }
    }

    fn byte(&mut self) -> Result<u8> {
        let b = *self.src.get(self.ip).ok_or_else(|| {
            Error::lzo(format!(
                "input exhausted at byte {} with {} of {} bytes produced",
                self.ip,
                self.output.len(),
                self.limit
            ))
        })?;
        self.ip += 1;
        Ok(b)
    }

    /// Zero bytes add 255 each; the first non-zero byte terminates the run.
    fn extended_length(&mut self, base: usize) -> Result<usize> {
        let mut length = 0usize;
        loop {
            let b = self.byte()?;
            if b != 0 {
                return Ok(length + base + b as usize);
            }
            length += 255;
        }
    }

    fn reserve(&self, count: usize) -> Result<()> {
        if self.output.len() + count > self.limit {
            return Err(Error::lzo(format!(
                "output overflow: {} + {count} bytes exceeds declared size {}",
                self.output.len(),
                self.limit
            )));
        }
        Ok(())
    }

    fn copy_literals(&mut self, count: usize) -> Result<()> {
        self.reserve(count)?;
        let end = self.ip + count;
        let literals = self.src.get(self.ip..end).ok_or_else(|| {
            Error::lzo(format!(
                "literal run of {count} bytes at {} runs past end of input",
                self.ip
            ))
        })?;
        self.output.extend_from_slice(literals);
        self.ip = end;
        Ok(())
    }

    fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 || distance > self.output.len() {
            return Err(Error::lzo(format!(
                "back-reference distance {distance} at output position {}",
                self.output.len()
            )));
        }
        self.reserve(length)?;
        // Overlapping copies repeat the most recent bytes.
        let start = self.output.len() - distance;
        for i in 0..length {
            let b = self.output[start + i];
            self.output.push(b);
        }
        Ok(())
    }

    /// Copies the 0-3 literals that trail a match.
    fn trailing_literals(&mut self, count: usize) -> Result<Step> {
        if count == 0 {
            return Ok(Step::Literals);
        }
        self.copy_literals(count)?;
        let token = self.byte()?;
        Ok(Step::Match(token as usize))
    }

    fn leading_step(&mut self) -> Result<Step> {
        let Some(&first) = self.src.first() else {
            return Ok(Step::Literals);
        };
        if first <= 17 {
            return Ok(Step::Literals);
        }
        self.ip = 1;
        let count = first as usize - 17;
        if count < 4 {
            self.trailing_literals(count)
        } else {
            self.copy_literals(count)?;
            Ok(Step::AfterLiterals)
        }
    }

    fn decode(&mut self) -> Result<()> {
        let mut step = self.leading_step()?;

        loop {
            step = match step {
                Step::Literals => {
                    let t = self.byte()? as usize;
                    if t >= 16 {
                        Step::Match(t)
                    } else {
                        let run = if t == 0 { self.extended_length(15)? } else { t };
                        self.copy_literals(run + 3)?;
                        Step::AfterLiterals
                    }
                }
                Step::AfterLiterals => {
                    let t = self.byte()? as usize;
                    if t >= 16 {
                        Step::Match(t)
                    } else {
                        let high = self.byte()? as usize;
                        let distance = 1 + M2_MAX_OFFSET + (t >> 2) + (high << 2);
                        self.copy_match(distance, 3)?;
                        self.trailing_literals(t & 3)?
                    }
                }
                Step::Match(t) => self.decode_match(t)?,
                Step::Finished => break,
            };
        }

        if self.output.len() != self.limit {
            return Err(Error::lzo(format!(
                "stream ended after {} of {} bytes",
                self.output.len(),
                self.limit
            )));
        }
        Ok(())
    }

    fn decode_match(&mut self, t: usize) -> Result<Step> {
        let (distance, length, trailing) = if t >= 64 {
            // M2: 3-8 bytes within 2 KiB
            let high = self.byte()? as usize;
            (1 + ((t >> 2) & 7) + (high << 3), (t >> 5) + 1, t & 3)
        } else if t >= 32 {
            // M3: within 16 KiB
            let run = match t & 31 {
                0 => self.extended_length(31)?,
                n => n,
            };
            let low = self.byte()? as usize;
            let high = self.byte()? as usize;
            (1 + (low >> 2) + (high << 6), run + 2, low & 3)
        } else if t >= 16 {
            // M4: 16-48 KiB, distance 0 ends the stream
            let far = (t & 8) << 11;
            let run = match t & 7 {
                0 => self.extended_length(7)?,
                n => n,
            };
            let low = self.byte()? as usize;
            let high = self.byte()? as usize;
            let distance = far + (low >> 2) + (high << 6);
            if distance == 0 {
                return Ok(Step::Finished);
            }
            (distance + M4_DISTANCE_BIAS, run + 2, low & 3)
        } else {
            // M1: 2 bytes within 1 KiB
            let high = self.byte()? as usize;
            (1 + (t >> 2) + (high << 2), 2, t & 3)
        };

        self.copy_match(distance, length)?;
        self.trailing_literals(trailing)
    }
}

/// Decompress an LZO token stream into exactly `output_size` bytes.
///
/// # Errors
/// Returns [`Error::LzoDecompressionFailed`] if the stream ends early, runs out
/// of input, references data before the start of the output, or produces more
/// than `output_size` bytes.
pub fn decompress(compressed: &[u8], output_size: usize) -> Result<Vec<u8>> {
    let mut decoder = LzoDecoder::new(compressed, output_size);
    decoder.decode()?;
    Ok(decoder.output)
}

/// Encode `data` as a literal-only token stream.
///
/// The result decodes with [`decompress`] but is not compressed.
pub fn store(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 8);

    match data.len() {
        0 => {}
        n if n <= MAX_LEADING_LITERALS => out.push((n + 17) as u8),
        n => {
            // Literal token 0: run = 15 + extension, copied length = run + 3
            out.push(0);
            let remainder = n - 18;
            let zeros = (remainder - 1) / 255;
            out.resize(out.len() + zeros, 0);
            out.push((remainder - zeros * 255) as u8);
        }
    }
    out.extend_from_slice(data);
    out.extend_from_slice(&END_OF_STREAM);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_literal_run() {
        let mut stream = vec![17 + 11];
        stream.extend_from_slice(b"hello world");
        stream.extend_from_slice(&END_OF_STREAM);
        assert_eq!(decompress(&stream, 11).unwrap(), b"hello world");
    }

    #[test]
    fn test_overlapping_m3_match() {
        // "abc", then 9 bytes from distance 3
        let stream = [20, b'a', b'b', b'c', 39, 8, 0, 0x11, 0, 0];
        assert_eq!(decompress(&stream, 12).unwrap(), b"abcabcabcabc");
    }

    #[test]
    fn test_m2_match_with_trailing_literal() {
        let stream = [20, b'x', b'y', b'z', 73, 0, b'!', 0x11, 0, 0];
        assert_eq!(decompress(&stream, 7).unwrap(), b"xyzxyz!");
    }

    #[test]
    fn test_m1_match_after_trailing_literals() {
        let stream = [19, b'a', b'b', 4, 0, 0x11, 0, 0];
        assert_eq!(decompress(&stream, 4).unwrap(), b"abab");
    }

    #[test]
    fn test_extended_literal_run() {
        let data: Vec<u8> = (0u8..20).collect();
        let mut stream = vec![0, 2];
        stream.extend_from_slice(&data);
        stream.extend_from_slice(&END_OF_STREAM);
        assert_eq!(decompress(&stream, 20).unwrap(), data);
    }

    #[test]
    fn test_end_marker_before_declared_size() {
        let stream = [20, b'a', b'b', b'c', 0x11, 0, 0];
        assert!(decompress(&stream, 8).is_err());
    }

    #[test]
    fn test_missing_end_marker() {
        let stream = [20, b'a', b'b', b'c', 39, 8];
        let err = decompress(&stream, 12).unwrap_err();
        assert!(err.is_decompression_error());
    }

    #[test]
    fn test_distance_before_output_start() {
        // M3 with distance 5 after only 3 bytes
        let stream = [20, b'a', b'b', b'c', 39, 16, 0, 0x11, 0, 0];
        assert!(decompress(&stream, 12).is_err());
    }

    #[test]
    fn test_output_overflow() {
        let stream = [20, b'a', b'b', b'c', 39, 8, 0, 0x11, 0, 0];
        assert!(decompress(&stream, 6).is_err());
    }

    #[test]
    fn test_huge_declared_size_is_not_preallocated() {
        let decoder = LzoDecoder::new(&END_OF_STREAM, u32::MAX as usize);
        assert!(decoder.output.capacity() < 1024);

        let err = decompress(&END_OF_STREAM, u32::MAX as usize).unwrap_err();
        assert!(err.is_decompression_error());
    }

    #[test]
    fn test_store_lengths() {
        for len in [0usize, 1, 3, 4, 17, 238, 239, 240, 255 + 18, 255 + 19, 1000] {
            let data: Vec<u8> = (0..len).map(|i| (i * 7 + 1) as u8).collect();
            let stream = store(&data);
            assert_eq!(decompress(&stream, len).unwrap(), data, "length {len}");
        }
    }
}
