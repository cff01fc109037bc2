//! Animation entry parser
//!
//! An entry from `ANIM.BIN` is laid out as:
//!
//! ```text
//! 0x0  u16  flags (unused)
//! 0x2  u16  keyframes offset
//! 0x4  u16  times offset (end of keyframe data)
//! 0x6  u8   joint count
//! 0x7  u8   keyframe stride in bytes
//! 0xA  u16  axis commands, joint by joint, X/Y/Z
//! ```
//!
//! The command stream is shared by every keyframe: each command holds a base
//! value plus the width of a per-keyframe delta read from that keyframe's
//! bitstream. Rotation commands may chain a scale command, which may chain a
//! translation command.

use std::f32::consts::PI;
use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::keyframe::{Anim, Axis, Keyframe, Pose};
use crate::error::{Error, Result};

const HEADER_SIZE: usize = 0xA;

/// Set on a rotation command when a scale command follows, and on a scale
/// command when a translation command follows.
const CHAIN_FLAG: u16 = 0x10;
const DELTA_BITS_MASK: u16 = 0xF;
const CHAINED_BASE_MASK: u16 = 0xFFE0;
const TRANSLATION_BASE_MASK: u16 = 0xFFF0;

const SCALE_UNITS: f32 = 1024.0;
const TRANSLATION_UNITS: f32 = 512.0;

/// Header of an animation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimHeader {
    pub keyframes_offset: u16,
    pub times_offset: u16,
    pub joint_count: u8,
    pub keyframe_stride: u8,
}

impl AnimHeader {
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::anim(format!("entry of {} bytes has no header", data.len())));
        }
        let mut cursor = Cursor::new(&data[2..]);
        Ok(Self {
            keyframes_offset: cursor.read_u16::<BigEndian>()?,
            times_offset: cursor.read_u16::<BigEndian>()?,
            joint_count: cursor.read_u8()?,
            keyframe_stride: cursor.read_u8()?,
        })
    }

    pub fn keyframe_count(&self) -> Result<usize> {
        if self.times_offset < self.keyframes_offset {
            return Err(Error::anim(format!(
                "times offset 0x{:x} precedes keyframes offset 0x{:x}",
                self.times_offset, self.keyframes_offset
            )));
        }
        let span = usize::from(self.times_offset - self.keyframes_offset);
        match (span, self.keyframe_stride) {
            (0, _) => Ok(0),
            (_, 0) => Err(Error::anim("keyframe stride is zero")),
            (span, stride) => Ok(span / usize::from(stride)),
        }
    }
}

/// Reads bits least-significant first from consecutive bytes.
pub struct LowBitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> LowBitReader<'a> {
    pub fn new(data: &'a [u8], byte_offset: usize) -> Self {
        Self {
            data,
            bit_pos: byte_offset * 8,
        }
    }

    pub fn get(&mut self, bits: u32) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..bits {
            let byte = *self.data.get(self.bit_pos / 8).ok_or(Error::UnexpectedEof)?;
            let bit = (byte >> (self.bit_pos % 8)) & 1;
            value |= u32::from(bit) << i;
            self.bit_pos += 1;
        }
        Ok(value)
    }

    /// Read a `bits`-wide two's complement value.
    pub fn get_signed(&mut self, bits: u32) -> Result<i32> {
        if bits == 0 {
            return Ok(0);
        }
        let raw = self.get(bits)?;
        let shift = 32 - bits;
        Ok(((raw << shift) as i32) >> shift)
    }
}

/// Maps a 16-bit angle (65536 = full turn) to radians.
pub fn angle16_to_rads(angle: i32) -> f32 {
    angle as f32 * PI / 32768.0
}

struct CommandStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl CommandStream<'_> {
    fn next(&mut self) -> Result<u16> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 2)
            .ok_or_else(|| Error::anim(format!("command stream runs past end at 0x{:x}", self.pos)))?;
        self.pos += 2;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}

fn command_value(cmd: u16, base_mask: u16, deltas: &mut LowBitReader) -> Result<i32> {
    let base = i32::from((cmd & base_mask) as i16);
    let delta = deltas.get_signed(u32::from(cmd & DELTA_BITS_MASK))?;
    Ok(base + delta)
}

fn read_axis(commands: &mut CommandStream, deltas: &mut LowBitReader) -> Result<Axis> {
    let mut axis = Axis::default();

    let cmd = commands.next()?;
    axis.rotation = angle16_to_rads(command_value(cmd, CHAINED_BASE_MASK, deltas)?);

    if cmd & CHAIN_FLAG != 0 {
        let cmd = commands.next()?;
        axis.scale = 1.0 + command_value(cmd, CHAINED_BASE_MASK, deltas)? as f32 / SCALE_UNITS;

        if cmd & CHAIN_FLAG != 0 {
            let cmd = commands.next()?;
            axis.translation =
                command_value(cmd, TRANSLATION_BASE_MASK, deltas)? as f32 / TRANSLATION_UNITS;
        }
    }

    Ok(axis)
}

fn read_keyframe(data: &[u8], header: &AnimHeader, index: usize) -> Result<Keyframe> {
    let mut commands = CommandStream {
        data,
        pos: HEADER_SIZE,
    };
    let offset = usize::from(header.keyframes_offset) + index * usize::from(header.keyframe_stride);
    let mut deltas = LowBitReader::new(data, offset);

    let mut poses = Vec::with_capacity(usize::from(header.joint_count));
    for _ in 0..header.joint_count {
        let mut pose = Pose::default();
        for axis in &mut pose.axes {
            *axis = read_axis(&mut commands, &mut deltas).map_err(|e| match e {
                Error::UnexpectedEof => Error::anim(format!(
                    "keyframe {index} bitstream runs past end of entry"
                )),
                other => other,
            })?;
        }
        poses.push(pose);
    }

    Ok(Keyframe { poses })
}

/// Parse one animation entry.
///
/// # Errors
/// Returns [`Error::MalformedAnim`] if the header, command stream, or any
/// keyframe bitstream is inconsistent with the entry size.
pub fn parse_anim(data: &[u8]) -> Result<Anim> {
    let header = AnimHeader::read(data)?;
    let count = header.keyframe_count()?;

    let keyframes = (0..count)
        .map(|i| read_keyframe(data, &header, i))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Parsed anim: {} keyframes x {} joints (stride {})",
        keyframes.len(),
        header.joint_count,
        header.keyframe_stride
    );

    Ok(Anim { keyframes })
}
