//! Joint remap tables (`AMAP`) and per-model animation lists (`MODANIM`)

use serde::Serialize;

use crate::error::{Error, Result};

/// Maps animation-local joint indices to a model's skeleton joints.
///
/// Byte `i` is the signed destination joint for animation joint `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AmapTable {
    bytes: Vec<u8>,
}

impl AmapTable {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw signed entry for animation joint `index`.
    pub fn entry(&self, index: usize) -> Option<i8> {
        self.bytes.get(index).map(|&b| b as i8)
    }

    /// Destination joint for animation joint `index`, if the entry exists and
    /// is non-negative.
    pub fn dest_joint(&self, index: usize) -> Option<usize> {
        self.entry(index)
            .and_then(|joint| usize::try_from(joint).ok())
    }
}

/// The global animation ids a model can play, in slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModanimTable {
    anim_ids: Vec<u16>,
}

impl ModanimTable {
    /// Parse a list of big-endian u16 anim ids. A trailing odd byte is ignored.
    pub fn parse(data: &[u8]) -> Self {
        let anim_ids = data
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Self { anim_ids }
    }

    pub fn len(&self) -> usize {
        self.anim_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anim_ids.is_empty()
    }

    pub fn anim_ids(&self) -> &[u16] {
        &self.anim_ids
    }

    /// Global anim id for model-local animation `slot`.
    pub fn anim_id(&self, slot: usize) -> Result<u32> {
        self.anim_ids
            .get(slot)
            .map(|&id| u32::from(id))
            .ok_or(Error::ResourceNotFound {
                kind: "modanim slot",
                id: slot as u32,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest_joint() {
        let amap = AmapTable::new(vec![0, 3, 0xFF, 0x7F]);
        assert_eq!(amap.dest_joint(0), Some(0));
        assert_eq!(amap.dest_joint(1), Some(3));
        assert_eq!(amap.entry(2), Some(-1));
        assert_eq!(amap.dest_joint(2), None);
        assert_eq!(amap.dest_joint(3), Some(127));
        assert_eq!(amap.dest_joint(4), None);
    }

    #[test]
    fn test_modanim_slots() {
        let table = ModanimTable::parse(&[0x00, 0x10, 0x01, 0x02, 0xAA]);
        assert_eq!(table.anim_ids(), &[0x10, 0x102]);
        assert_eq!(table.anim_id(1).unwrap(), 0x102);
        assert!(table.anim_id(2).is_err());
    }
}
