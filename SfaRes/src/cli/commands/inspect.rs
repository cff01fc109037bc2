//! Container inspection

use std::path::Path;

use crate::formats::container::{ContainerKind, DirHeader, LzoHeader, ZlbHeader};

/// Print the container kind and header fields of a file.
pub fn execute(path: &Path) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;

    println!("File:       {}", path.display());
    println!("Size:       {} bytes", data.len());

    let Some(kind) = ContainerKind::identify(&data) else {
        match data.get(..4) {
            Some(tag) => println!("Container:  none (tag {:02x}{:02x}{:02x}{:02x})", tag[0], tag[1], tag[2], tag[3]),
            None => println!("Container:  none (too short for a tag)"),
        }
        return Ok(());
    };

    println!("Container:  {kind}");
    match kind {
        ContainerKind::Zlb => {
            let header = ZlbHeader::read(&data)?;
            println!("unk4:       {:#010x}", header.unk4);
            println!("unk8:       {:#010x}", header.unk8);
            println!("Payload:    {} bytes (zlib)", header.size);
        }
        ContainerKind::Dir => {
            let header = DirHeader::read(&data)?;
            println!("Payload:    {} bytes at {:#x}", header.size, DirHeader::DATA_OFFSET);
        }
        ContainerKind::Lzo => {
            let header = LzoHeader::read_at(&data, 0)?;
            println!("Unpacked:   {} bytes", header.uncompressed_size);
            println!("Stream:     {} bytes at {:#x}", data.len().saturating_sub(LzoHeader::SIZE), LzoHeader::SIZE);
        }
    }
    Ok(())
}
