//! File format handlers for Star Fox Adventures resources

pub mod container;
pub mod table;

// Re-export container decoding for convenience
pub use container::{
    ContainerKind, decode_container, decode_lzo_at, decode_nested, wrap_dir, wrap_lzo, wrap_zlb,
};
pub use table::{OffsetTable, OffsetWidth};
