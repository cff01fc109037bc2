//! # SfaRes
//!
//! A pure-Rust library for Star Fox Adventures resource files.
//!
//! ## Supported Formats
//!
//! - **ZLB / DIRn / LZOn containers** - Tagged wrappers around compressed or raw payloads
//! - **ANIM.TAB / ANIM.BIN** - Skeletal keyframe animations
//! - **AMAP / MODANIM** - Joint remap tables and per-model animation lists
//! - **MODELS.tab / MODELS.bin** - Model data extraction
//!
//! ## Quick Start
//!
//! ### Decoding a Container
//!
//! ```no_run
//! use sfares::formats::decode_container;
//!
//! let raw = std::fs::read("MODELS.bin.entry")?;
//! let payload = decode_container(&raw)?;
//! println!("{} bytes decoded", payload.len());
//! # Ok::<(), sfares::Error>(())
//! ```
//!
//! ### Playing an Animation
//!
//! ```no_run
//! use sfares::prelude::*;
//!
//! let fetcher = DirFetcher::new("/games/sfa");
//! let res = ResourceCollection::create(&fetcher, &GameInfo::sfa(), "swaphol")?;
//!
//! let anim = res.anims.get_anim(12)?;
//! let amap = res.amaps.get_amap(3)?;
//! let instance = AnimationInstance::new(anim, amap, 8.0);
//!
//! let mut skeleton = SkeletonPose::identity(24);
//! instance.update(1.25, &mut skeleton)?;
//! # Ok::<(), sfares::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `sfares` command-line binary

pub mod anim;
pub mod batch;
pub mod compression;
pub mod config;
pub mod error;
pub mod formats;
pub mod resource;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::{ContainerKind, decode_container, decode_lzo_at, decode_nested};

    pub use crate::anim::{
        AmapTable, Anim, AnimationInstance, Keyframe, ModanimTable, Pose, PoseTarget,
        SkeletonPose, interpolate, parse_anim, sample_anim,
    };

    pub use crate::config::{Config, GameInfo, get_subdir};
    pub use crate::resource::{
        AmapCollection, AnimCollection, DataFetcher, DirFetcher, ModanimCollection,
        ModelCollection, ResourceCollection,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
