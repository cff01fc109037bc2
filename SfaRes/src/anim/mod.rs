//! Skeletal keyframe animation
//!
//! Animations are stored as per-joint X/Y/Z axis records (translation,
//! rotation, scale) for a looping list of keyframes. At playback time two
//! neighbouring keyframes are blended and the result is routed into the
//! model's skeleton through its `AMAP` joint remap table.

pub mod amap;
pub mod interpolate;
pub mod keyframe;
pub mod parser;
pub mod remap;

pub use amap::{AmapTable, ModanimTable};
pub use interpolate::{KeyframeSample, interpolate, sample_anim};
pub use keyframe::{Anim, Axis, Keyframe, NUM_AXES, Pose};
pub use parser::{AnimHeader, parse_anim};
pub use remap::{AnimationInstance, PoseTarget, SkeletonPose, apply_keyframe, pose_matrix};
