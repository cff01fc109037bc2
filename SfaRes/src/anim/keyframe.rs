//! Keyframe data model

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of axes per pose (X, Y, Z).
pub const NUM_AXES: usize = 3;

/// Transform components along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub translation: f32,
    /// Radians.
    pub rotation: f32,
    pub scale: f32,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            translation: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// The pose of one animated joint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub axes: [Axis; NUM_AXES],
}

impl Pose {
    pub fn translation(&self) -> [f32; NUM_AXES] {
        self.axes.map(|a| a.translation)
    }

    pub fn rotation(&self) -> [f32; NUM_AXES] {
        self.axes.map(|a| a.rotation)
    }

    pub fn scale(&self) -> [f32; NUM_AXES] {
        self.axes.map(|a| a.scale)
    }
}

/// One pose per animated joint, indexed by animation-local joint number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub poses: Vec<Pose>,
}

impl Keyframe {
    pub fn pose_count(&self) -> usize {
        self.poses.len()
    }
}

/// A looping sequence of keyframes sharing one joint count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anim {
    pub keyframes: Vec<Keyframe>,
}

impl Anim {
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Joint count declared by the first keyframe.
    pub fn joint_count(&self) -> usize {
        self.keyframes.first().map_or(0, Keyframe::pose_count)
    }

    /// Pretty-printed JSON export.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
