//! Writing blended keyframes into a skeleton through the joint remap table

use std::sync::Arc;

use glam::{Mat4, Vec3};

use super::amap::AmapTable;
use super::interpolate::{interpolate, sample_anim};
use super::keyframe::{Anim, Keyframe, Pose};
use crate::error::Result;

/// A skeleton whose local joint poses can be overwritten.
pub trait PoseTarget {
    fn joint_count(&self) -> usize;

    /// Restore every joint to its bind pose.
    fn reset_pose(&mut self);

    fn set_joint_pose(&mut self, joint: usize, pose: Mat4);
}

/// Local joint matrices with a bind pose to reset to.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonPose {
    bind: Vec<Mat4>,
    local: Vec<Mat4>,
}

impl SkeletonPose {
    pub fn new(bind: Vec<Mat4>) -> Self {
        Self {
            local: bind.clone(),
            bind,
        }
    }

    /// A skeleton of `joint_count` joints bound at identity.
    pub fn identity(joint_count: usize) -> Self {
        Self::new(vec![Mat4::IDENTITY; joint_count])
    }

    pub fn bind_pose(&self, joint: usize) -> Option<&Mat4> {
        self.bind.get(joint)
    }

    pub fn local_pose(&self, joint: usize) -> Option<&Mat4> {
        self.local.get(joint)
    }

    pub fn local_poses(&self) -> &[Mat4] {
        &self.local
    }
}

impl PoseTarget for SkeletonPose {
    fn joint_count(&self) -> usize {
        self.local.len()
    }

    fn reset_pose(&mut self) {
        self.local.clone_from(&self.bind);
    }

    fn set_joint_pose(&mut self, joint: usize, pose: Mat4) {
        if let Some(slot) = self.local.get_mut(joint) {
            *slot = pose;
        }
    }
}

/// Local transform for a pose: translate, scale, then rotate Z, Y, X.
pub fn pose_matrix(pose: &Pose) -> Mat4 {
    let [x, y, z] = pose.axes;
    Mat4::from_translation(Vec3::from(pose.translation()))
        * Mat4::from_scale(Vec3::from(pose.scale()))
        * Mat4::from_rotation_z(z.rotation)
        * Mat4::from_rotation_y(y.rotation)
        * Mat4::from_rotation_x(x.rotation)
}

/// Write `kf` into `target` through `amap`.
///
/// Only the first `min(pose count, joint count)` animation joints are
/// considered. Joints whose remap entry is missing, negative, or past the
/// skeleton are skipped and keep their current pose. Returns the number of
/// joints written.
pub fn apply_keyframe(kf: &Keyframe, amap: &AmapTable, target: &mut impl PoseTarget) -> usize {
    let joint_count = target.joint_count();
    let mut written = 0;

    for (i, pose) in kf.poses.iter().enumerate().take(joint_count) {
        match amap.dest_joint(i) {
            Some(dest) if dest < joint_count => {
                target.set_joint_pose(dest, pose_matrix(pose));
                written += 1;
            }
            entry => {
                tracing::trace!("Skipping anim joint {i}: remap entry {entry:?} of {joint_count} joints");
            }
        }
    }

    written
}

/// An animation bound to a model's remap table and a playback rate.
#[derive(Debug, Clone)]
pub struct AnimationInstance {
    pub anim: Arc<Anim>,
    pub amap: Arc<AmapTable>,
    /// Keyframes per second.
    pub rate: f32,
}

impl AnimationInstance {
    pub fn new(anim: Arc<Anim>, amap: Arc<AmapTable>, rate: f32) -> Self {
        Self { anim, amap, rate }
    }

    /// Pose `target` for `time` seconds into playback.
    ///
    /// The blend is computed before `target` is touched, so on error the
    /// previous pose is retained.
    ///
    /// # Errors
    /// Returns [`crate::Error::EmptyAnimation`] or [`crate::Error::ShapeMismatch`].
    pub fn update(&self, time: f32, target: &mut impl PoseTarget) -> Result<usize> {
        let sample = sample_anim(&self.anim, time, self.rate)?;
        let kf = interpolate(
            &self.anim.keyframes[sample.kf0],
            &self.anim.keyframes[sample.kf1],
            sample.ratio,
        )?;

        target.reset_pose();
        Ok(apply_keyframe(&kf, &self.amap, target))
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::anim::keyframe::Axis;
    use crate::error::Error;

    fn translated(x: f32) -> Pose {
        let mut pose = Pose::default();
        pose.axes[0].translation = x;
        pose
    }

    #[test]
    fn test_pose_matrix_order() {
        let mut pose = Pose::default();
        pose.axes = [
            Axis { translation: 1.0, rotation: 0.0, scale: 2.0 },
            Axis { translation: 2.0, rotation: 0.0, scale: 2.0 },
            Axis { translation: 3.0, rotation: FRAC_PI_2, scale: 2.0 },
        ];
        let m = pose_matrix(&pose);
        // Rotate X onto Y, scale by 2, then translate
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 4.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotation_order_is_z_y_x() {
        let mut pose = Pose::default();
        pose.axes[0].rotation = FRAC_PI_2;
        pose.axes[2].rotation = FRAC_PI_2;
        let m = pose_matrix(&pose);
        // X rotation applies first: Y -> Z, then Z rotation leaves Z alone
        let p = m.transform_vector3(Vec3::Y);
        assert!((p - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_apply_respects_joint_bounds() {
        let kf = Keyframe {
            poses: (0..5).map(|i| translated(i as f32 + 1.0)).collect(),
        };
        // joint 0 -> 2, joint 1 -> -1, joint 2 -> 9 (out of range), joint 3 -> 0
        let amap = AmapTable::new(vec![2, 0xFF, 9, 0, 1]);
        let mut skeleton = SkeletonPose::identity(4);

        let written = apply_keyframe(&kf, &amap, &mut skeleton);
        assert_eq!(written, 2);
        assert_eq!(skeleton.local_pose(2).unwrap().w_axis.x, 1.0);
        assert_eq!(skeleton.local_pose(0).unwrap().w_axis.x, 4.0);
        // anim joint 4 is past the skeleton's joint count
        assert_eq!(*skeleton.local_pose(1).unwrap(), Mat4::IDENTITY);
        assert_eq!(*skeleton.local_pose(3).unwrap(), Mat4::IDENTITY);
    }

    #[test]
    fn test_short_amap_leaves_bind_pose() {
        let kf = Keyframe {
            poses: vec![translated(1.0); 3],
        };
        let amap = AmapTable::new(vec![1]);
        let mut skeleton = SkeletonPose::identity(3);
        assert_eq!(apply_keyframe(&kf, &amap, &mut skeleton), 1);
        assert_eq!(*skeleton.local_pose(0).unwrap(), Mat4::IDENTITY);
    }

    #[test]
    fn test_update_resets_then_applies() {
        let anim = Anim {
            keyframes: vec![
                Keyframe { poses: vec![translated(0.0)] },
                Keyframe { poses: vec![translated(10.0)] },
            ],
        };
        let bind = Mat4::from_translation(Vec3::splat(7.0));
        let mut skeleton = SkeletonPose::new(vec![bind, bind]);
        skeleton.set_joint_pose(1, Mat4::ZERO);

        let instance = AnimationInstance::new(Arc::new(anim), Arc::new(AmapTable::new(vec![0])), 4.0);
        instance.update(0.125, &mut skeleton).unwrap();

        assert_eq!(skeleton.local_pose(0).unwrap().w_axis.x, 5.0);
        assert_eq!(*skeleton.local_pose(1).unwrap(), bind);
    }

    #[test]
    fn test_update_keeps_pose_on_shape_mismatch() {
        let anim = Anim {
            keyframes: vec![
                Keyframe { poses: vec![translated(0.0)] },
                Keyframe { poses: vec![translated(1.0); 2] },
            ],
        };
        let mut skeleton = SkeletonPose::identity(2);
        let previous = Mat4::from_translation(Vec3::X);
        skeleton.set_joint_pose(0, previous);

        let instance = AnimationInstance::new(Arc::new(anim), Arc::new(AmapTable::new(vec![0, 1])), 1.0);
        let err = instance.update(0.5, &mut skeleton).unwrap_err();

        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(*skeleton.local_pose(0).unwrap(), previous);
    }
}
