//! Keyframe blending and playback-clock sampling

use super::keyframe::{Anim, Axis, Keyframe, Pose};
use crate::error::{Error, Result};

/// Weighted form of `a + (b - a) * ratio`; exact at both endpoints.
fn lerp(a: f32, b: f32, ratio: f32) -> f32 {
    a * (1.0 - ratio) + b * ratio
}

fn interpolate_axis(a: &Axis, b: &Axis, ratio: f32) -> Axis {
    Axis {
        translation: lerp(a.translation, b.translation, ratio),
        // Plain linear blend in radians, no shortest-path correction: poses
        // crossing the -pi/pi boundary spin the long way round, matching the
        // game data as authored.
        rotation: lerp(a.rotation, b.rotation, ratio),
        scale: lerp(a.scale, b.scale, ratio),
    }
}

fn interpolate_pose(a: &Pose, b: &Pose, ratio: f32) -> Pose {
    Pose {
        axes: std::array::from_fn(|i| interpolate_axis(&a.axes[i], &b.axes[i], ratio)),
    }
}

/// Blend two keyframes joint by joint.
///
/// `ratio` 0.0 yields `kf0`, 1.0 yields `kf1`.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if the keyframes have different pose counts.
pub fn interpolate(kf0: &Keyframe, kf1: &Keyframe, ratio: f32) -> Result<Keyframe> {
    if kf0.pose_count() != kf1.pose_count() {
        return Err(Error::ShapeMismatch {
            left: kf0.pose_count(),
            right: kf1.pose_count(),
        });
    }

    let poses = kf0
        .poses
        .iter()
        .zip(&kf1.poses)
        .map(|(a, b)| interpolate_pose(a, b, ratio))
        .collect();

    Ok(Keyframe { poses })
}

/// The pair of keyframes to blend at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeSample {
    pub kf0: usize,
    pub kf1: usize,
    pub ratio: f32,
}

/// Locate the keyframes surrounding `time` seconds at `rate` keyframes per second.
///
/// Playback loops: the last keyframe blends toward the first. Negative times
/// wrap the same way.
///
/// # Errors
/// Returns [`Error::EmptyAnimation`] if `anim` has no keyframes.
pub fn sample_anim(anim: &Anim, time: f32, rate: f32) -> Result<KeyframeSample> {
    let len = anim.len();
    if len == 0 {
        return Err(Error::EmptyAnimation);
    }

    let kf_time = (time * rate).rem_euclid(len as f32);
    // rem_euclid can round up to exactly `len` for tiny negative inputs
    let kf0 = (kf_time.floor() as usize).min(len - 1);
    let kf1 = (kf0 + 1) % len;
    let ratio = (kf_time - kf0 as f32).clamp(0.0, 1.0);

    Ok(KeyframeSample { kf0, kf1, ratio })
}

impl Anim {
    /// Sample and blend in one step.
    pub fn pose_at(&self, time: f32, rate: f32) -> Result<Keyframe> {
        let sample = sample_anim(self, time, rate)?;
        interpolate(
            &self.keyframes[sample.kf0],
            &self.keyframes[sample.kf1],
            sample.ratio,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyframe_with_x(translation: f32, rotation: f32, scale: f32) -> Keyframe {
        let mut pose = Pose::default();
        pose.axes[0] = Axis {
            translation,
            rotation,
            scale,
        };
        Keyframe { poses: vec![pose] }
    }

    fn anim_of(len: usize) -> Anim {
        Anim {
            keyframes: (0..len).map(|i| keyframe_with_x(i as f32, 0.0, 1.0)).collect(),
        }
    }

    #[test]
    fn test_midpoint_translation() {
        let kf0 = keyframe_with_x(0.0, 0.0, 1.0);
        let kf1 = keyframe_with_x(10.0, 0.0, 1.0);
        let kf = interpolate(&kf0, &kf1, 0.5).unwrap();
        assert_eq!(kf.poses[0].axes[0].translation, 5.0);
    }

    #[test]
    fn test_endpoints_are_exact() {
        let kf0 = keyframe_with_x(-3.25, 1.5, 0.75);
        let kf1 = keyframe_with_x(7.0, -2.0, 1.25);
        assert_eq!(interpolate(&kf0, &kf1, 0.0).unwrap(), kf0);
        assert_eq!(interpolate(&kf0, &kf1, 1.0).unwrap(), kf1);
    }

    #[test]
    fn test_rotation_has_no_wraparound_correction() {
        let kf0 = keyframe_with_x(0.0, 3.0, 1.0);
        let kf1 = keyframe_with_x(0.0, -3.0, 1.0);
        let kf = interpolate(&kf0, &kf1, 0.5).unwrap();
        assert_eq!(kf.poses[0].axes[0].rotation, 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let kf0 = keyframe_with_x(0.0, 0.0, 1.0);
        let kf1 = Keyframe {
            poses: vec![Pose::default(); 2],
        };
        assert!(matches!(
            interpolate(&kf0, &kf1, 0.5),
            Err(Error::ShapeMismatch { left: 1, right: 2 })
        ));
    }

    #[test]
    fn test_sample_wraps_to_first_keyframe() {
        let anim = anim_of(4);
        // 3.5 keyframes in: blending the last toward the first
        let sample = sample_anim(&anim, 0.875, 4.0).unwrap();
        assert_eq!(sample, KeyframeSample { kf0: 3, kf1: 0, ratio: 0.5 });

        // One full loop later lands on the same sample
        let looped = sample_anim(&anim, 1.875, 4.0).unwrap();
        assert_eq!(looped, sample);
    }

    #[test]
    fn test_sample_negative_time() {
        let anim = anim_of(4);
        let sample = sample_anim(&anim, -0.125, 4.0).unwrap();
        assert_eq!(sample, KeyframeSample { kf0: 3, kf1: 0, ratio: 0.5 });
    }

    #[test]
    fn test_sample_single_keyframe() {
        let anim = anim_of(1);
        let sample = sample_anim(&anim, 12.3, 8.0).unwrap();
        assert_eq!((sample.kf0, sample.kf1), (0, 0));
    }

    #[test]
    fn test_sample_empty() {
        assert!(matches!(
            sample_anim(&Anim::default(), 1.0, 8.0),
            Err(Error::EmptyAnimation)
        ));
    }

    #[test]
    fn test_pose_at() {
        let anim = anim_of(2);
        let kf = anim.pose_at(0.125, 4.0).unwrap();
        assert_eq!(kf.poses[0].axes[0].translation, 0.5);
    }
}
