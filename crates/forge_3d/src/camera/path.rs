//! Keyframed camera path

use forge_animation::{Easing, Interpolate, KeyframeTrack, TypedKeyframe};
use forge_core::Vec3;
use serde::Serialize;

/// Camera placement
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view (degrees)
    pub fov: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3, fov: f32) -> Self {
        Self { position, target, fov }
    }

    /// Camera-to-target distance
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

impl Interpolate for CameraPose {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: Interpolate::lerp(&self.position, &other.position, t),
            target: Interpolate::lerp(&self.target, &other.target, t),
            fov: Interpolate::lerp(&self.fov, &other.fov, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.position.approx_eq(&other.position, epsilon)
            && self.target.approx_eq(&other.target, epsilon)
            && self.fov.approx_eq(&other.fov, epsilon)
    }
}

/// Looping keyframe path sampled by normalized time
///
/// The first keyframe should sit at 0 and the last at 1, with equal poses
/// when the path loops. Paths that break this are accepted with a warning.
#[derive(Clone, Debug)]
pub struct CameraPath {
    track: KeyframeTrack<CameraPose>,
}

impl CameraPath {
    pub fn new(keyframes: impl IntoIterator<Item = (f32, CameraPose)>, easing: Easing) -> Self {
        let track = KeyframeTrack::from_keyframes(
            keyframes
                .into_iter()
                .map(|(time, pose)| TypedKeyframe::new(time, pose, easing)),
        );

        let frames = track.keyframes();
        match (frames.first(), frames.last()) {
            (Some(first), Some(last)) => {
                if first.time.abs() > f32::EPSILON || (last.time - 1.0).abs() > f32::EPSILON {
                    tracing::warn!(
                        "CameraPath: keyframes span [{}, {}] instead of [0, 1]",
                        first.time,
                        last.time
                    );
                }
            }
            _ => tracing::warn!("CameraPath: path has no keyframes"),
        }

        Self { track }
    }

    /// Five-stop orbit around the tool lineup, closing on its start
    pub fn showcase(fov: f32, easing: Easing) -> Self {
        let target = Vec3::new(0.0, 0.5, 0.0);
        let start = CameraPose::new(Vec3::new(0.0, 2.0, 8.0), target, fov);
        Self::new(
            [
                (0.0, start),
                (0.25, CameraPose::new(Vec3::new(6.0, 3.0, 5.0), target, fov)),
                (0.5, CameraPose::new(Vec3::new(0.0, 4.0, -7.0), Vec3::new(0.0, 0.8, 0.0), fov)),
                (0.75, CameraPose::new(Vec3::new(-6.0, 2.5, 5.0), target, fov)),
                (1.0, start),
            ],
            easing,
        )
    }

    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }

    pub fn sample(&self, progress: f32) -> Option<CameraPose> {
        self.track.sample_at(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_seam() {
        let path = CameraPath::showcase(45.0, Easing::EaseInOutSine);
        assert_eq!(path.len(), 5);

        let start = path.sample(0.0).unwrap();
        let end = path.sample(1.0).unwrap();
        assert!(start.approx_eq(&end, 1e-6));

        let just_before = path.sample(0.9999).unwrap();
        assert!(just_before.approx_eq(&start, 1e-3));
    }

    #[test]
    fn test_segment_interpolation() {
        let a = CameraPose::new(Vec3::ZERO, Vec3::ZERO, 40.0);
        let b = CameraPose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::UP, 60.0);
        let path = CameraPath::new([(0.0, a), (1.0, b)], Easing::Linear);

        let mid = path.sample(0.5).unwrap();
        assert!((mid.position.x - 5.0).abs() < 1e-5);
        assert!((mid.fov - 50.0).abs() < 1e-5);
    }

    #[test]
    fn test_loose_path_still_samples() {
        let pose = CameraPose::new(Vec3::ONE, Vec3::ZERO, 45.0);
        let path = CameraPath::new([(0.2, pose), (0.8, pose)], Easing::Linear);
        assert_eq!(path.sample(0.0), Some(pose));
        assert!(CameraPath::new([], Easing::Linear).sample(0.5).is_none());
    }
}
