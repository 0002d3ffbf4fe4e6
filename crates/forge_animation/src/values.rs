//! Animatable value types
//!
//! Traits and implementations for values that can be interpolated, plus
//! keyframe tracks sampled by normalized progress.

use crate::easing::Easing;
use forge_core::{Euler, Vec3};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Vec3 / Euler Implementation
// ============================================================================

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl Interpolate for Euler {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Euler::from_vec3(Vec3::lerp(&self.as_vec3(), other.as_vec3(), t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        Interpolate::approx_eq(&self.as_vec3(), &other.as_vec3(), epsilon)
    }
}

// ============================================================================
// Keyframe tracks
// ============================================================================

/// A keyframe holding a value of type T
#[derive(Clone, Debug)]
pub struct TypedKeyframe<T: Interpolate> {
    /// Time position (0.0 to 1.0)
    pub time: f32,
    /// Value at this keyframe
    pub value: T,
    /// Easing used when transitioning TO this keyframe
    pub easing: Easing,
}

impl<T: Interpolate> TypedKeyframe<T> {
    pub fn new(time: f32, value: T, easing: Easing) -> Self {
        Self { time, value, easing }
    }

    /// Create a keyframe with linear easing
    pub fn linear(time: f32, value: T) -> Self {
        Self::new(time, value, Easing::Linear)
    }
}

/// Sorted keyframes sampled by progress
#[derive(Clone, Debug)]
pub struct KeyframeTrack<T: Interpolate> {
    keyframes: Vec<TypedKeyframe<T>>,
}

impl<T: Interpolate> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a track from unsorted keyframes
    pub fn from_keyframes(keyframes: impl IntoIterator<Item = TypedKeyframe<T>>) -> Self {
        let mut track = Self {
            keyframes: keyframes.into_iter().collect(),
        };
        track.sort();
        track
    }

    /// Add a keyframe (builder pattern)
    pub fn keyframe(mut self, time: f32, value: T, easing: Easing) -> Self {
        self.push(TypedKeyframe::new(time, value, easing));
        self
    }

    /// Add a keyframe with linear easing
    pub fn at(self, time: f32, value: T) -> Self {
        self.keyframe(time, value, Easing::Linear)
    }

    /// Insert a keyframe, keeping the track sorted
    pub fn push(&mut self, keyframe: TypedKeyframe<T>) {
        self.keyframes.push(keyframe);
        self.sort();
    }

    fn sort(&mut self) {
        // Stable, so equal times keep insertion order
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    pub fn keyframes(&self) -> &[TypedKeyframe<T>] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Sample at a specific progress (0.0 to 1.0)
    ///
    /// Progress before the first keyframe holds the first value, progress
    /// past the last holds the last value. Returns `None` for an empty track.
    pub fn sample_at(&self, progress: f32) -> Option<T> {
        let first = self.keyframes.first()?;

        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut prev_kf = first;
        let mut next_kf = first;

        for kf in &self.keyframes {
            if kf.time <= progress {
                prev_kf = kf;
            }
            if kf.time >= progress {
                next_kf = kf;
                break;
            }
            next_kf = kf;
        }

        if (prev_kf.time - next_kf.time).abs() < f32::EPSILON {
            return Some(prev_kf.value.clone());
        }

        let local_progress = (progress - prev_kf.time) / (next_kf.time - prev_kf.time);
        let eased = next_kf.easing.apply(local_progress);

        Some(prev_kf.value.lerp(&next_kf.value, eased))
    }
}

// ============================================================================
// Type Aliases for Common Types
// ============================================================================

/// Keyframe track for f32 values
pub type FloatTrack = KeyframeTrack<f32>;

/// Keyframe track for Vec3 values (positions, scales)
pub type Vec3Track = KeyframeTrack<Vec3>;

/// Float keyframe
pub type FloatKeyframe = TypedKeyframe<f32>;

/// Vec3 keyframe
pub type Vec3Keyframe = TypedKeyframe<Vec3>;
