//! Scene collaborator interfaces
//!
//! Geometry, materials and lighting live outside this crate. The showcase
//! reaches them through two narrow traits: [`SceneSink`] receives transforms,
//! camera frames and quality profiles, and [`Picker`] resolves screen points
//! to entities.

use crate::camera::CameraFrame;
use crate::performance::QualityProfile;
use forge_core::{Euler, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Opaque handle to a scene object owned by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

/// Position, rotation and scale of a scene object
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Euler,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Euler::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Receiver of per-frame output
pub trait SceneSink {
    /// Mutable transform of a mounted entity, `None` if it is gone
    fn transform_mut(&mut self, handle: EntityHandle) -> Option<&mut Transform>;

    /// Place the camera for this frame
    fn set_camera(&mut self, frame: &CameraFrame);

    /// Apply a new quality profile (particle budgets, shadows, pixel ratio)
    fn apply_quality(&mut self, profile: &QualityProfile);
}

/// Screen-space hit testing
pub trait Picker {
    fn pick_at(&self, x: f32, y: f32) -> Option<EntityHandle>;
}

/// In-memory scene used by headless hosts, benchmarks and tests
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    transforms: FxHashMap<EntityHandle, Transform>,
    next_id: u64,
    camera: Option<CameraFrame>,
    quality: Option<QualityProfile>,
    /// Number of `set_camera` calls
    pub camera_writes: u64,
    /// Number of `apply_quality` calls
    pub quality_writes: u64,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity at a position and return its handle
    pub fn spawn(&mut self, position: Vec3) -> EntityHandle {
        self.next_id += 1;
        let handle = EntityHandle(self.next_id);
        self.transforms
            .insert(handle, Transform::from_position(position));
        handle
    }

    /// Remove an entity; later writes to it are dropped
    pub fn despawn(&mut self, handle: EntityHandle) -> Option<Transform> {
        self.transforms.remove(&handle)
    }

    pub fn transform(&self, handle: EntityHandle) -> Option<&Transform> {
        self.transforms.get(&handle)
    }

    pub fn camera(&self) -> Option<&CameraFrame> {
        self.camera.as_ref()
    }

    pub fn quality(&self) -> Option<&QualityProfile> {
        self.quality.as_ref()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl SceneSink for MemoryScene {
    fn transform_mut(&mut self, handle: EntityHandle) -> Option<&mut Transform> {
        self.transforms.get_mut(&handle)
    }

    fn set_camera(&mut self, frame: &CameraFrame) {
        self.camera = Some(*frame);
        self.camera_writes += 1;
    }

    fn apply_quality(&mut self, profile: &QualityProfile) {
        self.quality = Some(*profile);
        self.quality_writes += 1;
    }
}

/// Picker that reports entities whose screen rectangle contains the point
#[derive(Clone, Debug, Default)]
pub struct RectPicker {
    regions: Vec<(EntityHandle, [f32; 4])>,
}

impl RectPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen rectangle `[x, y, width, height]` for an entity
    pub fn with_region(mut self, handle: EntityHandle, rect: [f32; 4]) -> Self {
        self.regions.push((handle, rect));
        self
    }
}

impl Picker for RectPicker {
    fn pick_at(&self, x: f32, y: f32) -> Option<EntityHandle> {
        self.regions
            .iter()
            .rev()
            .find(|(_, [rx, ry, w, h])| x >= *rx && x <= rx + w && y >= *ry && y <= ry + h)
            .map(|(handle, _)| *handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_scene_spawn_and_write() {
        let mut scene = MemoryScene::new();
        let a = scene.spawn(Vec3::new(1.0, 0.0, 0.0));
        let b = scene.spawn(Vec3::ZERO);
        assert_ne!(a, b);

        scene.transform_mut(a).unwrap().position.y = 2.0;
        assert_eq!(scene.transform(a).unwrap().position, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.transform(b).unwrap().scale, Vec3::ONE);

        scene.despawn(a);
        assert!(scene.transform_mut(a).is_none());
    }

    #[test]
    fn test_rect_picker_prefers_topmost() {
        let back = EntityHandle(1);
        let front = EntityHandle(2);
        let picker = RectPicker::new()
            .with_region(back, [0.0, 0.0, 100.0, 100.0])
            .with_region(front, [40.0, 40.0, 20.0, 20.0]);

        assert_eq!(picker.pick_at(50.0, 50.0), Some(front));
        assert_eq!(picker.pick_at(10.0, 10.0), Some(back));
        assert_eq!(picker.pick_at(500.0, 10.0), None);
    }
}
