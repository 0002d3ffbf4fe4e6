//! Showcase orchestrator
//!
//! Owns every piece of per-frame state and runs one frame in a fixed order:
//!
//! ```text
//!   governor ─▶ clocks ─▶ composer ─▶ gesture update ─▶ camera ─▶ scene
//! ```
//!
//! The composer only runs when the tools clock actually advanced, so pausing
//! the clock freezes every tool where it is.
//!
//! Input timestamps and the frame clock share one timeline: milliseconds
//! since the showcase was built, advanced by the `dt` passed to
//! [`Showcase::frame`].

use crate::camera::{CameraFrame, CameraPathController};
use crate::error::{Result, ShowcaseError};
use crate::gesture::{GestureEvent, GestureEvents, GestureInput, GestureMachine, Haptics};
use crate::motion::{ComposedFrame, MotionComposer, MotionSettings, ToolMotion};
use crate::performance::{
    CapabilityProbe, PerformanceGovernor, PerformanceSnapshot, QualityChange, QualityProfile,
};
use crate::scene::{EntityHandle, Picker, SceneSink};
use forge_animation::{AnimationClock, ClockConfig, FrameRegistration, SchedulerHandle};
use forge_core::{QualityLevel, ShowcaseConfig};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// Which clock to address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockTarget {
    /// Shared clock sampled by every tool
    Tools,
    /// Camera path clock
    Camera,
}

/// What happened during one frame
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub quality_change: Option<QualityChange>,
    /// The tools clock advanced and transforms were recomposed
    pub tools_ticked: bool,
    pub camera: Option<CameraFrame>,
    /// Events fired by the gesture update (expired single taps, ...)
    pub gesture_events: GestureEvents,
    /// Tool ids selected during this frame
    pub selected: SmallVec<[String; 1]>,
    pub performance: PerformanceSnapshot,
}

#[derive(Clone, Debug)]
struct MountedTool {
    id: String,
    entity: Option<EntityHandle>,
}

type SelectionListener = Box<dyn FnMut(&str)>;

/// The animation and adaptive-quality core of the tool showcase
pub struct Showcase<S: SceneSink> {
    config: ShowcaseConfig,
    scene: S,
    picker: Option<Box<dyn Picker>>,
    governor: PerformanceGovernor,
    tools_clock: AnimationClock,
    camera_clock: AnimationClock,
    composer: MotionComposer,
    camera: CameraPathController,
    gestures: GestureMachine,
    tools: Vec<MountedTool>,
    applied_quality: QualityLevel,
    last_camera: Option<CameraFrame>,
    now_ms: f64,
    context_lost: bool,
    selection_listeners: Vec<SelectionListener>,
}

impl<S: SceneSink> Showcase<S> {
    /// Build a showcase
    ///
    /// The probe runs once here and picks the initial quality level. Fails
    /// with [`ShowcaseError::GraphicsUnavailable`] when it reports no
    /// graphics context.
    pub fn new(config: ShowcaseConfig, scene: S, probe: &impl CapabilityProbe) -> Result<Self> {
        let capabilities = probe.probe();
        if !capabilities.graphics_available {
            tracing::warn!("Showcase: no graphics context, not mounting");
            return Err(ShowcaseError::GraphicsUnavailable);
        }

        let config = config.sanitized();
        let governor = PerformanceGovernor::new(&config.performance, capabilities.initial_quality());

        let mut tools_clock = AnimationClock::new(
            ClockConfig::new(config.animation.loop_duration_ms as f64)
                .looping()
                .validated(),
        );
        let mut camera_clock = AnimationClock::new(
            ClockConfig::new(config.camera.loop_duration_ms as f64)
                .looping()
                .validated(),
        );
        if config.animation.autoplay {
            tools_clock.play();
            camera_clock.play();
        }

        let mut composer = MotionComposer::new(MotionSettings::from_config(&config.animation));
        let tools = config
            .tools
            .iter()
            .map(|tool| {
                composer.add_tool(ToolMotion::from_config(tool));
                MountedTool {
                    id: tool.id.clone(),
                    entity: None,
                }
            })
            .collect();

        let mut showcase = Self {
            camera: CameraPathController::new(config.camera.clone()),
            gestures: GestureMachine::new(config.gesture.clone()),
            config,
            scene,
            picker: None,
            applied_quality: governor.quality(),
            governor,
            tools_clock,
            camera_clock,
            composer,
            tools,
            last_camera: None,
            now_ms: 0.0,
            context_lost: false,
            selection_listeners: Vec::new(),
        };
        showcase.scene.apply_quality(showcase.governor.profile());

        tracing::debug!(
            "Showcase: mounted {} tools at {} quality",
            showcase.tools.len(),
            showcase.applied_quality
        );
        Ok(showcase)
    }

    /// Build from a TOML configuration document
    pub fn from_toml(source: &str, scene: S, probe: &impl CapabilityProbe) -> Result<Self> {
        let config = ShowcaseConfig::from_toml_str(source)?;
        Self::new(config, scene, probe)
    }

    /// Resolve taps to entities with this picker
    pub fn with_picker(mut self, picker: impl Picker + 'static) -> Self {
        self.picker = Some(Box::new(picker));
        self
    }

    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.gestures.set_haptics(Some(Box::new(haptics)));
        self
    }

    /// Register a listener for tool selection; it receives the tool id
    pub fn on_tool_selected<F: FnMut(&str) + 'static>(&mut self, f: F) {
        self.selection_listeners.push(Box::new(f));
    }

    /// Attach a scene entity to a configured tool
    ///
    /// Returns `false` if no tool has that id.
    pub fn bind_entity(&mut self, tool_id: &str, entity: EntityHandle) -> bool {
        match self.tools.iter_mut().find(|tool| tool.id == tool_id) {
            Some(tool) => {
                tool.entity = Some(entity);
                true
            }
            None => {
                tracing::warn!("Showcase: no tool named '{}' to bind", tool_id);
                false
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn clock(&self, target: ClockTarget) -> &AnimationClock {
        match target {
            ClockTarget::Tools => &self.tools_clock,
            ClockTarget::Camera => &self.camera_clock,
        }
    }

    /// Direct control of a clock (pause, seek, restart, ...)
    pub fn clock_mut(&mut self, target: ClockTarget) -> &mut AnimationClock {
        match target {
            ClockTarget::Tools => &mut self.tools_clock,
            ClockTarget::Camera => &mut self.camera_clock,
        }
    }

    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    pub fn governor_mut(&mut self) -> &mut PerformanceGovernor {
        &mut self.governor
    }

    pub fn composer(&self) -> &MotionComposer {
        &self.composer
    }

    pub fn camera(&self) -> &CameraPathController {
        &self.camera
    }

    pub fn gestures(&self) -> &GestureMachine {
        &self.gestures
    }

    pub fn quality(&self) -> QualityLevel {
        self.governor.quality()
    }

    pub fn profile(&self) -> &QualityProfile {
        self.governor.profile()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    pub fn tool_ids(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.id.as_str())
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Run one frame; `dt` is in seconds
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut report = FrameReport {
            quality_change: None,
            tools_ticked: false,
            camera: self.last_camera,
            gesture_events: GestureEvents::new(),
            selected: SmallVec::new(),
            performance: self.governor.snapshot(),
        };

        if self.context_lost {
            return report;
        }

        self.now_ms += dt as f64 * 1000.0;
        let dt_ms = dt as f64 * 1000.0;

        // Governor
        report.quality_change = self.governor.record_frame(dt);
        if self.governor.quality() != self.applied_quality {
            self.applied_quality = self.governor.quality();
            self.scene.apply_quality(self.governor.profile());
        }
        let profile = *self.governor.profile();

        // Clocks
        report.tools_ticked = self.tools_clock.tick(dt_ms);
        self.camera_clock.tick(dt_ms);

        // Composer
        let composed = report
            .tools_ticked
            .then(|| self.composer.compose(self.tools_clock.total_elapsed_ms(), dt, &profile));

        // Gestures settle before the camera reads them
        report.gesture_events = self.gestures.update(self.now_ms, dt);
        for event in report.gesture_events.clone() {
            if let Some(id) = self.dispatch(event) {
                report.selected.push(id);
            }
        }

        // Camera
        let camera = self.camera.update(
            self.camera_clock.directed_progress(),
            dt,
            self.now_ms,
            self.gestures.state(),
            profile.camera_far_plane,
        );
        self.last_camera = Some(camera);
        report.camera = Some(camera);

        // Scene
        if let Some(composed) = composed {
            self.write_transforms(&composed);
        }
        self.scene.set_camera(&camera);

        report.performance = self.governor.snapshot();
        tracing::trace!(
            "Showcase: frame at {:.1} ms (tools_ticked={}, quality={})",
            self.now_ms,
            report.tools_ticked,
            self.applied_quality
        );
        report
    }

    fn write_transforms(&mut self, composed: &ComposedFrame) {
        for (tool, transform) in self.tools.iter().zip(composed.transforms.iter()) {
            let Some(entity) = tool.entity else {
                continue;
            };
            match self.scene.transform_mut(entity) {
                Some(target) => *target = *transform,
                None => tracing::trace!("Showcase: entity {:?} for '{}' is gone", entity, tool.id),
            }
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Feed one input event
    ///
    /// Returns the events it produced. Tool selection from taps fires the
    /// registered listeners.
    pub fn handle_input(&mut self, input: GestureInput) -> GestureEvents {
        let events = self.gestures.handle(input);
        for event in events.iter() {
            self.dispatch(*event);
        }
        events
    }

    fn dispatch(&mut self, event: GestureEvent) -> Option<String> {
        let GestureEvent::Tap { position } = event else {
            return None;
        };

        let entity = self.picker.as_ref()?.pick_at(position.x, position.y)?;
        let id = self
            .tools
            .iter()
            .find(|tool| tool.entity == Some(entity))
            .map(|tool| tool.id.clone())?;

        tracing::debug!("Showcase: selected tool '{}'", id);
        for listener in &mut self.selection_listeners {
            listener(&id);
        }
        Some(id)
    }

    // =========================================================================
    // Quality
    // =========================================================================

    /// Jump to a quality level and apply it to the scene
    pub fn set_quality(&mut self, level: QualityLevel) -> Option<QualityChange> {
        let change = self.governor.adjust_quality(level);
        self.sync_quality();
        change
    }

    /// Pin or release the quality level
    pub fn set_quality_override(&mut self, level: Option<QualityLevel>) -> Option<QualityChange> {
        let change = self.governor.set_override(level);
        self.sync_quality();
        change
    }

    fn sync_quality(&mut self) {
        if self.governor.quality() != self.applied_quality {
            self.applied_quality = self.governor.quality();
            self.scene.apply_quality(self.governor.profile());
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stop everything after the graphics context was lost
    ///
    /// Returns the error for the host to act on; nothing is recovered here.
    pub fn notify_context_lost(&mut self) -> ShowcaseError {
        tracing::warn!("Showcase: graphics context lost, stopping clocks");
        self.tools_clock.stop();
        self.camera_clock.stop();
        self.gestures.reset();
        self.context_lost = true;
        ShowcaseError::ContextLost
    }
}

impl<S: SceneSink + 'static> Showcase<S> {
    /// Drive a shared showcase from a scheduler
    ///
    /// Dropping the returned registration unmounts it. Returns `None` if the
    /// scheduler is gone.
    pub fn mount(showcase: &Rc<RefCell<Self>>, scheduler: &SchedulerHandle) -> Option<FrameRegistration> {
        let weak = Rc::downgrade(showcase);
        scheduler.register_scoped(move |dt| {
            let Some(showcase) = weak.upgrade() else {
                return;
            };
            match showcase.try_borrow_mut() {
                Ok(mut showcase) => {
                    showcase.frame(dt);
                }
                Err(_) => tracing::warn!("Showcase: frame skipped, showcase is borrowed"),
            };
        })
    }
}

impl<S: SceneSink> std::fmt::Debug for Showcase<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Showcase")
            .field("tools", &self.tools.len())
            .field("quality", &self.applied_quality)
            .field("now_ms", &self.now_ms)
            .field("context_lost", &self.context_lost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::{DeviceCapabilities, StaticProbe};
    use crate::scene::{MemoryScene, RectPicker, Transform};
    use forge_animation::{AnimationScheduler, FrameSource};
    use forge_core::Vec2;

    fn desktop() -> StaticProbe {
        StaticProbe(DeviceCapabilities::desktop())
    }

    fn build() -> (Showcase<MemoryScene>, Vec<EntityHandle>) {
        let config = ShowcaseConfig::default();
        let mut scene = MemoryScene::new();
        let handles: Vec<_> = config.tools.iter().map(|tool| scene.spawn(tool.base_position)).collect();

        let mut showcase = Showcase::new(config, scene, &desktop()).unwrap();
        let ids: Vec<String> = showcase.tool_ids().map(str::to_string).collect();
        for (id, handle) in ids.iter().zip(&handles) {
            assert!(showcase.bind_entity(id, *handle));
        }
        (showcase, handles)
    }

    fn transforms(showcase: &Showcase<MemoryScene>, handles: &[EntityHandle]) -> Vec<Transform> {
        handles
            .iter()
            .map(|handle| *showcase.scene().transform(*handle).unwrap())
            .collect()
    }

    #[test]
    fn test_headless_probe_refused() {
        let result = Showcase::new(
            ShowcaseConfig::default(),
            MemoryScene::new(),
            &StaticProbe(DeviceCapabilities::headless()),
        );
        assert!(matches!(result, Err(ShowcaseError::GraphicsUnavailable)));
    }

    #[test]
    fn test_initial_quality_applied() {
        let (showcase, _) = build();
        assert_eq!(showcase.quality(), QualityLevel::Ultra);
        assert_eq!(showcase.scene().quality_writes, 1);
        assert_eq!(showcase.scene().quality().map(|p| p.level), Some(QualityLevel::Ultra));
    }

    #[test]
    fn test_frames_write_scene() {
        let (mut showcase, handles) = build();
        let before = transforms(&showcase, &handles);

        for _ in 0..10 {
            let report = showcase.frame(1.0 / 60.0);
            assert!(report.tools_ticked);
            assert!(report.camera.is_some());
        }

        assert_ne!(transforms(&showcase, &handles), before);
        assert_eq!(showcase.scene().camera_writes, 10);
        assert!((showcase.now_ms() - 10_000.0 / 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_pause_freezes_transforms() {
        let (mut showcase, handles) = build();
        for _ in 0..30 {
            showcase.frame(1.0 / 60.0);
        }

        showcase.clock_mut(ClockTarget::Tools).pause();
        let frozen = transforms(&showcase, &handles);
        for _ in 0..30 {
            let report = showcase.frame(1.0 / 60.0);
            assert!(!report.tools_ticked);
        }
        assert_eq!(transforms(&showcase, &handles), frozen);

        showcase.clock_mut(ClockTarget::Tools).play();
        showcase.frame(1.0 / 60.0);
        assert_ne!(transforms(&showcase, &handles), frozen);
    }

    #[test]
    fn test_tap_selects_tool() {
        let (showcase, handles) = build();
        let picker = RectPicker::new().with_region(handles[1], [100.0, 100.0, 50.0, 50.0]);
        let mut showcase = showcase.with_picker(picker);

        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = selected.clone();
        showcase.on_tool_selected(move |id| sink.borrow_mut().push(id.to_string()));

        let position = Vec2::new(120.0, 120.0);
        showcase.handle_input(GestureInput::PointerDown { position, time_ms: 0.0 });
        showcase.handle_input(GestureInput::PointerUp { position, time_ms: 30.0 });
        assert!(selected.borrow().is_empty());

        let mut reports = Vec::new();
        for _ in 0..30 {
            reports.push(showcase.frame(1.0 / 60.0));
        }

        assert_eq!(selected.borrow().as_slice(), &["drill".to_string()]);
        let picked: Vec<_> = reports.iter().flat_map(|r| r.selected.iter().cloned()).collect();
        assert_eq!(picked, vec!["drill".to_string()]);
    }

    #[test]
    fn test_quality_override_reaches_scene() {
        let (mut showcase, _) = build();
        let change = showcase.set_quality_override(Some(QualityLevel::Low)).unwrap();
        assert_eq!(change.to, QualityLevel::Low);
        assert_eq!(showcase.scene().quality().map(|p| p.level), Some(QualityLevel::Low));

        let report = showcase.frame(1.0 / 60.0);
        assert!(report.quality_change.is_none());
        assert_eq!(report.performance.quality, QualityLevel::Low);
    }

    #[test]
    fn test_context_loss_stops_everything() {
        let (mut showcase, handles) = build();
        showcase.frame(1.0 / 60.0);
        let frozen = transforms(&showcase, &handles);

        let err = showcase.notify_context_lost();
        assert!(matches!(err, ShowcaseError::ContextLost));
        assert!(showcase.is_context_lost());

        let report = showcase.frame(1.0 / 60.0);
        assert!(!report.tools_ticked);
        assert_eq!(transforms(&showcase, &handles), frozen);
        assert_eq!(showcase.scene().camera_writes, 1);
    }

    #[test]
    fn test_mount_and_unmount() {
        let (showcase, _) = build();
        let showcase = Rc::new(RefCell::new(showcase));
        let scheduler = AnimationScheduler::new(FrameSource::Host);

        let registration = Showcase::mount(&showcase, &scheduler.handle()).unwrap();
        assert_eq!(scheduler.callback_count(), 1);

        scheduler.advance(1.0 / 60.0);
        scheduler.advance(1.0 / 60.0);
        assert_eq!(showcase.borrow().scene().camera_writes, 2);

        drop(registration);
        scheduler.advance(1.0 / 60.0);
        assert_eq!(showcase.borrow().scene().camera_writes, 2);
        assert_eq!(scheduler.callback_count(), 0);
    }

    #[test]
    fn test_fling_reaches_camera_in_same_frame() {
        let mut config = ShowcaseConfig::default();
        config.camera.smoothing_enabled = false;
        config.camera.auto_rotate = false;
        let mut showcase = Showcase::new(config, MemoryScene::new(), &desktop()).unwrap();

        showcase.handle_input(GestureInput::PointerDown {
            position: Vec2::ZERO,
            time_ms: 0.0,
        });
        showcase.handle_input(GestureInput::PointerMove {
            position: Vec2::new(20.0, 0.0),
            time_ms: 16.0,
        });
        showcase.frame(1.0 / 60.0);
        showcase.handle_input(GestureInput::PointerUp {
            position: Vec2::new(20.0, 0.0),
            time_ms: 20.0,
        });
        let released = showcase.gestures().state().rotation().y;

        let camera = showcase.frame(1.0 / 60.0).camera.unwrap();
        let coasted = showcase.gestures().state().rotation().y;
        assert!(coasted > released + 0.01);

        let offset = camera.pose.position - camera.pose.target;
        assert!((offset.x.atan2(offset.z) - coasted).abs() < 1e-4);
    }

    #[test]
    fn test_toml_errors_surface() {
        let err = Showcase::from_toml("[performance]\nbogus = 1", MemoryScene::new(), &desktop()).unwrap_err();
        assert!(matches!(err, ShowcaseError::Config(_)));
    }
}
