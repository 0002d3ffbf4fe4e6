//! Adaptive quality governor
//!
//! Samples frame time every frame, keeps rolling averages and moves the
//! quality level one step at a time. Evaluation is rate-limited by the
//! monitoring interval, and a dead zone between the down and up thresholds
//! keeps adjacent levels from flapping. Reaching `Ultra` needs a larger
//! margin than the intermediate steps.

use super::profile::{QualityIndexed, QualityProfile};
use super::window::RollingWindow;
use forge_core::{PerformanceConfig, QualityLevel};
use serde::Serialize;
use std::fmt;

/// Step thresholds relative to the target frame rate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityThresholds {
    /// Step down when average fps falls below `target * ratio`
    pub downgrade_fps_ratio: f32,
    /// ...and average frame time exceeds this (ms)
    pub downgrade_frame_time_ms: f32,
    /// Step up when average fps exceeds `target * ratio`
    pub upgrade_fps_ratio: f32,
    /// ...and average frame time is below this (ms)
    pub upgrade_frame_time_ms: f32,
    /// Stricter fps ratio required to enter `Ultra`
    pub ultra_fps_ratio: f32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            downgrade_fps_ratio: 0.8,
            downgrade_frame_time_ms: 20.0,
            upgrade_fps_ratio: 1.1,
            upgrade_frame_time_ms: 12.0,
            ultra_fps_ratio: 1.3,
        }
    }
}

/// Why the quality level changed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeReason {
    /// Rolling averages crossed a threshold
    Adaptive,
    /// `adjust_quality` was called
    Explicit,
    /// An override was pinned
    Override,
}

/// A quality transition
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QualityChange {
    pub from: QualityLevel,
    pub to: QualityLevel,
    pub reason: ChangeReason,
}

/// Rolling metrics for on-screen diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub quality: QualityLevel,
}

impl PerformanceSnapshot {
    /// Serialize for a diagnostics overlay
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

type QualityListener = Box<dyn FnMut(&QualityChange)>;

/// Frame-time driven quality controller
///
/// The sole writer of the current quality level.
pub struct PerformanceGovernor {
    target_fps: f32,
    adaptive: bool,
    override_level: Option<QualityLevel>,
    thresholds: QualityThresholds,
    monitoring_interval_ms: f64,
    /// Time since the last evaluation (ms)
    accumulated_ms: f64,
    fps_history: RollingWindow,
    frame_time_history: RollingWindow,
    quality: QualityLevel,
    profiles: QualityIndexed<QualityProfile>,
    listeners: Vec<QualityListener>,
}

impl PerformanceGovernor {
    /// Create a governor starting at `initial`
    ///
    /// A configured `performance_level` wins over `initial` and pins the level.
    pub fn new(config: &PerformanceConfig, initial: QualityLevel) -> Self {
        let quality = config.performance_level.unwrap_or(initial);
        tracing::info!(
            "PerformanceGovernor: starting at {} (target {} fps, adaptive={})",
            quality,
            config.target_fps,
            config.adaptive_quality && config.performance_level.is_none()
        );

        Self {
            target_fps: config.target_fps.max(1.0),
            adaptive: config.adaptive_quality,
            override_level: config.performance_level,
            thresholds: QualityThresholds::default(),
            monitoring_interval_ms: config.monitoring_interval_ms.max(1.0) as f64,
            accumulated_ms: 0.0,
            fps_history: RollingWindow::new(config.history_capacity),
            frame_time_history: RollingWindow::new(config.history_capacity),
            quality,
            profiles: QualityProfile::ladder(config),
            listeners: Vec::new(),
        }
    }

    /// Replace the step thresholds
    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Register a listener for every quality change
    pub fn on_quality_change<F: FnMut(&QualityChange) + 'static>(&mut self, f: F) {
        self.listeners.push(Box::new(f));
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Record one frame and evaluate once per monitoring interval
    ///
    /// Non-positive or non-finite deltas are ignored.
    pub fn record_frame(&mut self, dt_seconds: f32) -> Option<QualityChange> {
        if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return None;
        }

        let frame_time_ms = dt_seconds * 1000.0;
        self.fps_history.push(1.0 / dt_seconds);
        self.frame_time_history.push(frame_time_ms);

        self.accumulated_ms += frame_time_ms as f64;
        if self.accumulated_ms < self.monitoring_interval_ms {
            return None;
        }
        self.accumulated_ms = 0.0;

        if !self.is_adaptive() {
            return None;
        }

        let target = self.evaluate()?;
        self.transition(target, ChangeReason::Adaptive)
    }

    fn evaluate(&self) -> Option<QualityLevel> {
        let avg_fps = self.fps_history.average()?;
        let avg_frame_time = self.frame_time_history.average()?;
        let t = &self.thresholds;

        tracing::trace!(
            "PerformanceGovernor: avg {:.1} fps / {:.2} ms at {}",
            avg_fps,
            avg_frame_time,
            self.quality
        );

        if avg_fps < self.target_fps * t.downgrade_fps_ratio
            && avg_frame_time > t.downgrade_frame_time_ms
        {
            let next = self.quality.step_down();
            return (next != self.quality).then_some(next);
        }

        if avg_fps > self.target_fps * t.upgrade_fps_ratio
            && avg_frame_time < t.upgrade_frame_time_ms
        {
            let next = self.quality.step_up();
            if next == self.quality {
                return None;
            }
            if next == QualityLevel::Ultra && avg_fps <= self.target_fps * t.ultra_fps_ratio {
                return None;
            }
            return Some(next);
        }

        None
    }

    fn transition(&mut self, to: QualityLevel, reason: ChangeReason) -> Option<QualityChange> {
        if to == self.quality {
            return None;
        }
        let change = QualityChange {
            from: self.quality,
            to,
            reason,
        };
        self.quality = to;
        tracing::info!(
            "PerformanceGovernor: quality {} -> {} ({:?})",
            change.from,
            change.to,
            reason
        );
        for listener in &mut self.listeners {
            listener(&change);
        }
        Some(change)
    }

    // =========================================================================
    // Controls
    // =========================================================================

    /// Jump to a level
    ///
    /// May skip levels. Ignored while an override is pinned.
    pub fn adjust_quality(&mut self, level: QualityLevel) -> Option<QualityChange> {
        if self.override_level.is_some() {
            tracing::debug!("PerformanceGovernor: adjust_quality ignored, override pinned");
            return None;
        }
        self.transition(level, ChangeReason::Explicit)
    }

    /// Pin a level and suspend adaptation, or release the pin with `None`
    pub fn set_override(&mut self, level: Option<QualityLevel>) -> Option<QualityChange> {
        self.override_level = level;
        self.accumulated_ms = 0.0;
        match level {
            Some(level) => self.transition(level, ChangeReason::Override),
            None => {
                tracing::debug!("PerformanceGovernor: override released");
                None
            }
        }
    }

    /// Enable or disable adaptation
    pub fn set_adaptive(&mut self, adaptive: bool) {
        self.adaptive = adaptive;
        self.accumulated_ms = 0.0;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn quality(&self) -> QualityLevel {
        self.quality
    }

    /// Profile of the current level
    pub fn profile(&self) -> &QualityProfile {
        &self.profiles[self.quality]
    }

    pub fn profiles(&self) -> &QualityIndexed<QualityProfile> {
        &self.profiles
    }

    /// Whether runtime adaptation is active
    pub fn is_adaptive(&self) -> bool {
        self.adaptive && self.override_level.is_none()
    }

    pub fn override_level(&self) -> Option<QualityLevel> {
        self.override_level
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    pub fn target_fps(&self) -> f32 {
        self.target_fps
    }

    /// Rolling averages and current level
    pub fn snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            fps: self.fps_history.average().unwrap_or(0.0),
            frame_time_ms: self.frame_time_history.average().unwrap_or(0.0),
            quality: self.quality,
        }
    }
}

impl fmt::Debug for PerformanceGovernor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceGovernor")
            .field("target_fps", &self.target_fps)
            .field("quality", &self.quality)
            .field("adaptive", &self.adaptive)
            .field("override_level", &self.override_level)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn governor(initial: QualityLevel) -> PerformanceGovernor {
        PerformanceGovernor::new(&PerformanceConfig::default(), initial)
    }

    /// Feed `frames` frames at a constant rate, collecting changes
    fn run(governor: &mut PerformanceGovernor, fps: f32, frames: usize) -> Vec<QualityChange> {
        (0..frames)
            .filter_map(|_| governor.record_frame(1.0 / fps))
            .collect()
    }

    #[test]
    fn test_low_fps_steps_down_one_level() {
        let mut gov = governor(QualityLevel::Ultra);

        // 25 frames at 20 fps = 1250 ms, one evaluation
        let changes = run(&mut gov, 20.0, 25);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].from, QualityLevel::Ultra);
        assert_eq!(changes[0].to, QualityLevel::High);
        assert_eq!(changes[0].reason, ChangeReason::Adaptive);
        assert_eq!(gov.quality(), QualityLevel::High);
    }

    #[test]
    fn test_no_change_before_interval() {
        let mut gov = governor(QualityLevel::Ultra);
        let changes = run(&mut gov, 20.0, 15);
        assert!(changes.is_empty());
        assert_eq!(gov.quality(), QualityLevel::Ultra);
    }

    #[test]
    fn test_sustained_low_fps_walks_down_to_low() {
        let mut gov = governor(QualityLevel::Ultra);
        let changes = run(&mut gov, 20.0, 200);

        let levels: Vec<_> = changes.iter().map(|c| c.to).collect();
        assert_eq!(
            levels,
            vec![QualityLevel::High, QualityLevel::Medium, QualityLevel::Low]
        );
        assert_eq!(gov.quality(), QualityLevel::Low);
    }

    #[test]
    fn test_dead_zone_holds() {
        let mut gov = governor(QualityLevel::Medium);
        // 60 fps on a 60 fps target sits between the thresholds
        let changes = run(&mut gov, 60.0, 600);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_ultra_requires_larger_margin() {
        // 70 fps clears the fps ratio but 14.3 ms misses the frame-time bar
        let mut gov = governor(QualityLevel::High);
        assert!(run(&mut gov, 70.0, 300).is_empty());

        // 100 fps clears the upgrade ratio but not the ultra ratio on a 80 fps target
        let config = PerformanceConfig {
            target_fps: 80.0,
            ..PerformanceConfig::default()
        };
        let mut gov = PerformanceGovernor::new(&config, QualityLevel::High);
        assert!(run(&mut gov, 100.0, 300).is_empty());

        // The same rate lifts Medium to High
        let mut gov = PerformanceGovernor::new(&config, QualityLevel::Medium);
        let changes = run(&mut gov, 100.0, 150);
        assert_eq!(changes.len(), 1);
        assert_eq!(gov.quality(), QualityLevel::High);

        // 120 fps clears both on a 60 fps target
        let mut gov = governor(QualityLevel::High);
        let changes = run(&mut gov, 120.0, 150);
        assert_eq!(changes.len(), 1);
        assert_eq!(gov.quality(), QualityLevel::Ultra);
    }

    #[test]
    fn test_override_pins_level() {
        let mut gov = governor(QualityLevel::High);
        let change = gov.set_override(Some(QualityLevel::Ultra)).unwrap();
        assert_eq!(change.reason, ChangeReason::Override);
        assert!(!gov.is_adaptive());

        assert!(run(&mut gov, 10.0, 100).is_empty());
        assert_eq!(gov.quality(), QualityLevel::Ultra);
        assert!(gov.adjust_quality(QualityLevel::Low).is_none());

        gov.set_override(None);
        assert!(gov.is_adaptive());
        assert_eq!(run(&mut gov, 10.0, 12).len(), 1);
    }

    #[test]
    fn test_configured_level_pins_at_start() {
        let config = PerformanceConfig {
            performance_level: Some(QualityLevel::Low),
            ..PerformanceConfig::default()
        };
        let mut gov = PerformanceGovernor::new(&config, QualityLevel::Ultra);
        assert_eq!(gov.quality(), QualityLevel::Low);
        assert!(run(&mut gov, 200.0, 400).is_empty());
    }

    #[test]
    fn test_adjust_quality_may_skip_levels() {
        let mut gov = governor(QualityLevel::Ultra);
        let change = gov.adjust_quality(QualityLevel::Low).unwrap();
        assert_eq!(change.reason, ChangeReason::Explicit);
        assert_eq!(gov.profile().level, QualityLevel::Low);
        assert!(gov.adjust_quality(QualityLevel::Low).is_none());
    }

    #[test]
    fn test_listeners_notified() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut gov = governor(QualityLevel::High);
        gov.on_quality_change(move |change| sink.borrow_mut().push(change.to));

        gov.adjust_quality(QualityLevel::Medium);
        run(&mut gov, 20.0, 25);

        assert_eq!(*seen.borrow(), vec![QualityLevel::Medium, QualityLevel::Low]);
    }

    #[test]
    fn test_invalid_frames_ignored() {
        let mut gov = governor(QualityLevel::High);
        assert!(gov.record_frame(0.0).is_none());
        assert!(gov.record_frame(-1.0).is_none());
        assert!(gov.record_frame(f32::NAN).is_none());
        assert_eq!(gov.snapshot().fps, 0.0);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let mut gov = governor(QualityLevel::Medium);
        gov.record_frame(0.02);
        let json: serde_json::Value = serde_json::from_str(&gov.snapshot().to_json().unwrap()).unwrap();

        assert!((json["fps"].as_f64().unwrap() - 50.0).abs() < 1e-3);
        assert!((json["frameTimeMs"].as_f64().unwrap() - 20.0).abs() < 1e-3);
        assert_eq!(json["quality"], "medium");
    }
}
