//! Animation clock
//!
//! One clock per animated entity or group. A clock owns a logical time that
//! only advances while playing, applies play/pause/stop/seek/reverse and
//! looping semantics, and reports eased progress through callbacks.
//!
//! ```text
//!   idle ──play──▶ playing ◀──play── paused
//!                    │  └────pause────▶ │
//!                    ▼ (non-looping end)
//!                 complete
//!   stop: any state ──▶ idle
//! ```

use crate::easing::Easing;
use forge_core::MIN_DURATION_MS;
use serde::Serialize;
use std::fmt;

/// Playback direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayDirection {
    #[default]
    Forward,
    Reverse,
}

impl PlayDirection {
    pub fn flipped(self) -> Self {
        match self {
            PlayDirection::Forward => PlayDirection::Reverse,
            PlayDirection::Reverse => PlayDirection::Forward,
        }
    }
}

/// What happens to the direction when a looping clock wraps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopMode {
    /// Keep the direction
    #[default]
    Restart,
    /// Flip the direction on every wrap (ping-pong)
    Alternate,
}

/// Lifecycle state of a clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    #[default]
    Idle,
    Playing,
    Paused,
    /// Reached the end of a non-looping run
    Complete,
}

/// Static configuration of a clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockConfig {
    /// Length of one run (ms)
    pub duration_ms: f64,
    /// Time that must pass after `play` before progress advances (ms)
    pub delay_ms: f64,
    pub looping: bool,
    pub direction: PlayDirection,
    pub loop_mode: LoopMode,
    pub easing: Easing,
}

impl ClockConfig {
    /// Create a forward, non-looping, linear configuration
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            delay_ms: 0.0,
            looping: false,
            direction: PlayDirection::Forward,
            loop_mode: LoopMode::Restart,
            easing: Easing::Linear,
        }
    }

    /// Enable looping
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Loop and flip direction on every wrap
    pub fn alternate(mut self) -> Self {
        self.looping = true;
        self.loop_mode = LoopMode::Alternate;
        self
    }

    /// Set the start delay
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the easing applied to reported progress
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Start in reverse
    pub fn reversed(mut self) -> Self {
        self.direction = PlayDirection::Reverse;
        self
    }

    /// Replace unusable values with safe defaults
    pub fn validated(mut self) -> Self {
        let min = MIN_DURATION_MS as f64;
        if !self.duration_ms.is_finite() || self.duration_ms < min {
            tracing::warn!(
                "AnimationClock: duration {} ms is not positive, using {} ms",
                self.duration_ms,
                min
            );
            self.duration_ms = min;
        }
        if !self.delay_ms.is_finite() || self.delay_ms < 0.0 {
            tracing::warn!("AnimationClock: delay {} ms is invalid, using 0", self.delay_ms);
            self.delay_ms = 0.0;
        }
        self
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::new(1_000.0)
    }
}

/// Snapshot of a clock for diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationClockState {
    pub elapsed_ms: f64,
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_complete: bool,
    pub duration_ms: f64,
    pub delay_ms: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub direction: PlayDirection,
    pub loop_count: u32,
}

type StartCallback = Box<dyn FnMut()>;
type UpdateCallback = Box<dyn FnMut(f32)>;
type LoopCallback = Box<dyn FnMut(u32)>;
type CompleteCallback = Box<dyn FnMut()>;

#[derive(Default)]
struct ClockCallbacks {
    on_start: Option<StartCallback>,
    on_update: Option<UpdateCallback>,
    on_loop: Option<LoopCallback>,
    on_complete: Option<CompleteCallback>,
}

/// Per-entity animation clock
pub struct AnimationClock {
    config: ClockConfig,
    state: ClockState,
    elapsed_ms: f64,
    delay_remaining_ms: f64,
    loop_count: u32,
    direction: PlayDirection,
    /// Set by the first `play` of a cycle, cleared by `stop`
    has_started: bool,
    callbacks: ClockCallbacks,
}

impl AnimationClock {
    /// Create an idle clock
    pub fn new(config: ClockConfig) -> Self {
        let config = config.validated();
        Self {
            config,
            state: ClockState::Idle,
            elapsed_ms: 0.0,
            delay_remaining_ms: config.delay_ms,
            loop_count: 0,
            direction: config.direction,
            has_started: false,
            callbacks: ClockCallbacks::default(),
        }
    }

    /// Called once per play cycle when playback first begins
    pub fn on_start<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_start = Some(Box::new(f));
        self
    }

    /// Called with eased progress whenever progress changes
    pub fn on_update<F: FnMut(f32) + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_update = Some(Box::new(f));
        self
    }

    /// Called with the new loop count once per tick that wraps
    ///
    /// A tick spanning several periods still counts each of them.
    pub fn on_loop<F: FnMut(u32) + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_loop = Some(Box::new(f));
        self
    }

    /// Called once when a non-looping clock reaches its end
    pub fn on_complete<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_complete = Some(Box::new(f));
        self
    }

    // =========================================================================
    // Controls
    // =========================================================================

    /// Start or resume playback
    ///
    /// No effect while playing or once complete; use `restart` to replay.
    pub fn play(&mut self) {
        match self.state {
            ClockState::Idle | ClockState::Paused => {
                self.state = ClockState::Playing;
                if !self.has_started {
                    self.has_started = true;
                    if let Some(cb) = self.callbacks.on_start.as_mut() {
                        cb();
                    }
                }
            }
            ClockState::Playing => {}
            ClockState::Complete => {
                tracing::debug!("AnimationClock: play() ignored on a completed clock");
            }
        }
    }

    /// Freeze progress
    pub fn pause(&mut self) {
        if self.state == ClockState::Playing {
            self.state = ClockState::Paused;
        }
    }

    /// Return to idle, clearing elapsed time, delay and loop count
    pub fn stop(&mut self) {
        self.state = ClockState::Idle;
        self.elapsed_ms = 0.0;
        self.delay_remaining_ms = self.config.delay_ms;
        self.loop_count = 0;
        self.direction = self.config.direction;
        self.has_started = false;
    }

    /// Stop then play
    pub fn restart(&mut self) {
        self.stop();
        self.play();
    }

    /// Jump to a progress fraction
    ///
    /// Sets elapsed time directly; callers must not assume continuity with
    /// the previous frame. A completed clock seeked before its end becomes
    /// paused so it can be played again.
    pub fn seek(&mut self, progress: f32) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.elapsed_ms = progress as f64 * self.config.duration_ms;
        if self.state == ClockState::Complete && progress < 1.0 {
            self.state = ClockState::Paused;
        }
        self.emit_update();
    }

    /// Flip the playback direction
    pub fn reverse(&mut self) {
        self.direction = self.direction.flipped();
    }

    /// Advance by a wall-clock delta
    ///
    /// Returns `true` if progress changed this tick.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        if self.state != ClockState::Playing || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return false;
        }

        let mut dt_ms = dt_ms;
        if self.delay_remaining_ms > 0.0 {
            if dt_ms <= self.delay_remaining_ms {
                self.delay_remaining_ms -= dt_ms;
                return false;
            }
            dt_ms -= self.delay_remaining_ms;
            self.delay_remaining_ms = 0.0;
        }

        self.elapsed_ms += dt_ms;
        let duration = self.config.duration_ms;

        if self.elapsed_ms >= duration {
            if self.config.looping {
                // Float-to-int casts saturate
                let wraps = self.elapsed_ms.div_euclid(duration) as u64;
                self.elapsed_ms = self.elapsed_ms.rem_euclid(duration);
                self.loop_count = self.loop_count.saturating_add(wraps.min(u32::MAX as u64) as u32);
                if self.config.loop_mode == LoopMode::Alternate && wraps % 2 == 1 {
                    self.direction = self.direction.flipped();
                }
                let count = self.loop_count;
                if let Some(cb) = self.callbacks.on_loop.as_mut() {
                    cb(count);
                }
            } else {
                self.elapsed_ms = duration;
                self.state = ClockState::Complete;
                self.emit_update();
                if let Some(cb) = self.callbacks.on_complete.as_mut() {
                    cb();
                }
                return true;
            }
        }

        self.emit_update();
        true
    }

    fn emit_update(&mut self) {
        let eased = self.eased_progress();
        if let Some(cb) = self.callbacks.on_update.as_mut() {
            cb(eased);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Linear progress of the current run, `clamp(elapsed / duration, 0, 1)`
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / self.config.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Progress with the current direction applied
    pub fn directed_progress(&self) -> f32 {
        match self.direction {
            PlayDirection::Forward => self.progress(),
            PlayDirection::Reverse => 1.0 - self.progress(),
        }
    }

    /// Directed progress shaped by the configured easing
    pub fn eased_progress(&self) -> f32 {
        self.config.easing.apply(self.directed_progress())
    }

    /// Elapsed time in the current run (ms)
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Monotone time across wraps: `loop_count * duration + elapsed`
    pub fn total_elapsed_ms(&self) -> f64 {
        self.loop_count as f64 * self.config.duration_ms + self.elapsed_ms
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    pub fn is_complete(&self) -> bool {
        self.state == ClockState::Complete
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Diagnostics snapshot
    pub fn snapshot(&self) -> AnimationClockState {
        AnimationClockState {
            elapsed_ms: self.elapsed_ms,
            is_playing: self.is_playing(),
            is_paused: self.is_paused(),
            is_complete: self.is_complete(),
            duration_ms: self.config.duration_ms,
            delay_ms: self.config.delay_ms,
            looping: self.config.looping,
            direction: self.direction,
            loop_count: self.loop_count,
        }
    }
}

impl fmt::Debug for AnimationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationClock")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("loop_count", &self.loop_count)
            .field("direction", &self.direction)
            .finish()
    }
}
