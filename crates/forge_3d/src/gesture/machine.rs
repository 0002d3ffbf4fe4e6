//! Gesture state machine
//!
//! Turns raw pointer, touch, wheel and voice input into bounded
//! [`GestureState`] mutations plus discrete [`GestureEvent`]s.
//!
//! # Taps
//!
//! A press counts as a tap when it is short and barely moves. A single tap
//! is not reported immediately: it is held as pending and only fired by
//! [`GestureMachine::update`] once the double-tap window has passed. A second
//! tap inside the window cancels the pending tap and fires
//! [`GestureEvent::DoubleTap`] instead.
//!
//! # Input sources
//!
//! Pointer and touch input are mutually exclusive. The first source to press
//! becomes primary until it releases; the other source is ignored meanwhile.
//! Wheel and voice input are accepted at any time.

use super::state::GestureState;
use super::voice::VoiceCommand;
use forge_core::{GestureConfig, Vec2, Vec3};
use smallvec::SmallVec;
use std::fmt;

/// Vibration length for a double tap (ms)
const DOUBLE_TAP_VIBRATION_MS: u32 = 30;

/// Active touch points in screen pixels
pub type TouchPoints = SmallVec<[Vec2; 2]>;

/// Events emitted by a single input or update
pub type GestureEvents = SmallVec<[GestureEvent; 2]>;

/// Raw input, timestamped in host milliseconds
#[derive(Clone, Debug, PartialEq)]
pub enum GestureInput {
    PointerDown { position: Vec2, time_ms: f64 },
    PointerMove { position: Vec2, time_ms: f64 },
    PointerUp { position: Vec2, time_ms: f64 },
    TouchStart { touches: TouchPoints, time_ms: f64 },
    TouchMove { touches: TouchPoints, time_ms: f64 },
    /// `touches` holds the contacts that remain down
    TouchEnd { touches: TouchPoints, time_ms: f64 },
    /// Positive deltas zoom out
    Wheel { delta: f32, time_ms: f64 },
    Voice { transcript: String, time_ms: f64 },
}

impl GestureInput {
    pub fn time_ms(&self) -> f64 {
        match self {
            GestureInput::PointerDown { time_ms, .. }
            | GestureInput::PointerMove { time_ms, .. }
            | GestureInput::PointerUp { time_ms, .. }
            | GestureInput::TouchStart { time_ms, .. }
            | GestureInput::TouchMove { time_ms, .. }
            | GestureInput::TouchEnd { time_ms, .. }
            | GestureInput::Wheel { time_ms, .. }
            | GestureInput::Voice { time_ms, .. } => *time_ms,
        }
    }

    /// Source that must be primary for this input to apply
    pub fn source(&self) -> Option<InputSource> {
        match self {
            GestureInput::PointerDown { .. }
            | GestureInput::PointerMove { .. }
            | GestureInput::PointerUp { .. } => Some(InputSource::Pointer),
            GestureInput::TouchStart { .. }
            | GestureInput::TouchMove { .. }
            | GestureInput::TouchEnd { .. } => Some(InputSource::Touch),
            GestureInput::Wheel { .. } | GestureInput::Voice { .. } => None,
        }
    }
}

/// Pointer-like input family
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputSource {
    Pointer,
    Touch,
}

/// Discrete outcome of gesture processing
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Tap { position: Vec2 },
    DoubleTap { position: Vec2 },
    DragStarted,
    DragEnded,
    PinchStarted,
    PinchEnded,
    Zoomed { zoom: f32 },
    Voice(VoiceCommand),
}

/// Device vibration, when the host has it
pub trait Haptics {
    fn vibrate(&mut self, duration_ms: u32);
}

#[derive(Clone, Copy, Debug)]
struct Press {
    start: Vec2,
    last: Vec2,
    start_ms: f64,
    last_ms: f64,
    dragging: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingTap {
    position: Vec2,
    time_ms: f64,
}

#[derive(Clone, Copy, Debug)]
struct Pinch {
    distance: f32,
    centroid: Vec2,
}

/// Input-to-state machine
pub struct GestureMachine {
    config: GestureConfig,
    state: GestureState,
    primary: Option<InputSource>,
    press: Option<Press>,
    pinch: Option<Pinch>,
    pending_tap: Option<PendingTap>,
    haptics: Option<Box<dyn Haptics>>,
}

impl GestureMachine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            state: GestureState::new(&config),
            config,
            primary: None,
            press: None,
            pinch: None,
            pending_tap: None,
            haptics: None,
        }
    }

    /// Attach a vibration device; ignored unless `haptics` is enabled
    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.set_haptics(Some(Box::new(haptics)));
        self
    }

    pub fn set_haptics(&mut self, haptics: Option<Box<dyn Haptics>>) {
        self.haptics = haptics;
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn primary_source(&self) -> Option<InputSource> {
        self.primary
    }

    /// A single tap is waiting for the double-tap window to pass
    pub fn has_pending_tap(&self) -> bool {
        self.pending_tap.is_some()
    }

    /// Clear all gesture state and any pending tap
    pub fn reset(&mut self) {
        self.state.reset(&self.config);
        self.primary = None;
        self.press = None;
        self.pinch = None;
        self.pending_tap = None;
    }

    /// Process one input
    pub fn handle(&mut self, input: GestureInput) -> GestureEvents {
        let mut events = GestureEvents::new();

        if let (Some(source), Some(primary)) = (input.source(), self.primary) {
            if source != primary {
                tracing::trace!("GestureMachine: ignoring {:?} input while {:?} is primary", source, primary);
                return events;
            }
        }

        match input {
            GestureInput::PointerDown { position, time_ms } => {
                self.primary = Some(InputSource::Pointer);
                self.begin_press(position, time_ms);
            }
            GestureInput::PointerMove { position, time_ms } => {
                self.move_press(position, time_ms, &mut events);
            }
            GestureInput::PointerUp { position, time_ms } => {
                if self.primary == Some(InputSource::Pointer) {
                    self.end_press(position, time_ms, &mut events);
                    self.primary = None;
                }
            }
            GestureInput::TouchStart { touches, time_ms } => {
                self.primary = Some(InputSource::Touch);
                self.touch_start(&touches, time_ms, &mut events);
            }
            GestureInput::TouchMove { touches, time_ms } => {
                self.touch_move(&touches, time_ms, &mut events);
            }
            GestureInput::TouchEnd { touches, time_ms } => {
                if self.primary == Some(InputSource::Touch) {
                    self.touch_end(&touches, time_ms, &mut events);
                }
            }
            GestureInput::Wheel { delta, .. } => {
                if delta.is_finite() && delta.abs() >= self.config.wheel_threshold {
                    self.state.zoom_by(-delta * self.config.zoom_sensitivity, &self.config);
                    events.push(GestureEvent::Zoomed {
                        zoom: self.state.zoom(),
                    });
                }
            }
            GestureInput::Voice { transcript, .. } => match VoiceCommand::parse(&transcript) {
                Some(command) => {
                    command.apply(&mut self.state, &self.config);
                    tracing::debug!("GestureMachine: voice command '{}'", command);
                    events.push(GestureEvent::Voice(command));
                }
                None => tracing::trace!("GestureMachine: ignoring voice input {:?}", transcript),
            },
        }

        events
    }

    /// Advance time-based behavior
    ///
    /// Fires the pending single tap once the double-tap window has passed and
    /// coasts on fling velocity while no gesture is active.
    pub fn update(&mut self, now_ms: f64, dt: f32) -> GestureEvents {
        let mut events = GestureEvents::new();
        self.state.apply_inertia(dt, &self.config);
        self.fire_expired_tap(now_ms, &mut events);
        events
    }

    // =========================================================================
    // Presses
    // =========================================================================

    fn begin_press(&mut self, position: Vec2, time_ms: f64) {
        self.press = Some(Press {
            start: position,
            last: position,
            start_ms: time_ms,
            last_ms: time_ms,
            dragging: false,
        });
        self.state.set_velocity(Vec2::ZERO);
    }

    fn move_press(&mut self, position: Vec2, time_ms: f64, events: &mut GestureEvents) {
        let Some(press) = self.press.as_mut() else {
            return;
        };

        if !press.dragging && position.distance(press.start) > self.config.tap_max_distance {
            press.dragging = true;
            self.state.is_dragging = true;
            self.state.is_rotating = true;
            events.push(GestureEvent::DragStarted);
        }

        if press.dragging {
            let delta = position - press.last;
            let sensitivity = self.config.rotation_sensitivity;
            self.state
                .rotate_by(Vec3::new(delta.y * sensitivity, delta.x * sensitivity, 0.0), &self.config);

            let dt_s = ((time_ms - press.last_ms) / 1000.0) as f32;
            if dt_s > 0.0 {
                self.state.set_velocity(delta * (1.0 / dt_s));
            }
        }

        press.last = position;
        press.last_ms = time_ms;
    }

    fn end_press(&mut self, position: Vec2, time_ms: f64, events: &mut GestureEvents) {
        let Some(press) = self.press.take() else {
            return;
        };

        if press.dragging {
            self.state.is_dragging = false;
            self.state.is_rotating = false;
            events.push(GestureEvent::DragEnded);
            return;
        }

        let duration = time_ms - press.start_ms;
        if duration <= self.config.tap_max_duration_ms as f64
            && position.distance(press.start) <= self.config.tap_max_distance
        {
            self.register_tap(position, time_ms, events);
        }
    }

    // =========================================================================
    // Touch
    // =========================================================================

    fn touch_start(&mut self, touches: &[Vec2], time_ms: f64, events: &mut GestureEvents) {
        match touches {
            [] => {}
            [single] => {
                if self.pinch.is_none() {
                    self.begin_press(*single, time_ms);
                }
            }
            [first, second, ..] => {
                // A second finger turns any press into a pinch; no tap follows
                if let Some(press) = self.press.take() {
                    if press.dragging {
                        self.state.is_dragging = false;
                        self.state.is_rotating = false;
                        events.push(GestureEvent::DragEnded);
                    }
                }
                if self.pinch.is_none() {
                    self.state.is_pinching = true;
                    events.push(GestureEvent::PinchStarted);
                }
                self.pinch = Some(Pinch {
                    distance: first.distance(*second),
                    centroid: (*first + *second) * 0.5,
                });
            }
        }
    }

    fn touch_move(&mut self, touches: &[Vec2], time_ms: f64, events: &mut GestureEvents) {
        match touches {
            [] => {}
            [single] => self.move_press(*single, time_ms, events),
            [first, second, ..] => {
                let Some(pinch) = self.pinch.as_mut() else {
                    return;
                };

                let distance = first.distance(*second);
                let centroid = (*first + *second) * 0.5;

                if pinch.distance > f32::EPSILON && distance > f32::EPSILON {
                    let zoom = self.state.zoom() * distance / pinch.distance;
                    self.state.set_zoom(zoom, &self.config);
                    events.push(GestureEvent::Zoomed {
                        zoom: self.state.zoom(),
                    });
                }

                let shift = centroid - pinch.centroid;
                let sensitivity = self.config.pan_sensitivity;
                self.state
                    .pan_by(Vec2::new(shift.x * sensitivity, -shift.y * sensitivity), &self.config);

                pinch.distance = distance;
                pinch.centroid = centroid;
            }
        }
    }

    fn touch_end(&mut self, remaining: &[Vec2], time_ms: f64, events: &mut GestureEvents) {
        if self.pinch.is_some() {
            if remaining.len() < 2 {
                self.pinch = None;
                self.state.is_pinching = false;
                events.push(GestureEvent::PinchEnded);
            }
        } else if let Some(press) = self.press {
            self.end_press(press.last, time_ms, events);
        }

        if remaining.is_empty() {
            self.press = None;
            self.primary = None;
        }
    }

    // =========================================================================
    // Taps
    // =========================================================================

    fn register_tap(&mut self, position: Vec2, time_ms: f64, events: &mut GestureEvents) {
        let window = self.config.double_tap_window_ms as f64;

        match self.pending_tap.take() {
            Some(pending) if time_ms - pending.time_ms <= window => {
                self.state.reset_view(&self.config);
                events.push(GestureEvent::DoubleTap { position });
                if self.config.haptics {
                    if let Some(haptics) = self.haptics.as_mut() {
                        haptics.vibrate(DOUBLE_TAP_VIBRATION_MS);
                    }
                }
                tracing::debug!("GestureMachine: double tap at ({:.0}, {:.0})", position.x, position.y);
            }
            stale => {
                // A pending tap whose window already ran out is still a single tap
                if let Some(pending) = stale {
                    events.push(GestureEvent::Tap {
                        position: pending.position,
                    });
                }
                self.pending_tap = Some(PendingTap { position, time_ms });
            }
        }
    }

    fn fire_expired_tap(&mut self, now_ms: f64, events: &mut GestureEvents) {
        let window = self.config.double_tap_window_ms as f64;
        if let Some(pending) = self.pending_tap {
            if now_ms - pending.time_ms > window {
                self.pending_tap = None;
                events.push(GestureEvent::Tap {
                    position: pending.position,
                });
            }
        }
    }
}

impl fmt::Debug for GestureMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureMachine")
            .field("state", &self.state)
            .field("primary", &self.primary)
            .field("pending_tap", &self.pending_tap)
            .field("haptics", &self.haptics.is_some())
            .finish()
    }
}
