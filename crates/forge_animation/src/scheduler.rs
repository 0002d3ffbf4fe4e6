//! Frame scheduler
//!
//! Single-threaded registry of per-frame callbacks. The host either forwards
//! its own frame deltas ([`FrameSource::Host`]) or lets the scheduler measure
//! wall-clock time ([`FrameSource::Timer`]). The choice is made once, at
//! construction.
//!
//! Components never reach for an ambient scheduler: they receive a
//! [`SchedulerHandle`] and register through it. Registrations are released by
//! `unregister` or by dropping a [`FrameRegistration`].

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a registered frame callback
    pub struct TickCallbackId;
}

/// Per-frame callback, invoked with the frame delta in seconds
pub type TickCallback = Box<dyn FnMut(f32)>;

/// Where frame deltas come from
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FrameSource {
    /// The host calls [`AnimationScheduler::advance`] with its own delta
    #[default]
    Host,
    /// The scheduler measures elapsed time on [`AnimationScheduler::tick`]
    Timer { target_fps: u32 },
}

/// Internal state of the scheduler
struct SchedulerInner {
    /// `None` while the callback is running
    callbacks: SlotMap<TickCallbackId, Option<TickCallback>>,
    last_frame: Option<Instant>,
    frame_count: u64,
}

/// The scheduler that drives every registered frame callback
///
/// Held by the host and shared with components via [`SchedulerHandle`].
///
/// ```ignore
/// let scheduler = AnimationScheduler::new(FrameSource::Timer { target_fps: 60 });
/// let _registration = scheduler.handle().register_scoped(|dt| println!("{dt}"));
/// scheduler.tick();
/// ```
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
    source: FrameSource,
}

impl AnimationScheduler {
    pub fn new(source: FrameSource) -> Self {
        let source = match source {
            FrameSource::Timer { target_fps: 0 } => {
                tracing::warn!("AnimationScheduler: target_fps 0 is invalid, using 60");
                FrameSource::Timer { target_fps: 60 }
            }
            other => other,
        };
        tracing::debug!("AnimationScheduler: created with {:?}", source);

        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                callbacks: SlotMap::with_key(),
                last_frame: None,
                frame_count: 0,
            })),
            source,
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn source(&self) -> FrameSource {
        self.source
    }

    /// Period between timer frames, `None` for host-driven scheduling
    pub fn frame_interval(&self) -> Option<Duration> {
        match self.source {
            FrameSource::Host => None,
            FrameSource::Timer { target_fps } => {
                Some(Duration::from_secs_f64(1.0 / target_fps as f64))
            }
        }
    }

    /// Measure the wall-clock delta since the previous tick and advance
    ///
    /// The first tick uses the timer period (or zero for host scheduling).
    /// Returns the delta that was delivered, in seconds.
    pub fn tick(&self) -> f32 {
        let now = Instant::now();
        let dt = {
            let mut inner = self.inner.borrow_mut();
            let dt = match inner.last_frame {
                Some(last) => (now - last).as_secs_f32(),
                None => self
                    .frame_interval()
                    .map(|interval| interval.as_secs_f32())
                    .unwrap_or(0.0),
            };
            inner.last_frame = Some(now);
            dt
        };
        self.advance(dt);
        dt
    }

    /// Run every registered callback once with the given delta (seconds)
    ///
    /// Callbacks may unregister themselves or others. Callbacks registered
    /// during this frame first run on the next one.
    pub fn advance(&self, dt: f32) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let ids: Vec<TickCallbackId> = {
            let mut inner = self.inner.borrow_mut();
            inner.frame_count += 1;
            inner.callbacks.keys().collect()
        };

        tracing::trace!(
            "AnimationScheduler: frame dt={:.4}s callbacks={}",
            dt,
            ids.len()
        );

        for id in ids {
            let taken = self
                .inner
                .borrow_mut()
                .callbacks
                .get_mut(id)
                .and_then(Option::take);

            let Some(mut callback) = taken else {
                continue;
            };

            callback(dt);

            // Removed while running: drop it after the borrow is released
            let orphan = {
                let mut inner = self.inner.borrow_mut();
                match inner.callbacks.get_mut(id) {
                    Some(slot) => {
                        *slot = Some(callback);
                        None
                    }
                    None => Some(callback),
                }
            };
            drop(orphan);
        }
    }

    /// Number of live registrations
    pub fn callback_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Frames delivered so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(FrameSource::Host)
    }
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("source", &self.source)
            .field("callbacks", &self.callback_count())
            .field("frames", &self.frame_count())
            .finish()
    }
}

/// A weak handle to the scheduler
///
/// This is passed to components that need per-frame callbacks.
/// It won't prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a frame callback
    ///
    /// Returns `None` if the scheduler is gone.
    pub fn register<F>(&self, callback: F) -> Option<TickCallbackId>
    where
        F: FnMut(f32) + 'static,
    {
        let inner = self.inner.upgrade()?;
        let callback: TickCallback = Box::new(callback);
        let id = inner.borrow_mut().callbacks.insert(Some(callback));
        tracing::debug!("AnimationScheduler: registered callback {:?}", id);
        Some(id)
    }

    /// Register a frame callback that is removed when the token drops
    pub fn register_scoped<F>(&self, callback: F) -> Option<FrameRegistration>
    where
        F: FnMut(f32) + 'static,
    {
        self.register(callback).map(|id| FrameRegistration {
            handle: self.clone(),
            id,
        })
    }

    /// Remove a frame callback
    ///
    /// Unknown or already removed ids are ignored.
    pub fn unregister(&self, id: TickCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            // Bind first so the callback drops after the borrow ends
            let removed = inner.borrow_mut().callbacks.remove(id);
            if removed.is_some() {
                tracing::debug!("AnimationScheduler: unregistered callback {:?}", id);
            }
        }
    }

    /// Check if a callback is still registered
    pub fn is_registered(&self, id: TickCallbackId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().callbacks.contains_key(id))
            .unwrap_or(false)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Registration token that unregisters its callback on drop
#[must_use = "dropping the registration unregisters the callback"]
pub struct FrameRegistration {
    handle: SchedulerHandle,
    id: TickCallbackId,
}

impl FrameRegistration {
    pub fn id(&self) -> TickCallbackId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_registered(self.id)
    }
}

impl Drop for FrameRegistration {
    fn drop(&mut self) {
        self.handle.unregister(self.id);
    }
}

impl fmt::Debug for FrameRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRegistration")
            .field("id", &self.id)
            .finish()
    }
}
