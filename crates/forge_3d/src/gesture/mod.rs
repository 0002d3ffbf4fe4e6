//! Gesture input
//!
//! - [`GestureMachine`] - pointer, touch, wheel and voice input to state
//! - [`GestureState`] - the bounded zoom/rotation/pan the camera reads
//! - [`VoiceCommand`] - fixed spoken phrases

mod machine;
mod state;
mod voice;

pub use machine::{
    GestureEvent, GestureEvents, GestureInput, GestureMachine, Haptics, InputSource, TouchPoints,
};
pub use state::{GestureState, VELOCITY_EPSILON};
pub use voice::{UnknownCommand, VoiceCommand};
