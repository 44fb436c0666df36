//! Shared data models for the Hue tracker

mod event;
mod reading;
mod room;

pub use event::*;
pub use reading::*;
pub use room::*;
