//! hue-core - Core models and algorithms for the Hue temperature tracker
//!
//! This crate holds the shared domain types (readings, rooms, bridge events)
//! and the pure time-series sampling algorithm used to reduce reading
//! histories to chart-ready sequences. It performs no I/O.

pub mod models;
pub mod sampling;

pub use models::*;
pub use sampling::{sample, SamplingStrategy, TimeRangeMode};
