//! Sensor reading models

use serde::{Deserialize, Serialize};

/// A single time-series reading for a room
///
/// Wire names match what the dashboard chart code consumes: `timestamp`
/// (epoch milliseconds), `temp` (degrees Celsius) and `motion`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Epoch milliseconds when the reading was recorded
    pub timestamp: i64,
    /// Temperature in degrees Celsius
    #[serde(rename = "temp")]
    pub temperature: f64,
    /// Whether the room's presence sensor reported motion
    #[serde(rename = "motion")]
    pub motion: bool,
}

impl Reading {
    pub fn new(timestamp: i64, temperature: f64, motion: bool) -> Self {
        Self {
            timestamp,
            temperature,
            motion,
        }
    }
}
