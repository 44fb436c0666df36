//! Room state models served over the REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Reading;

/// Current state of a room without its reading history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// Bridge sensor identifier for the room's temperature sensor
    pub id: String,
    /// Human-readable room name (from the paired motion sensor when present)
    pub name: String,
    /// Most recent temperature in degrees Celsius
    pub current_temp: f64,
    /// Most recent light level in lux, if the room has a light sensor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_lux: Option<i64>,
    /// Whether motion is currently detected
    pub motion_detected: bool,
    /// Timestamp of the last motion event reported by the bridge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_motion: Option<String>,
    /// When this room was last updated by the poller
    pub last_update: DateTime<Utc>,
    /// Number of readings held for this room
    pub reading_count: usize,
}

/// Full room state including its reading history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    pub id: String,
    pub name: String,
    pub current_temp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_lux: Option<i64>,
    pub motion_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_motion: Option<String>,
    pub last_update: DateTime<Utc>,
    /// Reading history, oldest first
    pub readings: Vec<Reading>,
}
