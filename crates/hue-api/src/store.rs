//! In-memory room store
//!
//! Holds the per-room reading history accumulated by the poller and the
//! current sensor state served to the dashboard. Readings are appended in
//! arrival order, so each room's history has non-decreasing timestamps.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hue_client::RoomReading;
use hue_core::{Reading, RoomDetail, RoomSummary};
use parking_lot::RwLock;

#[derive(Debug)]
struct Room {
    id: String,
    name: String,
    readings: Vec<Reading>,
    current_temp: f64,
    current_lux: Option<i64>,
    motion_detected: bool,
    last_motion: Option<String>,
    last_update: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreInner {
    rooms: HashMap<String, Room>,
    last_poll: Option<DateTime<Utc>>,
}

/// Thread-safe store of room state and reading histories
#[derive(Debug, Default)]
pub struct DataStore {
    inner: RwLock<StoreInner>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one polled reading for a room, creating the room on first sight
    pub fn add_reading(&self, reading: &RoomReading, timestamp_ms: i64) {
        let now = Utc::now();
        let mut inner = self.inner.write();

        let room = inner
            .rooms
            .entry(reading.id.clone())
            .or_insert_with(|| Room {
                id: reading.id.clone(),
                name: reading.name.clone(),
                readings: Vec::new(),
                current_temp: reading.temperature,
                current_lux: reading.lux,
                motion_detected: reading.motion_detected,
                last_motion: reading.last_motion.clone(),
                last_update: now,
            });

        room.readings.push(Reading::new(
            timestamp_ms,
            reading.temperature,
            reading.motion_detected,
        ));
        room.name = reading.name.clone();
        room.current_temp = reading.temperature;
        room.current_lux = reading.lux;
        room.motion_detected = reading.motion_detected;
        room.last_motion = reading.last_motion.clone();
        room.last_update = now;

        inner.last_poll = Some(now);
    }

    /// Current state of every room, without histories, sorted by room id
    pub fn all_rooms(&self) -> Vec<RoomSummary> {
        let inner = self.inner.read();
        let mut rooms: Vec<RoomSummary> = inner
            .rooms
            .values()
            .map(|room| RoomSummary {
                id: room.id.clone(),
                name: room.name.clone(),
                current_temp: room.current_temp,
                current_lux: room.current_lux,
                motion_detected: room.motion_detected,
                last_motion: room.last_motion.clone(),
                last_update: room.last_update,
                reading_count: room.readings.len(),
            })
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// Full state of one room including its reading history
    pub fn room_detail(&self, room_id: &str) -> Option<RoomDetail> {
        let inner = self.inner.read();
        inner.rooms.get(room_id).map(|room| RoomDetail {
            id: room.id.clone(),
            name: room.name.clone(),
            current_temp: room.current_temp,
            current_lux: room.current_lux,
            motion_detected: room.motion_detected,
            last_motion: room.last_motion.clone(),
            last_update: room.last_update,
            readings: room.readings.clone(),
        })
    }

    /// When the poller last pushed data, if it has
    pub fn last_poll_time(&self) -> Option<DateTime<Utc>> {
        self.inner.read().last_poll
    }

    /// Number of rooms currently tracked
    pub fn room_count(&self) -> usize {
        self.inner.read().rooms.len()
    }
}
