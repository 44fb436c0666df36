//! Application state for the dashboard API

use std::sync::Arc;
use std::time::Instant;

use crate::store::DataStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Room store fed by the poller
    pub store: Arc<DataStore>,
    /// Process start, for the health endpoint's uptime
    started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self {
            store,
            started_at: Instant::now(),
        }
    }

    /// Seconds since this state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
