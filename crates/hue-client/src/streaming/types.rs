//! Types for the event-stream consumer

use hue_core::BridgeEvent;
use thiserror::Error;

/// Errors that can occur while consuming the event stream
#[derive(Debug, Error)]
pub enum StreamError {
    /// HTTP/connection error
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Failed to parse a frame payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Bridge returned a non-success status
    #[error("Bridge error ({status}): {message}")]
    Bridge { status: u16, message: String },
}

/// Receives decoded bridge events, strictly sequentially in arrival order
///
/// Implemented for any `FnMut(BridgeEvent)` closure.
pub trait EventSink: Send + 'static {
    fn on_event(&mut self, event: BridgeEvent);
}

impl<F> EventSink for F
where
    F: FnMut(BridgeEvent) + Send + 'static,
{
    fn on_event(&mut self, event: BridgeEvent) {
        self(event)
    }
}
