//! Event-stream consumer for the Hue bridge
//!
//! Maintains a best-effort continuous feed of [`hue_core::BridgeEvent`]s
//! from the bridge's `/eventstream/clip/v2` endpoint, surviving network
//! failures, server errors and malformed frames without operator
//! intervention.
//!
//! # Example
//!
//! ```no_run
//! use hue_client::{EventStream, EventStreamConfig};
//!
//! # async fn example() {
//! let stream = EventStream::new(EventStreamConfig::new("192.168.1.2", "app-key"));
//! let handle = stream.start(|event: hue_core::BridgeEvent| {
//!     println!("{} {} {}", event.event_type, event.resource_type, event.resource_id);
//! });
//!
//! // ... later
//! handle.stop();
//! # }
//! ```

mod consumer;
mod frame;
mod parser;
mod types;

pub use consumer::{EventStream, EventStreamConfig, StreamHandle};
pub use frame::{ChunkDecoder, FrameBuffer};
pub use parser::{expand_payload, parse_frame, SseFrame};
pub use types::{EventSink, StreamError};
