//! hue-client - HTTP client for the Hue bridge
//!
//! Two halves:
//!
//! - [`HueClient`]: a typed REST client for polling sensor state. The
//!   bridge serves HTTPS with a self-signed certificate, so the client
//!   accepts invalid certs by default.
//! - [`streaming`]: a long-lived event-stream consumer that reassembles
//!   the bridge's SSE feed into [`hue_core::BridgeEvent`]s and reconnects
//!   with exponential backoff on any disconnection.
//!
//! # Example
//!
//! ```no_run
//! use hue_client::HueClient;
//!
//! # async fn example() -> hue_client::Result<()> {
//! let client = HueClient::new("192.168.1.2", "app-key")?;
//! let rooms = client.get_room_data().await?;
//! for room in rooms {
//!     println!("{}: {:.2}°C", room.name, room.temperature);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod streaming;
mod types;

pub use client::HueClient;
pub use error::{HueClientError, Result};
pub use streaming::{EventSink, EventStream, EventStreamConfig, StreamError, StreamHandle};
pub use types::*;
