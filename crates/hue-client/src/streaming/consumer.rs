//! Reconnecting event-stream consumer
//!
//! A single tokio task owns the whole connection lifecycle: connect,
//! reassemble frames, deliver events to the sink, and on any disconnect
//! sleep out the backoff delay and try again. The loop's one sleep is the
//! single pending reconnect slot, so two disconnect conditions in quick
//! succession can never schedule two retries.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::Mutex;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::frame::{ChunkDecoder, FrameBuffer};
use super::parser::{expand_payload, parse_frame};
use super::types::{EventSink, StreamError};

/// Initial reconnect delay
const BASE_RETRY: Duration = Duration::from_millis(1000);
/// Reconnect delay cap
const MAX_RETRY: Duration = Duration::from_millis(30_000);
/// Bridge event-stream endpoint
const EVENT_STREAM_PATH: &str = "/eventstream/clip/v2";
/// Maximum length of response text echoed into disconnect reasons
const BODY_PREVIEW_CHARS: usize = 300;
/// Byte cap when draining an error body for its preview (4 bytes per char
/// covers the longest UTF-8 encoding)
const BODY_PREVIEW_MAX_BYTES: usize = BODY_PREVIEW_CHARS * 4;

/// Configuration for an [`EventStream`]
#[derive(Debug, Clone)]
pub struct EventStreamConfig {
    /// Base URL of the bridge (normally `https://<bridge-ip>`)
    pub base_url: String,
    /// Application key sent as the `hue-application-key` header
    pub application_key: String,
    /// Backoff delay after the first failure
    pub base_retry: Duration,
    /// Backoff delay cap
    pub max_retry: Duration,
}

impl EventStreamConfig {
    /// Configuration for a bridge reachable at `bridge_host` over HTTPS
    pub fn new(bridge_host: &str, application_key: &str) -> Self {
        Self::with_base_url(format!("https://{}", bridge_host), application_key)
    }

    /// Configuration against an explicit base URL (tests use plain HTTP)
    pub fn with_base_url(base_url: impl Into<String>, application_key: &str) -> Self {
        Self {
            base_url: base_url.into(),
            application_key: application_key.to_string(),
            base_retry: BASE_RETRY,
            max_retry: MAX_RETRY,
        }
    }
}

/// Exponential backoff state: doubles per consecutive failure, capped,
/// reset to base once a live stream is established
#[derive(Debug)]
struct RetryState {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl RetryState {
    fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            current: base,
        }
    }

    /// Delay to wait before the next attempt; advances the backoff
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Called once a live stream is established
    fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Why a connection attempt or established stream ended
#[derive(Debug)]
enum Disconnect {
    /// The connection failed, the bridge rejected it, or the byte stream
    /// errored mid-flight
    Failed(StreamError),
    /// The response body ended; a live stream never completes normally
    StreamEnded,
    /// The consumer was stopped
    Stopped,
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disconnect::Failed(e) => e.fmt(f),
            Disconnect::StreamEnded => write!(f, "stream ended"),
            Disconnect::Stopped => write!(f, "stopped"),
        }
    }
}

/// Handle for an active event stream
///
/// [`stop`](StreamHandle::stop) tears down the current connection, cancels
/// any pending reconnect and guarantees no further sink deliveries after it
/// returns. Dropping the handle stops the stream as well.
pub struct StreamHandle {
    stopped: Arc<AtomicBool>,
    delivery: Arc<Mutex<()>>,
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Stop the stream. Idempotent, safe from any context.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            info!("bridge event stream stopped");
        }
        // Wait out a delivery that was already past the stop check; with
        // the flag set, no delivery can start once the guard is free
        drop(self.delivery.lock());
        // Aborting drops the in-flight response, force-closing the transport
        self.task.abort();
    }

    /// Whether the stream has been stopped
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The reconnecting event-stream consumer
pub struct EventStream {
    config: EventStreamConfig,
    client: Client,
}

impl EventStream {
    pub fn new(config: EventStreamConfig) -> Self {
        // No overall timeout: the response is expected to stay open forever.
        // Building with default TLS cannot fail here; fall back to a default
        // client rather than panicking if it ever does.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Begin connecting immediately; events flow to `sink` until stopped
    ///
    /// Delivery is strictly sequential in arrival order. No failure is
    /// fatal: the consumer retries with exponential backoff until
    /// [`StreamHandle::stop`] is called.
    pub fn start(self, sink: impl EventSink) -> StreamHandle {
        let stopped = Arc::new(AtomicBool::new(false));
        let delivery = Arc::new(Mutex::new(()));
        let task = tokio::spawn(run(
            self.config,
            self.client,
            sink,
            stopped.clone(),
            delivery.clone(),
        ));

        StreamHandle {
            stopped,
            delivery,
            task,
        }
    }
}

async fn run(
    config: EventStreamConfig,
    client: Client,
    mut sink: impl EventSink,
    stopped: Arc<AtomicBool>,
    delivery: Arc<Mutex<()>>,
) {
    let mut retry = RetryState::new(config.base_retry, config.max_retry);

    loop {
        if stopped.load(Ordering::SeqCst) {
            return;
        }

        let reason = stream_once(
            &config,
            &client,
            &mut sink,
            &stopped,
            &delivery,
            &mut retry,
        )
        .await;

        if stopped.load(Ordering::SeqCst) || matches!(reason, Disconnect::Stopped) {
            return;
        }

        let delay = retry.next_delay();
        warn!(
            reason = %reason,
            retry_in_ms = delay.as_millis() as u64,
            "event stream reconnect scheduled"
        );
        tokio::time::sleep(delay).await;
    }
}

/// One connection attempt: returns only when the stream is down
async fn stream_once(
    config: &EventStreamConfig,
    client: &Client,
    sink: &mut impl EventSink,
    stopped: &AtomicBool,
    delivery: &Mutex<()>,
    retry: &mut RetryState,
) -> Disconnect {
    let url = match Url::parse(&config.base_url).and_then(|u| u.join(EVENT_STREAM_PATH)) {
        Ok(url) => url,
        Err(e) => {
            return Disconnect::Failed(StreamError::Parse(format!("invalid stream URL: {}", e)))
        }
    };

    info!(%url, "connecting to bridge event stream");

    let response = match client
        .get(url)
        .header("hue-application-key", &config.application_key)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return Disconnect::Failed(StreamError::Connection(e)),
    };

    if !response.status().is_success() {
        let status = response.status().as_u16();
        return Disconnect::Failed(StreamError::Bridge {
            status,
            message: bounded_body_preview(response).await,
        });
    }

    // Recovery is confirmed only once a live stream is actually established
    retry.reset();
    info!("bridge event stream connected");

    let mut decoder = ChunkDecoder::new();
    let mut frames = FrameBuffer::new();
    let mut byte_stream = response.bytes_stream();

    while let Some(next) = byte_stream.next().await {
        if stopped.load(Ordering::SeqCst) {
            return Disconnect::Stopped;
        }

        let bytes = match next {
            Ok(bytes) => bytes,
            Err(e) => return Disconnect::Failed(StreamError::Connection(e)),
        };

        let chunk = decoder.decode(&bytes);
        for frame in frames.feed(&chunk) {
            let Some(parsed) = parse_frame(&frame) else {
                continue;
            };

            match expand_payload(&parsed.data, parsed.event_name.as_deref()) {
                Ok(events) => {
                    for event in events {
                        // The guard spans the check and the call, so
                        // stop() can wait out an in-flight delivery
                        let _delivering = delivery.lock();
                        if stopped.load(Ordering::SeqCst) {
                            return Disconnect::Stopped;
                        }
                        debug!(
                            event_type = %event.event_type,
                            resource_type = %event.resource_type,
                            resource_id = %event.resource_id,
                            "bridge event received"
                        );
                        sink.on_event(event);
                    }
                }
                // Recoverable at frame granularity: log and continue
                Err(e) => warn!(error = %e, "dropping malformed event frame"),
            }
        }
    }

    Disconnect::StreamEnded
}

/// Drain at most a preview's worth of a non-success response body
async fn bounded_body_preview(response: reqwest::Response) -> String {
    let mut body = Vec::new();
    let mut byte_stream = response.bytes_stream();
    while let Some(Ok(bytes)) = byte_stream.next().await {
        body.extend_from_slice(&bytes);
        if body.len() >= BODY_PREVIEW_MAX_BYTES {
            break;
        }
    }
    String::from_utf8_lossy(&body)
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let mut retry = RetryState::new(Duration::from_millis(1000), Duration::from_millis(30_000));

        let expected_ms = [1000, 2000, 4000, 8000, 16_000, 30_000, 30_000];
        for expected in expected_ms {
            assert_eq!(retry.next_delay(), Duration::from_millis(expected));
        }
    }

    #[test]
    fn backoff_resets_after_success() {
        let mut retry = RetryState::new(Duration::from_millis(1000), Duration::from_millis(30_000));

        retry.next_delay();
        retry.next_delay();
        assert_eq!(retry.next_delay(), Duration::from_millis(4000));

        retry.reset();
        assert_eq!(retry.next_delay(), Duration::from_millis(1000));
        assert_eq!(retry.next_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn nth_failure_delay_is_min_of_doubling_and_cap() {
        let base: u64 = 1000;
        let max: u64 = 30_000;
        let mut retry =
            RetryState::new(Duration::from_millis(base), Duration::from_millis(max));

        for n in 1..=10u32 {
            let expected = (base * 2u64.pow(n - 1)).min(max);
            assert_eq!(
                retry.next_delay(),
                Duration::from_millis(expected),
                "delay for failure {}",
                n
            );
        }
    }
}
