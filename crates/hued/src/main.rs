//! hued - Hue tracker daemon
//!
//! Polls the bridge for sensor state, consumes its event stream, and
//! serves the dashboard REST API.
//!
//! Usage:
//!   hued [config.toml]
//!
//! Configuration may also come entirely from the environment
//! (HUE_BRIDGE_IP, HUE_API_TOKEN, ...); see config.rs.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hue_api::{create_router, AppState, DataStore};
use hue_client::{EventStream, EventStreamConfig, HueClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Parsed command-line arguments
struct Args {
    /// Daemon config file (TOML)
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args { config_path: None };

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                result.config_path = Some(arg.to_string());
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"hued - Hue tracker daemon

Usage: hued [config.toml]

Options:
  -h, --help    Print this help message

Configuration comes from the TOML file and/or environment variables:
  HUE_BRIDGE_IP, HUE_API_TOKEN, HUE_POLL_INTERVAL_MS, HUE_PORT,
  HUE_EVENT_STREAM_ENABLED
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hued=info,hue_client=info,hue_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hued (Hue tracker daemon)");

    let args = parse_args();
    let config = Config::load(args.config_path.as_deref())?;
    let (bridge_ip, api_token) = config.require_bridge()?;

    let client = HueClient::new(bridge_ip, api_token)?;
    let store = Arc::new(DataStore::new());

    // Poll the bridge immediately, then at the configured interval
    let poller = tokio::spawn(poll_loop(
        client,
        store.clone(),
        Duration::from_millis(config.poll_interval_ms),
    ));

    // Event stream: log every bridge-side change as it happens
    let stream_handle = if config.event_stream_enabled {
        let stream = EventStream::new(EventStreamConfig::new(bridge_ip, api_token));
        Some(stream.start(|event: hue_core::BridgeEvent| {
            tracing::info!(
                event_type = %event.event_type,
                resource_type = %event.resource_type,
                resource_id = %event.resource_id,
                creation_time = event.creation_time.as_deref().unwrap_or(""),
                "bridge event"
            );
            tracing::debug!(payload = %event.payload, "bridge event detail");
        }))
    } else {
        tracing::info!("Event stream disabled by configuration");
        None
    };

    let state = AppState::new(store);
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        %addr,
        bridge = %bridge_ip,
        poll_interval_ms = config.poll_interval_ms,
        "Dashboard API listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    poller.abort();
    if let Some(handle) = stream_handle {
        handle.stop();
    }

    Ok(())
}

/// Fetch room data and append it to the store, forever
async fn poll_loop(client: HueClient, store: Arc<DataStore>, poll_interval: Duration) {
    let mut ticker = tokio::time::interval(poll_interval);

    loop {
        ticker.tick().await;

        match client.get_room_data().await {
            Ok(rooms) => {
                if rooms.is_empty() {
                    tracing::info!("No temperature sensors found on the bridge");
                    continue;
                }
                let timestamp_ms = now_ms();
                for room in &rooms {
                    store.add_reading(room, timestamp_ms);
                    tracing::info!(
                        room = %room.name,
                        temp_c = room.temperature,
                        lux = room.lux.unwrap_or(-1),
                        motion = room.motion_detected,
                        "Polled reading"
                    );
                }
            }
            // Polling failures are never fatal; the next tick retries
            Err(e) => tracing::warn!(error = %e, "Bridge poll failed"),
        }
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
