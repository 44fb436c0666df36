//! Daemon configuration
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables (`HUE_BRIDGE_IP`, `HUE_API_TOKEN`, `HUE_POLL_INTERVAL_MS`,
//! `HUE_PORT`, `HUE_EVENT_STREAM_ENABLED`). The bridge address and
//! application key are required; everything else has defaults.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

fn default_poll_interval_ms() -> u64 {
    60_000
}

fn default_port() -> u16 {
    3000
}

fn default_event_stream_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bridge address (IP or hostname)
    #[serde(default)]
    pub bridge_ip: Option<String>,
    /// Application key created by pairing with the bridge
    #[serde(default)]
    pub api_token: Option<String>,
    /// How often to poll the bridge REST API
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Port the dashboard API listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether to consume the bridge event stream
    #[serde(default = "default_event_stream_enabled")]
    pub event_stream_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_ip: None,
            api_token: None,
            poll_interval_ms: default_poll_interval_ms(),
            port: default_port(),
            event_stream_enabled: default_event_stream_enabled(),
        }
    }
}

impl Config {
    /// Load from a TOML file, then apply environment overrides
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("HUE_BRIDGE_IP") {
            self.bridge_ip = Some(v);
        }
        if let Ok(v) = std::env::var("HUE_API_TOKEN") {
            self.api_token = Some(v);
        }
        if let Ok(v) = std::env::var("HUE_POLL_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                self.poll_interval_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("HUE_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("HUE_EVENT_STREAM_ENABLED") {
            self.event_stream_enabled = v != "false";
        }
    }

    /// Validate required fields, returning the bridge address and key
    pub fn require_bridge(&self) -> anyhow::Result<(&str, &str)> {
        let bridge_ip = self
            .bridge_ip
            .as_deref()
            .context("missing bridge address: set bridge_ip in the config file or HUE_BRIDGE_IP")?;
        let api_token = self
            .api_token
            .as_deref()
            .context("missing application key: set api_token in the config file or HUE_API_TOKEN")?;
        Ok((bridge_ip, api_token))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bridge_ip = \"192.168.1.2\"\napi_token = \"key\"\npoll_interval_ms = 5000"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.bridge_ip.as_deref(), Some("192.168.1.2"));
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.port, 3000);
        assert!(config.event_stream_enabled);
    }

    #[test]
    fn missing_bridge_fields_are_an_error() {
        let config = Config::default();
        assert!(config.require_bridge().is_err());
    }
}
