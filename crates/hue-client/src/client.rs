//! Hue bridge REST client implementation

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{HueClientError, Result};
use crate::types::{RoomReading, Sensor};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hue bridge REST API client
///
/// Polls sensor and light state via the bridge's v1 REST API. The bridge
/// serves HTTPS with a self-signed certificate, so certificate validation
/// is disabled for the bridge connection.
#[derive(Debug, Clone)]
pub struct HueClient {
    client: Client,
    base_url: Url,
    app_key: String,
}

impl HueClient {
    /// Create a client for a bridge reachable at `bridge_host` (HTTPS, port 443)
    pub fn new(bridge_host: &str, app_key: &str) -> Result<Self> {
        Self::with_base_url(&format!("https://{}", bridge_host), app_key)
    }

    /// Create a client against an explicit base URL
    ///
    /// Used by tests to point the client at a plain-HTTP mock bridge.
    pub fn with_base_url(base_url: &str, app_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            // Bridge certificate is self-signed
            .danger_accept_invalid_certs(true)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url,
            app_key: app_key.to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        debug!(%url, "GET bridge resource");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(HueClientError::bridge(status, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HueClientError::Parse(e.to_string()))
    }

    /// Fetch all sensor records, keyed by bridge sensor id
    pub async fn get_sensors(&self) -> Result<HashMap<String, Sensor>> {
        self.get_json(&format!("/api/{}/sensors", self.app_key))
            .await
    }

    /// Fetch all light records as raw JSON
    pub async fn get_lights(&self) -> Result<serde_json::Value> {
        self.get_json(&format!("/api/{}/lights", self.app_key))
            .await
    }

    /// Fetch all group records as raw JSON
    pub async fn get_groups(&self) -> Result<serde_json::Value> {
        self.get_json(&format!("/api/{}/groups", self.app_key))
            .await
    }

    /// Fetch sensors and merge them into one [`RoomReading`] per room
    ///
    /// Each physical motion sensor exposes three bridge records
    /// (temperature, presence, light level) sharing a `uniqueid` device
    /// prefix; the merge joins them on that prefix so the temperature
    /// reading carries the room name, motion state and lux value.
    pub async fn get_room_data(&self) -> Result<Vec<RoomReading>> {
        let sensors = self.get_sensors().await?;
        Ok(merge_room_data(&sensors))
    }
}

/// Convert the bridge's logarithmic light level to lux
fn lightlevel_to_lux(lightlevel: i64) -> i64 {
    10f64.powf((lightlevel - 1) as f64 / 10_000.0).round() as i64
}

/// Bridge timestamps are UTC but lack the `Z` suffix; add it for parsers
fn ensure_utc_suffix(ts: &str) -> String {
    if ts.ends_with('Z') {
        ts.to_string()
    } else {
        format!("{}Z", ts)
    }
}

struct MotionInfo {
    name: String,
    presence: bool,
    last_updated: Option<String>,
}

/// Join temperature, presence and light-level sensors by device id
fn merge_room_data(sensors: &HashMap<String, Sensor>) -> Vec<RoomReading> {
    // Presence sensors carry the room name and motion state
    let mut motion_by_device: HashMap<&str, MotionInfo> = HashMap::new();
    for (sensor_id, sensor) in sensors {
        if !sensor.type_contains("presence") {
            continue;
        }
        let Some(device_id) = sensor.device_id() else {
            continue;
        };
        motion_by_device.insert(
            device_id,
            MotionInfo {
                name: sensor
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Sensor {}", sensor_id)),
                presence: sensor.state.presence.unwrap_or(false),
                last_updated: sensor.state.lastupdated.as_deref().map(ensure_utc_suffix),
            },
        );
    }

    // Light-level sensors contribute the lux value
    let mut lux_by_device: HashMap<&str, i64> = HashMap::new();
    for sensor in sensors.values() {
        if !sensor.type_contains("lightlevel") {
            continue;
        }
        let (Some(device_id), Some(lightlevel)) = (sensor.device_id(), sensor.state.lightlevel)
        else {
            continue;
        };
        lux_by_device.insert(device_id, lightlevel_to_lux(lightlevel));
    }

    let mut rooms = Vec::new();
    for (sensor_id, sensor) in sensors {
        if !sensor.type_contains("temperature") {
            continue;
        }
        let Some(centi_degrees) = sensor.state.temperature else {
            continue;
        };

        let mut name = sensor
            .name
            .clone()
            .unwrap_or_else(|| format!("Sensor {}", sensor_id));
        let mut motion_detected = false;
        let mut last_motion = None;
        let mut lux = None;

        if let Some(device_id) = sensor.device_id() {
            if let Some(motion) = motion_by_device.get(device_id) {
                name = motion.name.clone();
                motion_detected = motion.presence;
                last_motion = motion.last_updated.clone();
            }
            lux = lux_by_device.get(device_id).copied();
        }

        rooms.push(RoomReading {
            id: sensor_id.clone(),
            name,
            temperature: centi_degrees as f64 / 100.0,
            lux,
            motion_detected,
            last_motion,
            last_update: sensor.state.lastupdated.as_deref().map(ensure_utc_suffix),
        });
    }

    // HashMap iteration order is arbitrary; keep the output stable
    rooms.sort_by(|a, b| a.id.cmp(&b.id));
    rooms
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sensor_fixture() -> HashMap<String, Sensor> {
        serde_json::from_str(
            r#"{
                "10": {
                    "type": "ZLLTemperature",
                    "name": "Hue temperature sensor 1",
                    "uniqueid": "00:17:88:01:02:03:04:05-02-0402",
                    "state": { "temperature": 2156, "lastupdated": "2024-06-01T12:00:00" }
                },
                "11": {
                    "type": "ZLLPresence",
                    "name": "Living Room",
                    "uniqueid": "00:17:88:01:02:03:04:05-02-0406",
                    "state": { "presence": true, "lastupdated": "2024-06-01T11:58:30" }
                },
                "12": {
                    "type": "ZLLLightLevel",
                    "name": "Hue ambient light sensor 1",
                    "uniqueid": "00:17:88:01:02:03:04:05-02-0400",
                    "state": { "lightlevel": 20001, "dark": false, "daylight": true }
                },
                "20": {
                    "type": "ZLLTemperature",
                    "name": "Hue temperature sensor 2",
                    "uniqueid": "00:17:88:0a:0b:0c:0d:0e-02-0402",
                    "state": { "temperature": 1803, "lastupdated": "2024-06-01T12:00:05Z" }
                },
                "30": {
                    "type": "ZLLSwitch",
                    "name": "Dimmer",
                    "uniqueid": "00:17:88:ff:ff:ff:ff:ff-01",
                    "state": {}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn merges_motion_and_lux_onto_temperature_sensor() {
        let rooms = merge_room_data(&sensor_fixture());
        assert_eq!(rooms.len(), 2);

        let living_room = &rooms[0];
        assert_eq!(living_room.id, "10");
        assert_eq!(living_room.name, "Living Room");
        assert_eq!(living_room.temperature, 21.56);
        assert!(living_room.motion_detected);
        // 10^((20001-1)/10000) = 100
        assert_eq!(living_room.lux, Some(100));
        assert_eq!(
            living_room.last_motion.as_deref(),
            Some("2024-06-01T11:58:30Z")
        );
        assert_eq!(
            living_room.last_update.as_deref(),
            Some("2024-06-01T12:00:00Z")
        );
    }

    #[test]
    fn unpaired_temperature_sensor_keeps_its_own_name() {
        let rooms = merge_room_data(&sensor_fixture());
        let second = &rooms[1];
        assert_eq!(second.id, "20");
        assert_eq!(second.name, "Hue temperature sensor 2");
        assert_eq!(second.temperature, 18.03);
        assert!(!second.motion_detected);
        assert_eq!(second.lux, None);
        // Already Z-suffixed timestamps are left alone
        assert_eq!(second.last_update.as_deref(), Some("2024-06-01T12:00:05Z"));
    }

    #[test]
    fn lux_conversion_rounds_to_nearest() {
        assert_eq!(lightlevel_to_lux(1), 1);
        assert_eq!(lightlevel_to_lux(10001), 10);
        assert_eq!(lightlevel_to_lux(20001), 100);
        assert_eq!(lightlevel_to_lux(25001), 316);
    }
}
