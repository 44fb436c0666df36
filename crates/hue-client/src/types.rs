//! Raw bridge sensor payloads and the merged per-room view

use serde::Deserialize;

/// State block of a bridge sensor record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorState {
    /// Temperature in centi-degrees Celsius (2156 = 21.56°C)
    pub temperature: Option<i64>,
    /// Logarithmic light level (lux = 10^((lightlevel - 1) / 10000))
    pub lightlevel: Option<i64>,
    pub dark: Option<bool>,
    pub daylight: Option<bool>,
    /// Presence flag from motion sensors
    pub presence: Option<bool>,
    /// Last state change; UTC but sent without a trailing `Z`
    pub lastupdated: Option<String>,
}

/// A sensor record as returned by `/api/{key}/sensors`
#[derive(Debug, Clone, Deserialize)]
pub struct Sensor {
    /// Sensor type, e.g. `ZLLTemperature`, `ZLLPresence`, `ZLLLightLevel`
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    pub name: Option<String>,
    /// Unique id; the MAC-address prefix before the first `-` identifies
    /// the physical device shared by temperature/presence/light sensors
    pub uniqueid: Option<String>,
    #[serde(default)]
    pub state: SensorState,
}

impl Sensor {
    /// The physical-device portion of `uniqueid`, used to join the three
    /// sensor records one motion sensor exposes
    pub fn device_id(&self) -> Option<&str> {
        self.uniqueid
            .as_deref()
            .map(|id| id.split('-').next().unwrap_or(id))
    }

    /// Whether `sensor_type` contains `needle`, case-insensitively
    pub fn type_contains(&self, needle: &str) -> bool {
        self.sensor_type
            .as_deref()
            .is_some_and(|t| t.to_ascii_lowercase().contains(needle))
    }
}

/// Merged per-room sensor view produced by one poll
#[derive(Debug, Clone, PartialEq)]
pub struct RoomReading {
    /// Bridge id of the temperature sensor
    pub id: String,
    /// Room name (from the paired motion sensor when available)
    pub name: String,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Light level in lux, if the device exposes a light sensor
    pub lux: Option<i64>,
    /// Whether the paired motion sensor currently reports presence
    pub motion_detected: bool,
    /// Last motion time (UTC, `Z`-suffixed)
    pub last_motion: Option<String>,
    /// Last update time of the temperature sensor (UTC, `Z`-suffixed)
    pub last_update: Option<String>,
}
