//! Reading sampling for chart rendering
//!
//! Reduces a room's full reading history to a bounded sequence the dashboard
//! can plot cheaply. The reduction is a pure function of the input, the
//! requested time range and "now": first a retention window is selected,
//! then a fixed-minimum-gap decimation drops points that fall too close to
//! the last retained one. Retained points are actual readings; nothing is
//! interpolated or averaged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Reading;

/// Milliseconds in a day
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
/// Milliseconds in an hour
pub const HOUR_MS: i64 = 60 * 60 * 1000;
/// Milliseconds in fifteen minutes
pub const FIFTEEN_MINUTES_MS: i64 = 15 * 60 * 1000;

/// User-selectable chart time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRangeMode {
    /// Pick window and resolution from the age of the oldest reading
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "1d")]
    Last1Day,
    #[serde(rename = "1h")]
    Last1Hour,
}

impl TimeRangeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRangeMode::Auto => "auto",
            TimeRangeMode::Last30Days => "30d",
            TimeRangeMode::Last7Days => "7d",
            TimeRangeMode::Last1Day => "1d",
            TimeRangeMode::Last1Hour => "1h",
        }
    }
}

impl FromStr for TimeRangeMode {
    type Err = UnknownTimeRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(TimeRangeMode::Auto),
            "30d" => Ok(TimeRangeMode::Last30Days),
            "7d" => Ok(TimeRangeMode::Last7Days),
            "1d" => Ok(TimeRangeMode::Last1Day),
            "1h" => Ok(TimeRangeMode::Last1Hour),
            other => Err(UnknownTimeRange(other.to_string())),
        }
    }
}

/// Error for an unrecognized time-range string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTimeRange(pub String);

impl fmt::Display for UnknownTimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown time range: {}", self.0)
    }
}

impl std::error::Error for UnknownTimeRange {}

/// How aggressively readings are decimated within the retention window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Keep every reading
    All,
    /// Keep at most one reading per 15 minutes
    Every15Minutes,
    /// Keep at most one reading per hour
    EveryHour,
}

impl SamplingStrategy {
    /// Minimum gap enforced between retained readings, if any
    pub fn interval_ms(&self) -> Option<i64> {
        match self {
            SamplingStrategy::All => None,
            SamplingStrategy::Every15Minutes => Some(FIFTEEN_MINUTES_MS),
            SamplingStrategy::EveryHour => Some(HOUR_MS),
        }
    }
}

/// Select the retention cutoff and decimation strategy for a mode
///
/// `oldest_ts` is the timestamp of the first (oldest) reading; Auto mode
/// keys its choice off the data's age in fractional days.
fn window_for(mode: TimeRangeMode, oldest_ts: i64, now: i64) -> (i64, SamplingStrategy) {
    match mode {
        TimeRangeMode::Auto => {
            let age_days = (now - oldest_ts) as f64 / DAY_MS as f64;
            if age_days > 7.0 {
                (now - 30 * DAY_MS, SamplingStrategy::EveryHour)
            } else if age_days > 1.0 {
                (now - 7 * DAY_MS, SamplingStrategy::Every15Minutes)
            } else {
                (0, SamplingStrategy::All)
            }
        }
        TimeRangeMode::Last30Days => (now - 30 * DAY_MS, SamplingStrategy::EveryHour),
        TimeRangeMode::Last7Days => (now - 7 * DAY_MS, SamplingStrategy::Every15Minutes),
        TimeRangeMode::Last1Day => (now - DAY_MS, SamplingStrategy::All),
        TimeRangeMode::Last1Hour => (now - HOUR_MS, SamplingStrategy::All),
    }
}

/// Keep the first reading, then each reading at least `interval_ms` past the
/// last kept one. A fixed-minimum-gap decimation, not a bucketed average.
fn decimate(readings: &[Reading], interval_ms: i64) -> Vec<Reading> {
    let mut sampled = Vec::new();
    let mut last_kept: Option<i64> = None;

    for reading in readings {
        match last_kept {
            Some(ts) if reading.timestamp - ts < interval_ms => {}
            _ => {
                sampled.push(*reading);
                last_kept = Some(reading.timestamp);
            }
        }
    }

    sampled
}

/// Reduce a reading history to a chart-ready sequence
///
/// `readings` must be ordered oldest-first with non-decreasing timestamps.
/// The output is always an order-preserving subsequence of the input; when
/// the chosen window excludes everything, the single most recent reading is
/// returned instead of an empty sequence.
pub fn sample(readings: &[Reading], mode: TimeRangeMode, now: i64) -> Vec<Reading> {
    let Some(oldest) = readings.first() else {
        return Vec::new();
    };

    let (cutoff, strategy) = window_for(mode, oldest.timestamp, now);

    let mut filtered: Vec<Reading> = readings
        .iter()
        .filter(|r| r.timestamp >= cutoff)
        .copied()
        .collect();

    // All data predates the window: fall back to the most recent reading
    if filtered.is_empty() {
        if let Some(last) = readings.last() {
            filtered.push(*last);
        }
    }

    match strategy.interval_ms() {
        Some(interval) => decimate(&filtered, interval),
        None => filtered,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MINUTE_MS: i64 = 60 * 1000;

    /// Readings one minute apart starting at `start`, temperature = index
    fn minute_marks(start: i64, count: usize) -> Vec<Reading> {
        (0..count)
            .map(|i| Reading::new(start + i as i64 * MINUTE_MS, i as f64, false))
            .collect()
    }

    fn timestamps(readings: &[Reading]) -> Vec<i64> {
        readings.iter().map(|r| r.timestamp).collect()
    }

    /// Output must be an order-preserving subsequence of the input
    fn assert_subsequence(output: &[Reading], input: &[Reading]) {
        let mut iter = input.iter();
        for kept in output {
            assert!(
                iter.any(|r| r.timestamp == kept.timestamp && r.temperature == kept.temperature),
                "output reading at {} is not a forward match in the input",
                kept.timestamp
            );
        }
    }

    const ALL_MODES: [TimeRangeMode; 5] = [
        TimeRangeMode::Auto,
        TimeRangeMode::Last30Days,
        TimeRangeMode::Last7Days,
        TimeRangeMode::Last1Day,
        TimeRangeMode::Last1Hour,
    ];

    #[test]
    fn empty_input_yields_empty_output() {
        for mode in ALL_MODES {
            assert!(sample(&[], mode, 1_000_000).is_empty());
        }
    }

    #[test]
    fn non_empty_input_never_yields_empty_output() {
        let readings = minute_marks(0, 10);
        // "now" far in the future so every window excludes all data
        let now = 365 * DAY_MS;
        for mode in ALL_MODES {
            let out = sample(&readings, mode, now);
            assert!(!out.is_empty(), "empty output for {:?}", mode);
        }
    }

    #[test]
    fn out_of_window_data_falls_back_to_most_recent_reading() {
        let readings = minute_marks(0, 10);
        let now = 365 * DAY_MS;
        let out = sample(&readings, TimeRangeMode::Last1Hour, now);
        assert_eq!(out, vec![readings[9]]);
    }

    #[test]
    fn output_is_subsequence_for_every_mode() {
        let readings = minute_marks(0, 201);
        let now = readings[200].timestamp;
        for mode in ALL_MODES {
            let out = sample(&readings, mode, now);
            assert_subsequence(&out, &readings);
        }
    }

    #[test]
    fn last_hour_returns_final_61_minute_marks_unsampled() {
        let readings = minute_marks(0, 201);
        let now = readings[200].timestamp;

        let out = sample(&readings, TimeRangeMode::Last1Hour, now);

        // Cutoff is now - 1h; minute marks 140..=200 qualify, strategy All
        assert_eq!(out.len(), 61);
        assert_eq!(out[0].timestamp, now - HOUR_MS);
        assert_eq!(out.last().unwrap().timestamp, now);
        assert_eq!(out, readings[140..=200].to_vec());
    }

    #[test]
    fn seven_day_mode_decimates_to_15_minute_grid() {
        let readings = minute_marks(0, 201);
        let now = readings[200].timestamp;

        let out = sample(&readings, TimeRangeMode::Last7Days, now);

        // All data is inside the window; decimation keeps index 0, then each
        // point >= 15 min past the last kept: 0, 15, 30, ..., 195. Index 200
        // is only 5 min past 195 and is dropped.
        let expected: Vec<i64> = (0..=13).map(|i| i * 15 * MINUTE_MS).collect();
        assert_eq!(timestamps(&out), expected);
    }

    #[test]
    fn decimation_measures_gap_from_last_kept_not_last_seen() {
        // 0, 14, 16 minutes: 14 is dropped (gap 14 < 15), 16 is kept because
        // its gap from the last KEPT (0) is 16 minutes
        let readings = vec![
            Reading::new(0, 1.0, false),
            Reading::new(14 * MINUTE_MS, 2.0, false),
            Reading::new(16 * MINUTE_MS, 3.0, false),
        ];
        let out = decimate(&readings, FIFTEEN_MINUTES_MS);
        assert_eq!(timestamps(&out), vec![0, 16 * MINUTE_MS]);
    }

    #[test]
    fn decimation_is_idempotent() {
        let readings = minute_marks(0, 500);
        for interval in [FIFTEEN_MINUTES_MS, HOUR_MS] {
            let once = decimate(&readings, interval);
            let twice = decimate(&once, interval);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn auto_mode_shows_everything_for_young_data() {
        let now = 10 * DAY_MS;
        // Oldest reading 6 hours old
        let readings = minute_marks(now - 6 * HOUR_MS, 360);
        let out = sample(&readings, TimeRangeMode::Auto, now);
        assert_eq!(out, readings);
    }

    #[test]
    fn auto_mode_uses_15_minute_samples_for_multi_day_data() {
        let now = 100 * DAY_MS;
        // Oldest reading 3 days old: 7-day window, 15-minute decimation
        let readings = minute_marks(now - 3 * DAY_MS, 60);
        let out = sample(&readings, TimeRangeMode::Auto, now);
        let expected: Vec<i64> = vec![
            readings[0].timestamp,
            readings[15].timestamp,
            readings[30].timestamp,
            readings[45].timestamp,
        ];
        assert_eq!(timestamps(&out), expected);
    }

    #[test]
    fn auto_mode_uses_hourly_samples_for_week_old_data() {
        let now = 100 * DAY_MS;
        // Oldest reading 10 days old: 30-day window, hourly decimation.
        // Readings every 30 minutes across the full 10 days.
        let count = (10 * DAY_MS / (30 * MINUTE_MS)) as usize;
        let readings: Vec<Reading> = (0..count)
            .map(|i| Reading::new(now - 10 * DAY_MS + i as i64 * 30 * MINUTE_MS, 20.0, false))
            .collect();

        let out = sample(&readings, TimeRangeMode::Auto, now);

        // Every other reading survives the hourly gap
        assert_eq!(out.len(), count.div_ceil(2));
        for pair in out.windows(2) {
            assert!(pair[1].timestamp - pair[0].timestamp >= HOUR_MS);
        }
    }

    #[test]
    fn auto_mode_boundary_exactly_one_day_old_shows_all() {
        let now = 50 * DAY_MS;
        // Oldest exactly 1 day old: age_days == 1.0 is NOT > 1, so All
        let readings = vec![
            Reading::new(now - DAY_MS, 20.0, false),
            Reading::new(now - DAY_MS + MINUTE_MS, 21.0, true),
        ];
        let out = sample(&readings, TimeRangeMode::Auto, now);
        assert_eq!(out, readings);
    }

    #[test]
    fn thirty_day_mode_cuts_off_older_data() {
        let now = 100 * DAY_MS;
        let readings = vec![
            Reading::new(now - 40 * DAY_MS, 18.0, false),
            Reading::new(now - 29 * DAY_MS, 19.0, false),
            Reading::new(now - DAY_MS, 20.0, false),
        ];
        let out = sample(&readings, TimeRangeMode::Last30Days, now);
        assert_eq!(
            timestamps(&out),
            vec![now - 29 * DAY_MS, now - DAY_MS]
        );
    }

    #[test]
    fn mode_strings_round_trip() {
        for mode in ALL_MODES {
            assert_eq!(mode.as_str().parse::<TimeRangeMode>().unwrap(), mode);
        }
        assert!("2w".parse::<TimeRangeMode>().is_err());
    }
}
