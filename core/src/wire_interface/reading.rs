use crate::prelude::Metric;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Opaque sensor identifier, stable for the whole session.
///
/// The hub keys its catalog with strings but emits integer identifiers in
/// push payloads, so both JSON forms decode to the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of a canonical integer key such as `"7"`, but not
    /// `"07"` or `"+7"`. Such keys enumerate ahead of all other object keys.
    pub fn array_index(&self) -> Option<u32> {
        let value = self.0.parse::<u32>().ok()?;
        (value != u32::MAX && value.to_string() == self.0).then_some(value)
    }

    fn sort_key(&self) -> (u8, u32, &str) {
        match self.array_index() {
            Some(index) => (0, index, self.0.as_str()),
            None => (1, 0, self.0.as_str()),
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SensorId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<u64> for SensorId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

/// Canonical integer ids first in numeric order, then everything else lexically.
impl Ord for SensorId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for SensorId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for SensorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSensorId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl<'de> Deserialize<'de> for SensorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSensorId::deserialize(deserializer)? {
            RawSensorId::Text(text) => SensorId(text),
            RawSensorId::Unsigned(value) => SensorId(value.to_string()),
            RawSensorId::Signed(value) => SensorId(value.to_string()),
        })
    }
}

/// One timestamped sample. On the wire it is the positional triple
/// `[timestamp, temperature, humidity]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64, f64)", into = "(i64, f64, f64)")]
pub struct Reading {
    /// Seconds since the epoch.
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Reading {
    pub fn new(timestamp: i64, temperature: f64, humidity: f64) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }

    /// Positional access mirroring the wire layout.
    pub fn at(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.timestamp as f64),
            _ => Metric::from_index(index).map(|metric| self.value(metric)),
        }
    }
}

impl From<(i64, f64, f64)> for Reading {
    fn from((timestamp, temperature, humidity): (i64, f64, f64)) -> Self {
        Self::new(timestamp, temperature, humidity)
    }
}

impl From<Reading> for (i64, f64, f64) {
    fn from(reading: Reading) -> Self {
        (reading.timestamp, reading.temperature, reading.humidity)
    }
}
