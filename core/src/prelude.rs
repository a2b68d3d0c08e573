use crate::storage::SeriesStore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Series position of the temperature value inside a reading.
pub const TEMPERATURE_IDX: usize = 1;
/// Series position of the humidity value inside a reading.
pub const HUMIDITY_IDX: usize = 2;

/// The two plotted quantities carried by every reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
}

impl Metric {
    /// Position of the metric inside the `[timestamp, temperature, humidity]` tuple.
    pub fn index(self) -> usize {
        match self {
            Metric::Temperature => TEMPERATURE_IDX,
            Metric::Humidity => HUMIDITY_IDX,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            TEMPERATURE_IDX => Some(Metric::Temperature),
            HUMIDITY_IDX => Some(Metric::Humidity),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
        }
    }
}

/// Common error type for decoding and transport failures.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("event for sensor {0} carries no reading")]
    EmptyReading(String),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("expected an event stream from {url}, got content type {content_type:?}")]
    NotEventStream { content_type: String, url: String },
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Opaque chart primitive. Given the store and a metric, it plots every
/// series' `(timestamp, value)` pairs; how it draws is its own business.
pub trait ChartRenderer {
    fn draw(&mut self, store: &SeriesStore, metric: Metric);
}

/// Current wall-clock time in whole seconds since the epoch.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
