use crate::prelude::Metric;
use crate::wire_interface::Reading;
use serde::{Deserialize, Serialize};

/// The history of one sensor: its display name and readings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSeries {
    pub name: String,
    pub values: Vec<Reading>,
}

impl SensorSeries {
    pub fn new(name: impl Into<String>, values: Vec<Reading>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Appends without reordering; cleanup restores timestamp order.
    pub fn push(&mut self, reading: Reading) {
        self.values.push(reading);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(timestamp, value)` pairs for one metric, in stored order.
    pub fn points(&self, metric: Metric) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.values
            .iter()
            .map(move |reading| (reading.timestamp, reading.value(metric)))
    }
}
