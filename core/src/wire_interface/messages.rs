use crate::prelude::{FeedError, FeedResult};
use crate::wire_interface::reading::{Reading, SensorId};
use serde::{Deserialize, Serialize};

/// Event type carrying one new reading on the push channel.
pub const NEW_READING_EVENT: &str = "newReading";

/// Body of `GET /sensorData?identifier=<id>` and of each push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDataMessage {
    pub identifier: SensorId,
    #[serde(default)]
    pub values: Vec<Reading>,
}

impl SensorDataMessage {
    pub fn new(identifier: SensorId, values: Vec<Reading>) -> Self {
        Self { identifier, values }
    }

    pub fn from_json(payload: &[u8]) -> FeedResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Decodes a push payload. Only the first element of `values` is consumed.
pub fn decode_new_reading(data: &str) -> FeedResult<(SensorId, Reading)> {
    let message: SensorDataMessage = serde_json::from_str(data)?;
    let reading = message
        .values
        .first()
        .copied()
        .ok_or_else(|| FeedError::EmptyReading(message.identifier.to_string()))?;
    Ok((message.identifier, reading))
}
