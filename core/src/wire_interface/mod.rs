pub mod messages;
pub mod reading;

pub use messages::{decode_new_reading, SensorDataMessage, NEW_READING_EVENT};
pub use reading::{Reading, SensorId};
