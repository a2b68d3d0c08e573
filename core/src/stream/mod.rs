pub mod client;
pub mod sse;

pub use client::{ConnectionState, EventOutcome, StreamClient};
pub use sse::{EventDecoder, ServerEvent, DEFAULT_EVENT_TYPE};
