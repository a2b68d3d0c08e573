//! Network side of the sensor dashboard: talks to the hub over HTTP and
//! server-sent events and drives a `sensorcore` store through a session.

pub mod bootstrap;
pub mod config;
pub mod hub;
pub mod render;
pub mod session;
pub mod transport;

pub use bootstrap::BootstrapLoader;
pub use config::{BootstrapPolicy, FeedConfig};
pub use hub::HubClient;
pub use render::LogRenderer;
pub use session::Session;
pub use transport::{EventSource, TransportSignal};
