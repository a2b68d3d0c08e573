//! Client-side data model for live sensor telemetry charts.
//!
//! Historical readings and server-pushed readings merge into a bounded,
//! per-sensor sliding window that chart renderers consume.

pub mod prelude;
pub mod render;
pub mod storage;
pub mod stream;
pub mod telemetry;
pub mod wire_interface;

pub use prelude::{ChartRenderer, FeedError, FeedResult, Metric};
pub use storage::{RetentionPolicy, SensorCatalog, SensorSeries, SeriesStore};
pub use wire_interface::{Reading, SensorId};
