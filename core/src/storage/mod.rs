pub mod catalog;
pub mod retention;
pub mod series;
pub mod store;

pub use catalog::{SensorCatalog, UNNAMED_SENSOR};
pub use retention::{RetentionPolicy, MAX_WINDOW, SECS_IN_DAY};
pub use series::SensorSeries;
pub use store::SeriesStore;
