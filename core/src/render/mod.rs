pub mod coordinator;
pub mod prepared;

pub use coordinator::{RenderCoordinator, RenderTrigger};
pub use prepared::{prepare_series, PlotSeries};
