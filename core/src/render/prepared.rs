use crate::prelude::Metric;
use crate::storage::SeriesStore;
use crate::wire_interface::SensorId;

/// What a renderer plots for one sensor: its name and `(timestamp, value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub id: SensorId,
    pub name: String,
    pub points: Vec<(i64, f64)>,
}

/// Projects every series in the store onto one metric, in identifier order.
pub fn prepare_series(store: &SeriesStore, metric: Metric) -> Vec<PlotSeries> {
    store
        .iter()
        .map(|(id, series)| PlotSeries {
            id: id.clone(),
            name: series.name.clone(),
            points: series.points(metric).collect(),
        })
        .collect()
}
