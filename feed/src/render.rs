use sensorcore::render::{prepare_series, PlotSeries};
use sensorcore::telemetry::LogManager;
use sensorcore::{ChartRenderer, Metric, SeriesStore};

/// Headless chart: keeps the prepared series and logs a one-line summary
/// per sensor instead of drawing.
pub struct LogRenderer {
    metric: Metric,
    series: Vec<PlotSeries>,
    logger: LogManager,
}

impl LogRenderer {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            series: Vec::new(),
            logger: LogManager::new("chart"),
        }
    }

    pub fn series(&self) -> &[PlotSeries] {
        &self.series
    }

    pub fn summary(&self) -> Vec<String> {
        self.series
            .iter()
            .map(|plot| match plot.points.last() {
                Some((timestamp, value)) => format!(
                    "{} | {}: {} points, latest {:.1} @ {}",
                    self.metric.label(),
                    plot.name,
                    plot.points.len(),
                    value,
                    timestamp
                ),
                None => format!("{} | {}: no data", self.metric.label(), plot.name),
            })
            .collect()
    }
}

impl ChartRenderer for LogRenderer {
    fn draw(&mut self, store: &SeriesStore, metric: Metric) {
        self.metric = metric;
        self.series = prepare_series(store, metric);
        if self.series.is_empty() {
            self.logger
                .debug(&format!("{} | waiting for data", metric.label()));
            return;
        }
        for line in self.summary() {
            self.logger.record(&line);
        }
    }
}
