use crate::prelude::{ChartRenderer, Metric};
use crate::storage::SeriesStore;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::FeedMetrics;
use std::sync::Arc;

/// Why a redraw was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTrigger {
    /// Before any data exists.
    Startup,
    /// After one sensor's history landed; a partial picture.
    Bootstrap,
    /// Once the whole history load has finished.
    BootstrapComplete,
    /// Drawing surface changed size; data untouched.
    Resize,
    /// After a pushed reading was merged and cleaned up.
    StreamEvent,
}

/// Owns the temperature and humidity charts and redraws both together.
pub struct RenderCoordinator<R: ChartRenderer> {
    temperature: R,
    humidity: R,
    metrics: Arc<FeedMetrics>,
    last_trigger: Option<RenderTrigger>,
    logger: LogManager,
}

impl<R: ChartRenderer> RenderCoordinator<R> {
    pub fn new(temperature: R, humidity: R) -> Self {
        Self::with_metrics(temperature, humidity, Arc::new(FeedMetrics::new()))
    }

    pub fn with_metrics(temperature: R, humidity: R, metrics: Arc<FeedMetrics>) -> Self {
        Self {
            temperature,
            humidity,
            metrics,
            last_trigger: None,
            logger: LogManager::new("render"),
        }
    }

    pub fn render_all(&mut self, store: &SeriesStore, trigger: RenderTrigger) {
        self.temperature.draw(store, Metric::Temperature);
        self.humidity.draw(store, Metric::Humidity);
        self.metrics.record_render();
        self.last_trigger = Some(trigger);
        self.logger.debug(&format!(
            "{:?} redraw: {} sensors / {} readings",
            trigger,
            store.len(),
            store.total_readings()
        ));
    }

    pub fn chart(&self, metric: Metric) -> &R {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
        }
    }

    pub fn last_trigger(&self) -> Option<RenderTrigger> {
        self.last_trigger
    }

    pub fn metrics(&self) -> &Arc<FeedMetrics> {
        &self.metrics
    }
}
