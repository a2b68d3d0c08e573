use crate::bootstrap::BootstrapLoader;
use crate::config::FeedConfig;
use crate::hub::HubClient;
use crate::transport::{EventSource, TransportSignal};
use sensorcore::prelude::unix_now;
use sensorcore::render::{RenderCoordinator, RenderTrigger};
use sensorcore::stream::{EventOutcome, StreamClient};
use sensorcore::telemetry::{FeedMetrics, LogManager};
use sensorcore::{ChartRenderer, SensorCatalog, SeriesStore};
use std::sync::Arc;
use std::time::Duration;

/// One dashboard lifetime: catalog, then history, then the live stream.
///
/// All mutation goes through `&mut self`, so a reading is appended, cleaned
/// up and drawn before the next one is looked at.
pub struct Session<R: ChartRenderer> {
    config: FeedConfig,
    hub: HubClient,
    catalog: SensorCatalog,
    store: SeriesStore,
    coordinator: RenderCoordinator<R>,
    stream: StreamClient,
    metrics: Arc<FeedMetrics>,
    logger: LogManager,
}

impl<R: ChartRenderer> Session<R> {
    pub fn new(config: FeedConfig, temperature: R, humidity: R) -> anyhow::Result<Self> {
        let hub = HubClient::new(&config.hub_url)?;
        let metrics = Arc::new(FeedMetrics::new());
        Ok(Self {
            hub,
            catalog: SensorCatalog::empty(),
            store: SeriesStore::with_policy(config.retention),
            coordinator: RenderCoordinator::with_metrics(temperature, humidity, metrics.clone()),
            stream: StreamClient::new(metrics.clone()),
            metrics,
            config,
            logger: LogManager::new("session"),
        })
    }

    /// Empty first frame, catalog lookup, then the serial history load.
    /// A failed load leaves whatever already arrived in the store.
    pub async fn bootstrap(&mut self) -> anyhow::Result<()> {
        self.coordinator
            .render_all(&self.store, RenderTrigger::Startup);

        self.catalog = self.hub.fetch_catalog().await;
        let mut loader = BootstrapLoader::new(&self.catalog, self.config.bootstrap.on_error);
        let outcome = loader
            .load_all(&self.hub, &mut self.store, &mut self.coordinator)
            .await;

        self.coordinator
            .render_all(&self.store, RenderTrigger::BootstrapComplete);
        self.logger.record(&format!(
            "history ready: {} sensors loaded, {} failed",
            loader.loaded(),
            loader.failed().len()
        ));
        outcome
    }

    pub fn event_source(&self) -> anyhow::Result<EventSource> {
        self.hub
            .event_source(Duration::from_millis(self.config.stream.reconnect_ms))
    }

    pub fn handle_signal(&mut self, signal: TransportSignal) -> Option<EventOutcome> {
        match signal {
            TransportSignal::Open => {
                self.stream.on_open();
                None
            }
            TransportSignal::Error {
                ready_state,
                reason,
            } => {
                self.stream.on_error(ready_state, &reason);
                None
            }
            TransportSignal::Event(event) => Some(self.stream.on_event(
                &event,
                &self.catalog,
                &mut self.store,
                &mut self.coordinator,
                unix_now(),
            )),
        }
    }

    /// Bootstraps, then follows the push stream for as long as the process lives.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        if let Err(err) = self.bootstrap().await {
            self.logger.warn(&format!("{:#}", err));
        }
        let mut source = self.event_source()?;
        loop {
            let signal = source.next_signal().await;
            self.handle_signal(signal);
        }
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn coordinator(&self) -> &RenderCoordinator<R> {
        &self.coordinator
    }

    pub fn stream(&self) -> &StreamClient {
        &self.stream
    }

    pub fn metrics(&self) -> &Arc<FeedMetrics> {
        &self.metrics
    }
}
