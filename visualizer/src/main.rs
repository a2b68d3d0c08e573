mod chart;

use chart::ChartPanel;
use iced::{
    widget::{column, row, scrollable, text, Canvas, Column, Container},
    window, Element, Length, Size, Subscription, Task, Theme,
};
use log::{info, warn};
use sensorcore::prelude::unix_now;
use sensorcore::render::{RenderCoordinator, RenderTrigger};
use sensorcore::stream::{ConnectionState, EventOutcome, StreamClient};
use sensorcore::telemetry::FeedMetrics;
use sensorcore::wire_interface::SensorDataMessage;
use sensorcore::{Metric, SensorCatalog, SeriesStore};
use sensorfeed::{BootstrapLoader, FeedConfig, HubClient, TransportSignal};
use std::sync::Arc;
use std::time::Duration;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "Sensor Dashboard".into()
}

fn application_subscription(_: &Dashboard) -> Subscription<Message> {
    window::resize_events().map(|(_id, size)| Message::Resized(size))
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

struct Dashboard {
    config: FeedConfig,
    hub: Option<HubClient>,
    catalog: SensorCatalog,
    store: SeriesStore,
    coordinator: RenderCoordinator<ChartPanel>,
    stream: StreamClient,
    loader: Option<BootstrapLoader>,
    metrics: Arc<FeedMetrics>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    CatalogFetched(SensorCatalog),
    HistoryFetched(Result<SensorDataMessage, String>),
    Transport(TransportSignal),
    Resized(Size),
}

impl Dashboard {
    fn new(config: FeedConfig) -> Self {
        let metrics = Arc::new(FeedMetrics::new());
        Dashboard {
            hub: None,
            catalog: SensorCatalog::empty(),
            store: SeriesStore::with_policy(config.retention),
            coordinator: RenderCoordinator::with_metrics(
                ChartPanel::new(Metric::Temperature),
                ChartPanel::new(Metric::Humidity),
                metrics.clone(),
            ),
            stream: StreamClient::new(metrics.clone()),
            loader: None,
            metrics,
            status: "Waiting for sensor catalog...".into(),
            history: Vec::new(),
            config,
        }
    }

    fn boot() -> (Self, Task<Message>) {
        let mut state = Dashboard::new(FeedConfig::discover("."));
        state
            .coordinator
            .render_all(&state.store, RenderTrigger::Startup);

        let task = match HubClient::new(&state.config.hub_url) {
            Ok(hub) => {
                let fetch = hub.clone();
                state.hub = Some(hub);
                Task::perform(
                    async move { fetch.fetch_catalog().await },
                    Message::CatalogFetched,
                )
            }
            Err(err) => {
                warn!("invalid hub url {}: {err:#}", state.config.hub_url);
                state.status = format!("Hub error: {err:#}");
                Task::none()
            }
        };
        (state, task)
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::CatalogFetched(catalog) => {
                state.push_history(format!("Catalog: {} sensors", catalog.len()));
                state.loader = Some(BootstrapLoader::new(
                    &catalog,
                    state.config.bootstrap.on_error,
                ));
                state.catalog = catalog;
                state.next_history_request()
            }
            Message::HistoryFetched(result) => {
                if let Some(loader) = state.loader.as_mut() {
                    if let Err(err) = loader.complete(result, &mut state.store, &mut state.coordinator)
                    {
                        warn!("history load aborted: {err:#}");
                        state.status = format!("History error: {err:#}");
                        state.push_history(format!("History aborted: {err}"));
                    }
                }
                state.next_history_request()
            }
            Message::Transport(signal) => {
                state.handle_signal(signal);
                Task::none()
            }
            Message::Resized(_) => {
                state
                    .coordinator
                    .render_all(&state.store, RenderTrigger::Resize);
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let snapshot = state.metrics.snapshot();

        let temperature = Canvas::new(state.coordinator.chart(Metric::Temperature).canvas())
            .width(Length::Fill)
            .height(Length::Fixed(260.0));
        let humidity = Canvas::new(state.coordinator.chart(Metric::Humidity).canvas())
            .width(Length::Fill)
            .height(Length::Fixed(260.0));

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let summary = row![
            text(format!("Sensors: {}", state.store.len())).size(14),
            text(format!("Readings: {}", state.store.total_readings())).size(14),
            text(format!("Live updates: {}", snapshot.readings_applied)).size(14),
            text(format!("Malformed: {}", snapshot.decode_failures)).size(14),
        ]
        .spacing(20);

        let layout = column![
            text("Sensor Dashboard").size(26),
            text(&state.status).size(14),
            summary,
            temperature,
            humidity,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Next step of the serial history load, or the live stream once it is done.
    fn next_history_request(&mut self) -> Task<Message> {
        let next = self
            .loader
            .as_ref()
            .and_then(|loader| loader.next_sensor().cloned());
        match (next, self.hub.clone()) {
            (Some(id), Some(hub)) => {
                self.status = format!("Loading history for sensor {id}...");
                Task::perform(
                    async move {
                        hub.fetch_sensor_data(&id)
                            .await
                            .map_err(|err| format!("{err:#}"))
                    },
                    Message::HistoryFetched,
                )
            }
            _ => self.finish_bootstrap(),
        }
    }

    fn finish_bootstrap(&mut self) -> Task<Message> {
        let Some(loader) = self.loader.take() else {
            return Task::none();
        };
        self.coordinator
            .render_all(&self.store, RenderTrigger::BootstrapComplete);
        self.push_history(format!(
            "History: {} loaded, {} failed",
            loader.loaded(),
            loader.failed().len()
        ));

        let Some(hub) = self.hub.as_ref() else {
            return Task::none();
        };
        match hub.event_source(Duration::from_millis(self.config.stream.reconnect_ms)) {
            Ok(source) => {
                self.status = "Connecting to live readings...".into();
                Task::run(source.into_stream(), Message::Transport)
            }
            Err(err) => {
                warn!("cannot open live stream: {err:#}");
                self.status = format!("Stream error: {err:#}");
                Task::none()
            }
        }
    }

    fn handle_signal(&mut self, signal: TransportSignal) {
        match signal {
            TransportSignal::Open => {
                self.stream.on_open();
                self.status = "Connected".into();
                self.push_history("Connected".into());
            }
            TransportSignal::Error {
                ready_state,
                reason,
            } => {
                self.stream.on_error(ready_state, &reason);
                if self.stream.state() == ConnectionState::Disconnected {
                    self.status = "Disconnected, waiting to reconnect...".into();
                    self.push_history(format!("Disconnected: {reason}"));
                }
            }
            TransportSignal::Event(event) => {
                let outcome = self.stream.on_event(
                    &event,
                    &self.catalog,
                    &mut self.store,
                    &mut self.coordinator,
                    unix_now(),
                );
                if let EventOutcome::Applied { id, created: true } = outcome {
                    let name = self.catalog.resolve(&id).to_string();
                    self.push_history(format!("New sensor {id} ({name})"));
                }
            }
        }
    }

    fn push_history(&mut self, entry: String) {
        info!("{entry}");
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_the_latest_twenty_entries() {
        let mut dashboard = Dashboard::new(FeedConfig::default());
        for idx in 0..25 {
            dashboard.push_history(format!("entry {idx}"));
        }
        assert_eq!(dashboard.history.len(), 20);
        assert_eq!(dashboard.history.first().map(String::as_str), Some("entry 5"));
        assert_eq!(dashboard.history.last().map(String::as_str), Some("entry 24"));
    }
}
