use crate::prelude::ChartRenderer;
use crate::render::{RenderCoordinator, RenderTrigger};
use crate::storage::{SensorCatalog, SeriesStore};
use crate::stream::sse::ServerEvent;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::FeedMetrics;
use crate::wire_interface::{decode_new_reading, SensorId, NEW_READING_EVENT};
use std::sync::Arc;

/// Push-connection state as observed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Disconnected,
}

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Applied { id: SensorId, created: bool },
    Ignored,
    Rejected(String),
}

/// Turns push events into store mutations and redraws.
///
/// Reconnection belongs to the transport; this side only observes the
/// transitions. Handlers must not overlap for the same store, which holds by
/// construction since every entry point takes `&mut SeriesStore`.
pub struct StreamClient {
    state: ConnectionState,
    metrics: Arc<FeedMetrics>,
    logger: LogManager,
}

impl StreamClient {
    pub fn new(metrics: Arc<FeedMetrics>) -> Self {
        Self {
            state: ConnectionState::Connecting,
            metrics,
            logger: LogManager::new("stream"),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn on_open(&mut self) {
        self.state = ConnectionState::Open;
        self.logger.record("Connected");
    }

    /// `ready_state` is the transport's own state when the error surfaced.
    /// Errors while it is still open are left to the transport.
    pub fn on_error(&mut self, ready_state: ConnectionState, reason: &str) {
        if ready_state == ConnectionState::Open {
            self.logger.debug(&format!("transient stream error: {}", reason));
            return;
        }
        self.state = ConnectionState::Disconnected;
        self.metrics.record_disconnect();
        self.logger.warn(&format!("Disconnected ({})", reason));
    }

    /// Append, clean up, redraw. Malformed payloads are logged and dropped.
    pub fn on_event<R: ChartRenderer>(
        &mut self,
        event: &ServerEvent,
        catalog: &SensorCatalog,
        store: &mut SeriesStore,
        coordinator: &mut RenderCoordinator<R>,
        now: i64,
    ) -> EventOutcome {
        if event.event != NEW_READING_EVENT {
            self.logger
                .debug(&format!("ignoring '{}' event", event.event));
            return EventOutcome::Ignored;
        }
        self.logger.debug(&event.data);

        let (id, reading) = match decode_new_reading(&event.data) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.metrics.record_decode_failure();
                self.logger
                    .warn(&format!("dropping malformed reading: {}", err));
                return EventOutcome::Rejected(err.to_string());
            }
        };

        let created = store.append(id.clone(), catalog.resolve(&id), reading);
        store.cleanup(now);
        coordinator.render_all(store, RenderTrigger::StreamEvent);
        self.metrics.record_reading();

        EventOutcome::Applied { id, created }
    }
}
