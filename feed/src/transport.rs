use crate::hub::ensure_success;
use anyhow::Context;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Response, Url};
use sensorcore::prelude::FeedError;
use sensorcore::stream::{ConnectionState, EventDecoder, ServerEvent};
use sensorcore::telemetry::LogManager;
use std::collections::VecDeque;
use std::time::Duration;

const LAST_EVENT_ID: &str = "Last-Event-ID";
const EVENT_STREAM: &str = "text/event-stream";

/// Lower bound on the reconnect delay, whatever the server asks for.
pub const MIN_RETRY: Duration = Duration::from_millis(100);

type ByteStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;

/// What the push connection reports to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    Open,
    Event(ServerEvent),
    /// `ready_state` is the transport's state once the error has been handled.
    Error {
        ready_state: ConnectionState,
        reason: String,
    },
}

/// Long-lived `text/event-stream` subscription that reconnects on its own.
///
/// After any failure the next call waits for the retry delay (the server may
/// change it with a `retry:` field) and opens a new request carrying
/// `Last-Event-ID`.
pub struct EventSource {
    http: reqwest::Client,
    url: Url,
    retry: Duration,
    decoder: EventDecoder,
    body: Option<ByteStream>,
    pending: VecDeque<ServerEvent>,
    attempted: bool,
    logger: LogManager,
}

impl EventSource {
    pub fn new(http: reqwest::Client, url: Url, retry: Duration) -> Self {
        Self {
            http,
            url,
            retry: retry.max(MIN_RETRY),
            decoder: EventDecoder::new(),
            body: None,
            pending: VecDeque::new(),
            attempted: false,
            logger: LogManager::new("transport"),
        }
    }

    pub fn ready_state(&self) -> ConnectionState {
        if self.body.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Connecting
        }
    }

    /// Delay applied before the next reconnect.
    pub fn retry(&self) -> Duration {
        self.retry
    }

    /// Waits for the next thing worth reporting. Never ends.
    pub async fn next_signal(&mut self) -> TransportSignal {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return TransportSignal::Event(event);
            }

            let Some(body) = self.body.as_mut() else {
                if self.attempted {
                    tokio::time::sleep(self.retry).await;
                }
                self.attempted = true;
                let connecting = connect(
                    self.http.clone(),
                    self.url.clone(),
                    self.decoder.last_event_id().map(str::to_string),
                );
                self.logger.debug(&format!("connecting to {}", self.url));
                return match connecting.await {
                    Ok(body) => {
                        self.decoder.reset();
                        self.body = Some(body);
                        TransportSignal::Open
                    }
                    Err(err) => self.fail(format!("{:#}", err)),
                };
            };

            let next = body.next().await;
            match next {
                Some(Ok(chunk)) => {
                    let events = self.decoder.feed(&chunk);
                    self.pending.extend(events);
                    if let Some(ms) = self.decoder.retry_ms() {
                        self.retry = Duration::from_millis(ms).max(MIN_RETRY);
                    }
                }
                Some(Err(err)) => return self.fail(err.to_string()),
                None => return self.fail("stream closed by server".to_string()),
            }
        }
    }

    /// Adapts the source into an endless stream of signals.
    pub fn into_stream(self) -> impl Stream<Item = TransportSignal> + Send + 'static {
        stream::unfold(self, |mut source| async move {
            let signal = source.next_signal().await;
            Some((signal, source))
        })
    }

    fn fail(&mut self, reason: String) -> TransportSignal {
        self.body = None;
        self.pending.clear();
        TransportSignal::Error {
            ready_state: ConnectionState::Connecting,
            reason,
        }
    }
}

async fn connect(
    http: reqwest::Client,
    url: Url,
    last_event_id: Option<String>,
) -> anyhow::Result<ByteStream> {
    let mut request = http
        .get(url)
        .header(ACCEPT, EVENT_STREAM)
        .header(CACHE_CONTROL, "no-cache");
    if let Some(id) = last_event_id {
        request = request.header(LAST_EVENT_ID, id);
    }
    let response = request.send().await.context("opening event stream")?;
    let response = ensure_event_stream(ensure_success(response)?)?;
    Ok(response
        .bytes_stream()
        .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
        .boxed())
}

fn ensure_event_stream(response: Response) -> Result<Response, FeedError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    if media_type.eq_ignore_ascii_case(EVENT_STREAM) {
        Ok(response)
    } else {
        Err(FeedError::NotEventStream {
            content_type: content_type.to_string(),
            url: response.url().to_string(),
        })
    }
}
