use futures::{stream, StreamExt};
use sensorcore::stream::ConnectionState;
use sensorfeed::transport::MIN_RETRY;
use sensorfeed::{HubClient, TransportSignal};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::Filter;

type SeenIds = Arc<Mutex<Vec<Option<String>>>>;

/// Serves one event per connection, then hangs up.
fn spawn_flaky_events() -> (SocketAddr, SeenIds) {
    let seen: SeenIds = Arc::new(Mutex::new(Vec::new()));
    let record = seen.clone();
    let route = warp::path("events")
        .and(warp::get())
        .and(warp::header::optional::<String>("last-event-id"))
        .map(move |last_id: Option<String>| {
            let mut log = record.lock().unwrap();
            log.push(last_id);
            let id = log.len().to_string();
            let event = warp::sse::Event::default()
                .id(id.clone())
                .event("newReading")
                .retry(Duration::from_millis(20))
                .data(format!("payload-{}", id));
            warp::sse::reply(stream::iter(vec![Ok::<_, Infallible>(event)]))
        });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, seen)
}

#[tokio::test]
async fn reconnects_and_resends_last_event_id() {
    let (addr, seen) = spawn_flaky_events();
    let hub = HubClient::new(&format!("http://{}", addr)).unwrap();
    let source = hub.event_source(Duration::from_secs(30)).unwrap();

    let signals: Vec<TransportSignal> = tokio::time::timeout(
        Duration::from_secs(10),
        source.into_stream().take(5).collect::<Vec<_>>(),
    )
    .await
    .unwrap();

    assert_eq!(signals[0], TransportSignal::Open);
    match &signals[1] {
        TransportSignal::Event(event) => {
            assert_eq!(event.event, "newReading");
            assert_eq!(event.data, "payload-1");
            assert_eq!(event.id.as_deref(), Some("1"));
        }
        other => panic!("expected event, got {:?}", other),
    }
    assert!(matches!(
        signals[2],
        TransportSignal::Error {
            ready_state: ConnectionState::Connecting,
            ..
        }
    ));
    assert_eq!(signals[3], TransportSignal::Open);
    assert!(matches!(&signals[4], TransportSignal::Event(event) if event.data == "payload-2"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], None);
    assert_eq!(seen[1].as_deref(), Some("1"));
}

#[tokio::test]
async fn unreachable_hub_reports_error_while_connecting() {
    let hub = HubClient::new("http://127.0.0.1:9").unwrap();
    let mut source = hub.event_source(Duration::from_millis(10)).unwrap();

    let signal = tokio::time::timeout(Duration::from_secs(10), source.next_signal())
        .await
        .unwrap();

    assert!(matches!(
        signal,
        TransportSignal::Error {
            ready_state: ConnectionState::Connecting,
            ..
        }
    ));
    assert_eq!(source.ready_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn zero_retry_from_server_is_floored() {
    let route = warp::path("events").and(warp::get()).map(|| {
        let event = warp::sse::Event::default()
            .retry(Duration::ZERO)
            .data("payload");
        warp::sse::reply(stream::iter(vec![Ok::<_, Infallible>(event)]))
    });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let hub = HubClient::new(&format!("http://{}", addr)).unwrap();
    let mut source = hub.event_source(Duration::ZERO).unwrap();
    assert_eq!(source.retry(), MIN_RETRY);

    let opened = tokio::time::timeout(Duration::from_secs(10), source.next_signal())
        .await
        .unwrap();
    assert_eq!(opened, TransportSignal::Open);
    let event = tokio::time::timeout(Duration::from_secs(10), source.next_signal())
        .await
        .unwrap();
    assert!(matches!(event, TransportSignal::Event(ref e) if e.data == "payload"));
    assert_eq!(source.retry(), MIN_RETRY);
}

#[tokio::test]
async fn html_answer_on_events_path_is_a_failed_connect() {
    let route = warp::path("events")
        .and(warp::get())
        .map(|| warp::reply::html("<html>maintenance</html>"));
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let hub = HubClient::new(&format!("http://{}", addr)).unwrap();
    let mut source = hub.event_source(Duration::from_millis(10)).unwrap();

    let signal = tokio::time::timeout(Duration::from_secs(10), source.next_signal())
        .await
        .unwrap();

    match signal {
        TransportSignal::Error {
            ready_state,
            reason,
        } => {
            assert_eq!(ready_state, ConnectionState::Connecting);
            assert!(reason.contains("text/html"), "reason: {}", reason);
        }
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(source.ready_state(), ConnectionState::Connecting);
}
