use crate::config::BootstrapPolicy;
use crate::hub::HubClient;
use anyhow::anyhow;
use sensorcore::render::{RenderCoordinator, RenderTrigger};
use sensorcore::telemetry::LogManager;
use sensorcore::wire_interface::SensorDataMessage;
use sensorcore::{ChartRenderer, SensorCatalog, SensorId, SeriesStore};
use std::collections::VecDeque;
use std::fmt;

/// Serial history load over every catalogued sensor.
///
/// Sensors are fetched one at a time in catalog order and each result is
/// drawn as soon as it lands, so the charts fill in sensor by sensor.
pub struct BootstrapLoader {
    queue: VecDeque<(SensorId, String)>,
    policy: BootstrapPolicy,
    loaded: usize,
    failed: Vec<SensorId>,
    logger: LogManager,
}

impl BootstrapLoader {
    pub fn new(catalog: &SensorCatalog, policy: BootstrapPolicy) -> Self {
        Self {
            queue: catalog
                .iter()
                .map(|(id, name)| (id.clone(), name.to_string()))
                .collect(),
            policy,
            loaded: 0,
            failed: Vec::new(),
            logger: LogManager::new("bootstrap"),
        }
    }

    /// Sensor whose history should be fetched next.
    pub fn next_sensor(&self) -> Option<&SensorId> {
        self.queue.front().map(|(id, _)| id)
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn failed(&self) -> &[SensorId] {
        &self.failed
    }

    /// Applies the fetch result for [`Self::next_sensor`]: replaces the
    /// sensor's series and redraws. Under [`BootstrapPolicy::Abort`] a failure
    /// empties the queue and is returned.
    pub fn complete<R, E>(
        &mut self,
        result: Result<SensorDataMessage, E>,
        store: &mut SeriesStore,
        coordinator: &mut RenderCoordinator<R>,
    ) -> anyhow::Result<()>
    where
        R: ChartRenderer,
        E: fmt::Display,
    {
        let Some((id, name)) = self.queue.pop_front() else {
            return Ok(());
        };

        match result {
            Ok(message) => {
                self.logger.record(&format!(
                    "loaded {} readings for {} ({})",
                    message.values.len(),
                    name,
                    message.identifier
                ));
                store.replace(message.identifier, name, message.values);
                coordinator.render_all(store, RenderTrigger::Bootstrap);
                self.loaded += 1;
                Ok(())
            }
            Err(err) => match self.policy {
                BootstrapPolicy::Abort => {
                    let remaining = self.queue.len();
                    self.queue.clear();
                    self.failed.push(id.clone());
                    Err(anyhow!(
                        "history load for sensor {} failed, {} sensors not loaded: {}",
                        id,
                        remaining,
                        err
                    ))
                }
                BootstrapPolicy::Skip => {
                    self.logger
                        .warn(&format!("skipping sensor {}: {}", id, err));
                    self.failed.push(id);
                    Ok(())
                }
            },
        }
    }

    /// Drives the whole queue against the hub, one request at a time.
    pub async fn load_all<R: ChartRenderer>(
        &mut self,
        hub: &HubClient,
        store: &mut SeriesStore,
        coordinator: &mut RenderCoordinator<R>,
    ) -> anyhow::Result<()> {
        while let Some(id) = self.next_sensor().cloned() {
            let result = hub.fetch_sensor_data(&id).await;
            self.complete(result.map_err(|err| format!("{:#}", err)), store, coordinator)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorcore::{Metric, Reading};

    #[derive(Default)]
    struct DrawCounter {
        sensors_seen: Vec<usize>,
    }

    impl ChartRenderer for DrawCounter {
        fn draw(&mut self, store: &SeriesStore, _metric: Metric) {
            self.sensors_seen.push(store.len());
        }
    }

    fn catalog() -> SensorCatalog {
        SensorCatalog::from_json(br#"{"s1": "Porch", "s2": "Garage", "s3": "Attic"}"#).unwrap()
    }

    fn history(id: &str, timestamp: i64) -> Result<SensorDataMessage, String> {
        Ok(SensorDataMessage::new(
            SensorId::from(id),
            vec![Reading::new(timestamp, 20.0, 50.0)],
        ))
    }

    fn coordinator() -> RenderCoordinator<DrawCounter> {
        RenderCoordinator::new(DrawCounter::default(), DrawCounter::default())
    }

    #[test]
    fn each_sensor_is_replaced_and_drawn_in_order() {
        let mut loader = BootstrapLoader::new(&catalog(), BootstrapPolicy::Abort);
        let mut store = SeriesStore::new();
        let mut coordinator = coordinator();

        assert_eq!(loader.next_sensor(), Some(&SensorId::from("s1")));
        loader
            .complete(history("s1", 1000), &mut store, &mut coordinator)
            .unwrap();
        assert_eq!(loader.next_sensor(), Some(&SensorId::from("s2")));
        loader
            .complete(history("s2", 2000), &mut store, &mut coordinator)
            .unwrap();
        loader
            .complete(history("s3", 3000), &mut store, &mut coordinator)
            .unwrap();

        assert!(loader.is_finished());
        assert_eq!(loader.loaded(), 3);
        assert_eq!(store.get(&SensorId::from("s2")).unwrap().name, "Garage");
        assert_eq!(
            coordinator.chart(Metric::Temperature).sensors_seen,
            vec![1, 2, 3]
        );
        assert_eq!(coordinator.last_trigger(), Some(RenderTrigger::Bootstrap));
    }

    #[test]
    fn bootstrap_overwrites_streamed_name() {
        let mut loader = BootstrapLoader::new(&catalog(), BootstrapPolicy::Abort);
        let mut store = SeriesStore::new();
        store.append(SensorId::from("s1"), "No name", Reading::new(5, 1.0, 1.0));

        loader
            .complete(history("s1", 1000), &mut store, &mut coordinator())
            .unwrap();

        let series = store.get(&SensorId::from("s1")).unwrap();
        assert_eq!(series.name, "Porch");
        assert_eq!(series.values, vec![Reading::new(1000, 20.0, 50.0)]);
    }

    #[test]
    fn abort_policy_stops_remaining_loads() {
        let mut loader = BootstrapLoader::new(&catalog(), BootstrapPolicy::Abort);
        let mut store = SeriesStore::new();
        let mut coordinator = coordinator();

        loader
            .complete(history("s1", 1000), &mut store, &mut coordinator)
            .unwrap();
        let err = loader
            .complete::<_, String>(Err("connection reset".into()), &mut store, &mut coordinator)
            .unwrap_err();

        assert!(err.to_string().contains("sensor s2"));
        assert!(loader.is_finished());
        assert_eq!(store.len(), 1);
        assert_eq!(loader.failed(), &[SensorId::from("s2")]);
    }

    #[test]
    fn skip_policy_isolates_failures() {
        let mut loader = BootstrapLoader::new(&catalog(), BootstrapPolicy::Skip);
        let mut store = SeriesStore::new();
        let mut coordinator = coordinator();

        loader
            .complete::<_, String>(Err("404".into()), &mut store, &mut coordinator)
            .unwrap();
        loader
            .complete(history("s2", 2000), &mut store, &mut coordinator)
            .unwrap();
        loader
            .complete(history("s3", 3000), &mut store, &mut coordinator)
            .unwrap();

        assert_eq!(loader.loaded(), 2);
        assert_eq!(loader.failed(), &[SensorId::from("s1")]);
        assert!(!store.contains(&SensorId::from("s1")));
    }
}
