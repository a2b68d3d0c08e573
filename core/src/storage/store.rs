use crate::storage::retention::RetentionPolicy;
use crate::storage::series::SensorSeries;
use crate::wire_interface::{Reading, SensorId};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Sensor identifier to series mapping; the only shared state of a session.
///
/// Entries appear on first data for a sensor and live for the whole session.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: BTreeMap<SensorId, SensorSeries>,
    policy: RetentionPolicy,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RetentionPolicy) -> Self {
        Self {
            series: BTreeMap::new(),
            policy,
        }
    }

    /// Full overwrite of an entry, name included.
    pub fn replace(&mut self, id: SensorId, name: impl Into<String>, values: Vec<Reading>) {
        self.series.insert(id, SensorSeries::new(name, values));
    }

    /// Pushes one reading onto an existing series, or creates a single-reading
    /// series under `name`. Returns `true` when the entry was created.
    pub fn append(&mut self, id: SensorId, name: &str, reading: Reading) -> bool {
        match self.series.get_mut(&id) {
            Some(series) => {
                series.push(reading);
                false
            }
            None => {
                self.replace(id, name, vec![reading]);
                true
            }
        }
    }

    /// Enforces the retention policy on every series as of `now`.
    pub fn cleanup(&mut self, now: i64) {
        let policy = self.policy;
        for series in self.series.values_mut() {
            policy.apply(&mut series.values, now);
        }
    }

    pub fn get(&self, id: &SensorId) -> Option<&SensorSeries> {
        self.series.get(id)
    }

    pub fn contains(&self, id: &SensorId) -> bool {
        self.series.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SensorId, &SensorSeries)> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn total_readings(&self) -> usize {
        self.series.values().map(SensorSeries::len).sum()
    }

    /// Whether every series satisfies the retention bounds at `now`.
    pub fn is_clean(&self, now: i64) -> bool {
        self.series
            .values()
            .all(|series| self.policy.admits(&series.values, now))
    }
}

impl Serialize for SeriesStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.series.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{RetentionPolicy, SECS_IN_DAY, UNNAMED_SENSOR};

    const NOW: i64 = 1_700_000_000;

    fn porch_store() -> SeriesStore {
        let mut store = SeriesStore::new();
        store.replace(
            SensorId::from("s1"),
            "Porch",
            vec![Reading::new(1000, 20.0, 50.0), Reading::new(2000, 21.0, 51.0)],
        );
        store
    }

    #[test]
    fn bootstrap_then_push_scenario() {
        let mut store = porch_store();
        let created = store.append(SensorId::from("s1"), "Porch", Reading::new(3000, 22.0, 52.0));
        assert!(!created);
        assert_eq!(store.get(&SensorId::from("s1")).unwrap().len(), 3);

        store.cleanup(3600);

        let series = store.get(&SensorId::from("s1")).unwrap();
        assert_eq!(series.name, "Porch");
        assert_eq!(
            series.values,
            vec![
                Reading::new(1000, 20.0, 50.0),
                Reading::new(2000, 21.0, 51.0),
                Reading::new(3000, 22.0, 52.0),
            ]
        );
    }

    #[test]
    fn replace_overwrites_values_and_name() {
        let mut store = porch_store();
        store.replace(SensorId::from("s1"), "Front porch", vec![Reading::new(5, 1.0, 1.0)]);
        let series = store.get(&SensorId::from("s1")).unwrap();
        assert_eq!(series.name, "Front porch");
        assert_eq!(series.values, vec![Reading::new(5, 1.0, 1.0)]);
    }

    #[test]
    fn append_keeps_existing_name_and_defers_sorting() {
        let mut store = porch_store();
        store.append(SensorId::from("s1"), "Other", Reading::new(1500, 0.0, 0.0));
        let series = store.get(&SensorId::from("s1")).unwrap();
        assert_eq!(series.name, "Porch");
        assert_eq!(series.values.last().unwrap().timestamp, 1500);
    }

    #[test]
    fn unknown_sensor_is_stored_under_placeholder() {
        let mut store = SeriesStore::new();
        let created = store.append(SensorId::from(99), UNNAMED_SENSOR, Reading::new(NOW, 1.0, 2.0));
        assert!(created);
        store.cleanup(NOW);
        let series = store.get(&SensorId::from("99")).unwrap();
        assert_eq!(series.name, "No name");
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn overflow_keeps_most_recent_window() {
        let mut store = SeriesStore::new();
        let id = SensorId::from("s1");
        for offset in 0..221 {
            store.append(id.clone(), "Porch", Reading::new(NOW - 3600 + offset * 10, 0.0, 0.0));
        }

        store.cleanup(NOW);

        let series = store.get(&id).unwrap();
        assert_eq!(series.len(), 220);
        assert_eq!(series.values[0].timestamp, NOW - 3600 + 10);
        assert_eq!(series.values[219].timestamp, NOW - 3600 + 2200);
    }

    #[test]
    fn cleanup_removes_only_readings_outside_day_window() {
        let mut store = SeriesStore::new();
        let id = SensorId::from("s1");
        store.append(id.clone(), "Porch", Reading::new(NOW - 60, 0.0, 0.0));
        store.append(id.clone(), "Porch", Reading::new(NOW + 86_400, 0.0, 0.0));
        store.append(id.clone(), "Porch", Reading::new(NOW - SECS_IN_DAY - 1, 0.0, 0.0));

        store.cleanup(NOW);

        let stamps: Vec<i64> = store.get(&id).unwrap().values.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![NOW - 60, NOW + 86_400]);
    }

    #[test]
    fn cleanup_is_idempotent_and_enforces_bounds() {
        let mut store = SeriesStore::with_policy(RetentionPolicy {
            max_window: 5,
            max_age_secs: 1000,
        });
        for (idx, offset) in [900, 10, 2000, 400, 30, 700, 50, 1200].iter().enumerate() {
            let id = SensorId::from(if idx % 2 == 0 { "a" } else { "b" });
            store.append(id, "x", Reading::new(NOW - offset, idx as f64, 0.0));
        }

        store.cleanup(NOW);
        assert!(store.is_clean(NOW));
        let once = serde_json::to_value(&store).unwrap();

        store.cleanup(NOW);
        let twice = serde_json::to_value(&store).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn store_serializes_like_the_wire_shape() {
        let json = serde_json::to_value(porch_store()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"s1": {"name": "Porch", "values": [[1000, 20.0, 50.0], [2000, 21.0, 51.0]]}})
        );
    }
}
