use crate::prelude::FeedResult;
use crate::telemetry::log::LogManager;
use crate::wire_interface::SensorId;
use indexmap::IndexMap;
use serde::Serialize;

/// Display name used for sensors the catalog does not know about.
pub const UNNAMED_SENSOR: &str = "No name";

/// Identifier to display-name lookup, fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorCatalog {
    names: IndexMap<SensorId, String>,
}

impl SensorCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Strict decode of the `{ "<id>": "<name>" }` catalog object.
    ///
    /// Canonical integer ids come first in ascending order, every other id
    /// keeps the position the hub sent it in.
    pub fn from_json(payload: &[u8]) -> FeedResult<Self> {
        let raw: IndexMap<String, String> = serde_json::from_slice(payload)?;
        let (mut indexed, named): (Vec<_>, Vec<_>) = raw
            .into_iter()
            .map(|(id, name)| (SensorId::from(id), name))
            .partition(|(id, _)| id.array_index().is_some());
        indexed.sort_by_key(|(id, _)| id.array_index());
        Ok(indexed.into_iter().chain(named).collect())
    }

    /// Decode that degrades to an empty catalog on malformed input.
    pub fn from_json_or_empty(payload: &[u8]) -> Self {
        match Self::from_json(payload) {
            Ok(catalog) => catalog,
            Err(err) => {
                LogManager::new("catalog").warn(&format!("unusable sensor catalog: {}", err));
                Self::empty()
            }
        }
    }

    pub fn get(&self, id: &SensorId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Display name for `id`, falling back to [`UNNAMED_SENSOR`].
    pub fn resolve(&self, id: &SensorId) -> &str {
        self.get(id).unwrap_or(UNNAMED_SENSOR)
    }

    /// Entries in enumeration order, which drives the bootstrap sequence.
    pub fn iter(&self) -> impl Iterator<Item = (&SensorId, &str)> {
        self.names.iter().map(|(id, name)| (id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(SensorId, String)> for SensorCatalog {
    fn from_iter<I: IntoIterator<Item = (SensorId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
