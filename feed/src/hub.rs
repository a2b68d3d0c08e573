use crate::transport::EventSource;
use anyhow::Context;
use reqwest::{Response, Url};
use sensorcore::prelude::FeedError;
use sensorcore::telemetry::LogManager;
use sensorcore::wire_interface::SensorDataMessage;
use sensorcore::{SensorCatalog, SensorId};
use std::time::Duration;

pub const CATALOG_PATH: &str = "sensorIDsToNames";
pub const SENSOR_DATA_PATH: &str = "sensorData";
pub const EVENTS_PATH: &str = "events";

/// HTTP access to the hub's fixed endpoints. Requests carry no timeout; a
/// stalled hub stalls the caller.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base: Url,
    logger: LogManager,
}

impl HubClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut base =
            Url::parse(base_url).with_context(|| format!("parsing hub url {}", base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            logger: LogManager::new("hub"),
        })
    }

    pub fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("building {} endpoint", path))
    }

    pub fn sensor_data_url(&self, id: &SensorId) -> anyhow::Result<Url> {
        let mut url = self.endpoint(SENSOR_DATA_PATH)?;
        url.query_pairs_mut().append_pair("identifier", id.as_str());
        Ok(url)
    }

    pub async fn try_fetch_catalog(&self) -> anyhow::Result<SensorCatalog> {
        let url = self.endpoint(CATALOG_PATH)?;
        let body = self.get_bytes(url).await.context("fetching sensor catalog")?;
        Ok(SensorCatalog::from_json(&body)?)
    }

    /// Single attempt; any failure yields an empty catalog so every sensor
    /// falls back to the placeholder name.
    pub async fn fetch_catalog(&self) -> SensorCatalog {
        match self.try_fetch_catalog().await {
            Ok(catalog) => {
                self.logger
                    .record(&format!("catalog lists {} sensors", catalog.len()));
                catalog
            }
            Err(err) => {
                self.logger
                    .warn(&format!("{:#}; continuing without sensor names", err));
                SensorCatalog::empty()
            }
        }
    }

    pub async fn fetch_sensor_data(&self, id: &SensorId) -> anyhow::Result<SensorDataMessage> {
        let url = self.sensor_data_url(id)?;
        let body = self
            .get_bytes(url)
            .await
            .with_context(|| format!("fetching history for sensor {}", id))?;
        let message = SensorDataMessage::from_json(&body)
            .with_context(|| format!("decoding history for sensor {}", id))?;
        self.logger.debug(&format!(
            "sensor {} history: {} readings",
            message.identifier,
            message.values.len()
        ));
        Ok(message)
    }

    pub fn event_source(&self, reconnect: Duration) -> anyhow::Result<EventSource> {
        Ok(EventSource::new(
            self.http.clone(),
            self.endpoint(EVENTS_PATH)?,
            reconnect,
        ))
    }

    async fn get_bytes(&self, url: Url) -> anyhow::Result<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response)?;
        Ok(response.bytes().await?.to_vec())
    }
}

pub(crate) fn ensure_success(response: Response) -> Result<Response, FeedError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FeedError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}
