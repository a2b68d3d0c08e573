use anyhow::Context;
use sensorcore::RetentionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_HUB_URL: &str = "http://127.0.0.1:8080";
/// Reconnection delay used until the server advertises its own.
pub const DEFAULT_RECONNECT_MS: u64 = 3000;
/// File the visualizer looks for in its working directory.
pub const CONFIG_FILE_NAME: &str = "sensorfeed.yaml";

/// What to do when one sensor's history cannot be fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapPolicy {
    /// Stop loading the remaining sensors.
    #[default]
    Abort,
    /// Log the failure and carry on with the next sensor.
    Skip,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub on_error: BootstrapPolicy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub reconnect_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_ms: DEFAULT_RECONNECT_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub hub_url: String,
    pub retention: RetentionPolicy,
    pub bootstrap: BootstrapConfig,
    pub stream: StreamConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            retention: RetentionPolicy::default(),
            bootstrap: BootstrapConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl FeedConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading feed config {}", path_ref.display()))?;
        let config: FeedConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing feed config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(hub_url: &str) -> Self {
        Self {
            hub_url: hub_url.to_string(),
            ..Default::default()
        }
    }

    /// Loads [`CONFIG_FILE_NAME`] from `dir` when present, defaults otherwise.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Self {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            log::info!("no {} found, using defaults", path.display());
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::info!("loaded feed config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{:#}; using defaults", err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn config_from_args_keeps_default_bounds() {
        let cfg = FeedConfig::from_args("http://10.0.0.7");
        assert_eq!(cfg.hub_url, "http://10.0.0.7");
        assert_eq!(cfg.retention.max_window, 220);
        assert_eq!(cfg.retention.max_age_secs, 86_400);
        assert_eq!(cfg.bootstrap.on_error, BootstrapPolicy::Abort);
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"hub_url: http://192.168.4.1\nretention:\n  max_window: 50\nbootstrap:\n  on_error: skip\n",
        )
        .unwrap();
        let path = temp.into_temp_path();

        let cfg = FeedConfig::load(&path).unwrap();

        assert_eq!(cfg.hub_url, "http://192.168.4.1");
        assert_eq!(cfg.retention.max_window, 50);
        assert_eq!(cfg.retention.max_age_secs, 86_400);
        assert_eq!(cfg.bootstrap.on_error, BootstrapPolicy::Skip);
        assert_eq!(cfg.stream.reconnect_ms, DEFAULT_RECONNECT_MS);
    }

    #[test]
    fn config_load_reports_bad_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"retention: [1, 2\n").unwrap();
        let path = temp.into_temp_path();
        let err = FeedConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing feed config"));
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FeedConfig::discover(dir.path()), FeedConfig::default());

        fs::write(dir.path().join(CONFIG_FILE_NAME), "hub_url: http://hub.local\n").unwrap();
        assert_eq!(FeedConfig::discover(dir.path()).hub_url, "http://hub.local");
    }
}
