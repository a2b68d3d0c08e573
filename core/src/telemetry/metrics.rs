use std::sync::Mutex;

/// Counters describing how a session has been ingesting and drawing.
pub struct FeedMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub readings_applied: usize,
    pub decode_failures: usize,
    pub disconnects: usize,
    pub renders: usize,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_reading(&self) {
        self.update(|metrics| metrics.readings_applied += 1);
    }

    pub fn record_decode_failure(&self) {
        self.update(|metrics| metrics.decode_failures += 1);
    }

    pub fn record_disconnect(&self) {
        self.update(|metrics| metrics.disconnects += 1);
    }

    pub fn record_render(&self) {
        self.update(|metrics| metrics.renders += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}
